use common::ChatHistoryDto;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::api_client::chat::{get_history, stream_chat};
use crate::api_client::export::{download_export, ExportKind};
use crate::common::error::ErrorDisplay;
use crate::common::fetch_hook::use_fetch_with_refetch;
use crate::common::fetch_render::FetchRender;
use crate::common::loading::{Loading, LoadingSize};
use crate::common::toast::ToastContext;
use super::results::ResultsTable;
use super::transcript::{ChatAction, Transcript};

const HISTORY_PREVIEW: usize = 10;

#[derive(Properties, PartialEq)]
struct ExportButtonsProps {
    sql: String,
}

#[function_component(ExportButtons)]
fn export_buttons(props: &ExportButtonsProps) -> Html {
    let toast_ctx = use_context::<ToastContext>();
    let busy = use_state(|| false);

    let button = |kind: ExportKind| {
        let sql = props.sql.clone();
        let disabled = *busy;
        let busy = busy.clone();
        let toast_ctx = toast_ctx.clone();
        let onclick = Callback::from(move |_| {
            let sql = sql.clone();
            let busy = busy.clone();
            let toast_ctx = toast_ctx.clone();
            busy.set(true);
            wasm_bindgen_futures::spawn_local(async move {
                let result = download_export(kind, &sql).await;
                busy.set(false);
                if let Some(toast_ctx) = toast_ctx {
                    match result {
                        Ok(()) => toast_ctx.show_success(format!("{} export downloaded", kind.label())),
                        Err(e) => toast_ctx.show_error(e),
                    }
                } else if let Err(e) = result {
                    log::error!("Export failed: {}", e);
                }
            });
        });
        html! {
            <button class="btn btn-outline btn-sm" {disabled} {onclick}>
                <i class="fas fa-file-export"></i>{format!(" Export {}", kind.label())}
            </button>
        }
    };

    html! {
        <div class="flex gap-2">
            {button(ExportKind::Csv)}
            {button(ExportKind::Excel)}
        </div>
    }
}

fn render_history(entries: Vec<ChatHistoryDto>, on_pick: Callback<String>) -> Html {
    if entries.is_empty() {
        return html! { <p class="text-sm text-gray-500">{"No questions asked yet."}</p> };
    }
    html! {
        <ul class="menu menu-sm p-0">
            { for entries.into_iter().take(HISTORY_PREVIEW).map(|entry| {
                let question = entry.question.clone();
                let on_pick = on_pick.clone();
                html! {
                    <li key={entry.id}>
                        <a title={entry.sql.clone()} onclick={Callback::from(move |_| on_pick.emit(question.clone()))}>
                            <span class="truncate">{&entry.question}</span>
                            <span class="text-xs text-gray-400">{entry.created_at.format("%Y-%m-%d %H:%M").to_string()}</span>
                        </a>
                    </li>
                }
            })}
        </ul>
    }
}

#[function_component(Chat)]
pub fn chat() -> Html {
    let query = use_state(String::new);
    let transcript = use_reducer(Transcript::default);
    let (history, refetch_history) = use_fetch_with_refetch(get_history);

    let on_input = {
        let query = query.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            query.set(input.value());
        })
    };

    let on_submit = {
        let query = query.clone();
        let transcript = transcript.clone();
        let refetch_history = refetch_history.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let question = query.trim().to_string();
            if question.is_empty() || transcript.streaming {
                return;
            }

            log::info!("Asking: {}", question);
            transcript.dispatch(ChatAction::Start(question.clone()));
            let dispatcher = transcript.dispatcher();
            let refetch_history = refetch_history.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let on_chunk = {
                    let dispatcher = dispatcher.clone();
                    move |chunk| dispatcher.dispatch(ChatAction::Chunk(chunk))
                };
                match stream_chat(&question, on_chunk).await {
                    Ok(()) => dispatcher.dispatch(ChatAction::Finished),
                    Err(e) => {
                        log::error!("Chat request failed: {}", e);
                        dispatcher.dispatch(ChatAction::Failed(e));
                    }
                }
                refetch_history.emit(());
            });
        })
    };

    let on_pick = {
        let query = query.clone();
        Callback::from(move |question: String| query.set(question))
    };

    html! {
        <div class="grid grid-cols-1 lg:grid-cols-4 gap-4">
            <div class="card bg-base-100 shadow lg:col-span-3">
                <div class="card-body gap-4">
                    <h2 class="card-title">{"Chat with Data"}</h2>
                    <form class="flex gap-2" onsubmit={on_submit}>
                        <input
                            type="text"
                            class="input input-bordered grow"
                            placeholder="Ask a question about your data..."
                            value={(*query).clone()}
                            oninput={on_input}
                        />
                        <button type="submit" class="btn btn-primary" disabled={transcript.streaming}>
                            {"Ask"}
                        </button>
                    </form>

                    if transcript.streaming {
                        <Loading size={LoadingSize::Small} inline={true} text={Some("Waiting for the AI service...".to_string())} />
                    }

                    if let Some(sql) = &transcript.sql {
                        <div class="flex flex-col gap-2">
                            <div class="flex justify-between items-center">
                                <h3 class="font-semibold">{"Generated SQL"}</h3>
                                <ExportButtons sql={sql.clone()} />
                            </div>
                            <pre class="bg-base-200 rounded p-3 text-sm overflow-x-auto"><code>{sql}</code></pre>
                        </div>
                    }

                    if let Some(err) = &transcript.error {
                        <ErrorDisplay title="The question could not be answered" message={err.clone()} />
                    }

                    if !transcript.rows.is_empty() {
                        <div class="flex flex-col gap-2">
                            <h3 class="font-semibold">{format!("Result ({} rows)", transcript.rows.len())}</h3>
                            <ResultsTable rows={transcript.rows.clone()} />
                        </div>
                    } else if !transcript.streaming && transcript.sql.is_some() && transcript.error.is_none() {
                        <p class="text-sm text-gray-500">{"The query returned no rows."}</p>
                    }
                </div>
            </div>

            <div class="card bg-base-100 shadow">
                <div class="card-body">
                    <h2 class="card-title text-base">{"Recent questions"}</h2>
                    <FetchRender<Vec<ChatHistoryDto>>
                        state={(*history).clone()}
                        render={Callback::from(move |entries: Vec<ChatHistoryDto>| render_history(entries, on_pick.clone()))}
                        on_retry={Some(refetch_history)}
                    />
                </div>
            </div>
        </div>
    }
}
