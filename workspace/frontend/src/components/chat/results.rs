use serde_json::Value;
use yew::prelude::*;
use super::transcript::{cell_text, columns};

#[derive(Properties, PartialEq)]
pub struct ResultsTableProps {
    pub rows: Vec<Value>,
}

/// Result rows of a chat answer as a table, one column per key.
#[function_component(ResultsTable)]
pub fn results_table(props: &ResultsTableProps) -> Html {
    if props.rows.is_empty() {
        return html! {};
    }
    let headers = columns(&props.rows);

    html! {
        <div class="overflow-x-auto max-h-[32rem]">
            <table class="table table-zebra table-sm table-pin-rows">
                <thead>
                    <tr>
                        { for headers.iter().map(|h| html! { <th>{h}</th> }) }
                    </tr>
                </thead>
                <tbody>
                    { for props.rows.iter().map(|row| html! {
                        <tr>
                            { for headers.iter().map(|h| html! {
                                <td class="whitespace-nowrap">{cell_text(row.get(h))}</td>
                            }) }
                        </tr>
                    }) }
                </tbody>
            </table>
        </div>
    }
}
