use std::cell::RefCell;
use std::rc::Rc;

use common::{InvoiceDto, InvoiceSortKey, SortOrder};
use gloo_timers::callback::Timeout;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::api_client::invoices::{search_invoices, InvoiceFilter};
use crate::common::error::ErrorDisplay;
use crate::common::loading::{Loading, LoadingSize};
use crate::hooks::FetchState;
use super::card::ChartCard;
use super::series::format_currency;

const SEARCH_DEBOUNCE_MS: u32 = 300;

/// Applies a header click: the active column flips direction, a new column starts ascending.
fn next_filter(filter: &InvoiceFilter, key: InvoiceSortKey) -> InvoiceFilter {
    let sort_order = if filter.sort_by == Some(key) {
        filter.sort_order.toggled()
    } else {
        SortOrder::Asc
    };
    InvoiceFilter {
        sort_by: Some(key),
        sort_order,
        ..filter.clone()
    }
}

fn sort_icon(filter: &InvoiceFilter, key: InvoiceSortKey) -> &'static str {
    match (filter.sort_by == Some(key), filter.sort_order) {
        (false, _) => "fas fa-sort text-gray-300",
        (true, SortOrder::Asc) => "fas fa-sort-up",
        (true, SortOrder::Desc) => "fas fa-sort-down",
    }
}

fn render_rows(invoices: &[InvoiceDto]) -> Html {
    if invoices.is_empty() {
        return html! {
            <tr><td colspan="5" class="text-center text-gray-500">{"No invoices match."}</td></tr>
        };
    }

    html! {
        { for invoices.iter().map(|invoice| {
            let vendor = invoice
                .vendor
                .as_ref()
                .map(|v| v.name.clone())
                .unwrap_or_else(|| "N/A".to_string());
            html! {
                <tr key={invoice.id}>
                    <td class="font-mono">{&invoice.invoice_number}</td>
                    <td>{vendor}</td>
                    <td>{invoice.invoice_date.format("%Y-%m-%d").to_string()}</td>
                    <td>{invoice.status.clone().unwrap_or_default()}</td>
                    <td class="text-right">{format_currency(invoice.invoice_total)}</td>
                </tr>
            }
        })}
    }
}

#[function_component(InvoicesTable)]
pub fn invoices_table() -> Html {
    let filter = use_state(InvoiceFilter::default);
    let search_text = use_state(String::new);
    let state = use_state(|| FetchState::<Vec<InvoiceDto>>::Loading);
    let reload = use_state(|| 0u32);
    let latest_request = use_mut_ref(|| 0u32);
    let pending_search: Rc<RefCell<Option<Timeout>>> = use_mut_ref(|| None);

    {
        let state = state.clone();
        let latest_request = latest_request.clone();
        use_effect_with(((*filter).clone(), *reload), move |(filter, _)| {
            let filter = filter.clone();
            let request_id = {
                let mut latest = latest_request.borrow_mut();
                *latest += 1;
                *latest
            };
            state.set(FetchState::Loading);

            wasm_bindgen_futures::spawn_local(async move {
                let result = search_invoices(&filter).await;
                // A newer search superseded this one
                if *latest_request.borrow() != request_id {
                    log::trace!("Dropping stale invoice response {}", request_id);
                    return;
                }
                match result {
                    Ok(invoices) => state.set(FetchState::Success(invoices)),
                    Err(e) => state.set(FetchState::Error(e)),
                }
            });
            || ()
        });
    }

    let on_search = {
        let filter = filter.clone();
        let search_text = search_text.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let value = input.value();
            search_text.set(value.clone());

            let filter = filter.clone();
            // Replacing the handle drops, and so cancels, the previous timer
            *pending_search.borrow_mut() = Some(Timeout::new(SEARCH_DEBOUNCE_MS, move || {
                log::debug!("Searching invoices for {:?}", value);
                filter.set(InvoiceFilter {
                    search: value,
                    ..(*filter).clone()
                });
            }));
        })
    };

    let on_retry = {
        let reload = reload.clone();
        Callback::from(move |_| reload.set(*reload + 1))
    };

    let header = |label: &'static str, key: InvoiceSortKey, extra_class: &'static str| {
        let filter = filter.clone();
        let icon = sort_icon(&filter, key);
        let onclick = Callback::from(move |_| filter.set(next_filter(&filter, key)));
        html! {
            <th class={classes!("cursor-pointer", "select-none", extra_class)} {onclick}>
                {label}{" "}<i class={icon}></i>
            </th>
        }
    };

    html! {
        <ChartCard title="Invoices">
            <label class="input input-bordered input-sm flex items-center gap-2 mb-2">
                <i class="fas fa-search text-gray-400"></i>
                <input
                    type="text"
                    class="grow"
                    placeholder="Search invoice number or vendor"
                    value={(*search_text).clone()}
                    oninput={on_search}
                />
            </label>
            <div class="overflow-x-auto max-h-96">
                <table class="table table-zebra table-sm table-pin-rows">
                    <thead>
                        <tr>
                            {header("Invoice #", InvoiceSortKey::InvoiceNumber, "")}
                            <th>{"Vendor"}</th>
                            {header("Date", InvoiceSortKey::InvoiceDate, "")}
                            {header("Status", InvoiceSortKey::Status, "")}
                            {header("Total", InvoiceSortKey::InvoiceTotal, "text-right")}
                        </tr>
                    </thead>
                    <tbody>
                        {match &*state {
                            FetchState::Success(invoices) => render_rows(invoices),
                            FetchState::Error(err) => html! {
                                <tr><td colspan="5">
                                    <ErrorDisplay message={err.clone()} on_retry={Some(on_retry)} />
                                </td></tr>
                            },
                            _ => html! {
                                <tr><td colspan="5">
                                    <Loading size={LoadingSize::Small} text={Some("Loading invoices...".to_string())} />
                                </td></tr>
                            },
                        }}
                    </tbody>
                </table>
            </div>
        </ChartCard>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_click_starts_ascending() {
        let filter = InvoiceFilter::default();
        let next = next_filter(&filter, InvoiceSortKey::InvoiceTotal);
        assert_eq!(next.sort_by, Some(InvoiceSortKey::InvoiceTotal));
        assert_eq!(next.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_header_click_toggles_active_column() {
        let filter = InvoiceFilter {
            search: "acme".to_string(),
            sort_by: Some(InvoiceSortKey::InvoiceDate),
            sort_order: SortOrder::Asc,
        };
        let next = next_filter(&filter, InvoiceSortKey::InvoiceDate);
        assert_eq!(next.sort_order, SortOrder::Desc);
        assert_eq!(next.search, "acme");

        let other = next_filter(&next, InvoiceSortKey::Status);
        assert_eq!(other.sort_by, Some(InvoiceSortKey::Status));
        assert_eq!(other.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_sort_icon() {
        let filter = InvoiceFilter {
            sort_by: Some(InvoiceSortKey::InvoiceTotal),
            sort_order: SortOrder::Desc,
            ..InvoiceFilter::default()
        };
        assert_eq!(sort_icon(&filter, InvoiceSortKey::InvoiceTotal), "fas fa-sort-down");
        assert_eq!(sort_icon(&filter, InvoiceSortKey::Status), "fas fa-sort text-gray-300");
    }
}
