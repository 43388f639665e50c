use yew::prelude::*;
use super::charts::{CashOutflowChart, CategoryChart, InvoiceTrendChart, VendorChart};
use super::invoices_table::InvoicesTable;
use super::overview::Overview;

#[function_component(Dashboard)]
pub fn dashboard() -> Html {
    html! {
        <div class="flex flex-col gap-8">
            <Overview />
            <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                <InvoiceTrendChart />
                <VendorChart />
            </div>
            <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-4">
                <CategoryChart />
                <CashOutflowChart />
                <InvoicesTable />
            </div>
        </div>
    }
}
