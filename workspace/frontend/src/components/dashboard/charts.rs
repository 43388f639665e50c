use yew::prelude::*;
use common::{CashOutflow, CategorySpend, InvoiceTrend, VendorSpend};
use crate::api_client::dashboard::{get_cash_outflow, get_category_spend, get_invoice_trends, get_top_vendors};
use crate::common::fetch_hook::use_fetch_with_refetch;
use crate::common::fetch_render::FetchRender;
use crate::components::plotly::{base_layout, Plot};
use super::card::ChartCard;
use super::series::{monthly_outflow, monthly_trends};

const PALETTE: [&str; 4] = ["#0088FE", "#00C49F", "#FFBB28", "#FF8042"];

fn empty_notice(message: &str) -> Html {
    html! {
        <div class="alert alert-info">
            <i class="fas fa-info-circle"></i>
            <span>{message.to_string()}</span>
        </div>
    }
}

fn render_trends(trends: Vec<InvoiceTrend>) -> Html {
    if trends.is_empty() {
        return empty_notice("No invoices yet.");
    }
    let months = monthly_trends(&trends);
    let labels: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
    let counts: Vec<i64> = months.iter().map(|m| m.invoices).collect();
    let spend: Vec<f64> = months.iter().map(|m| m.spend).collect();

    let traces = serde_json::json!([
        {
            "x": labels,
            "y": counts,
            "type": "bar",
            "name": "Invoice count",
            "marker": {"color": "#93c5fd"}
        },
        {
            "x": labels,
            "y": spend,
            "type": "scatter",
            "mode": "lines+markers",
            "name": "Total spend",
            "yaxis": "y2",
            "line": {"color": "#1e3a8a", "shape": "spline"}
        }
    ]);
    let layout = base_layout(serde_json::json!({
        "margin": {"t": 10, "r": 60, "l": 40, "b": 40},
        "showlegend": true,
        "legend": {"orientation": "h"},
        "yaxis2": {"overlaying": "y", "side": "right", "showgrid": false, "tickprefix": "€"}
    }));

    html! { <Plot id="chart-invoice-trends" {traces} {layout} /> }
}

#[function_component(InvoiceTrendChart)]
pub fn invoice_trend_chart() -> Html {
    let (state, refetch) = use_fetch_with_refetch(get_invoice_trends);

    html! {
        <ChartCard title="Invoice Volume + Value Trend" subtitle={Some(AttrValue::from("Invoice count and total spend per month"))}>
            <FetchRender<Vec<InvoiceTrend>>
                state={(*state).clone()}
                render={Callback::from(render_trends)}
                on_retry={Some(refetch)}
            />
        </ChartCard>
    }
}

fn render_vendors(vendors: Vec<VendorSpend>) -> Html {
    if vendors.is_empty() {
        return empty_notice("No vendor spend recorded.");
    }
    // Plotly draws horizontal bars bottom-up; reverse to keep the biggest vendor on top
    let names: Vec<&str> = vendors.iter().rev().map(|v| v.name.as_str()).collect();
    let totals: Vec<f64> = vendors.iter().rev().map(|v| v.total_spend).collect();

    let traces = serde_json::json!([{
        "x": totals,
        "y": names,
        "type": "bar",
        "orientation": "h",
        "name": "Total Spend",
        "marker": {"color": "#8884d8"}
    }]);
    let layout = base_layout(serde_json::json!({
        "margin": {"t": 10, "r": 10, "l": 120, "b": 40},
        "xaxis": {"showgrid": true, "gridcolor": "#eee", "tickprefix": "€"},
        "yaxis": {"automargin": true}
    }));

    html! { <Plot id="chart-top-vendors" {traces} {layout} /> }
}

#[function_component(VendorChart)]
pub fn vendor_chart() -> Html {
    let (state, refetch) = use_fetch_with_refetch(get_top_vendors);

    html! {
        <ChartCard title="Spend by Vendor (Top 10)">
            <FetchRender<Vec<VendorSpend>>
                state={(*state).clone()}
                render={Callback::from(render_vendors)}
                on_retry={Some(refetch)}
            />
        </ChartCard>
    }
}

fn render_categories(categories: Vec<CategorySpend>) -> Html {
    if categories.is_empty() {
        return empty_notice("No categorised line items.");
    }
    let labels: Vec<&str> = categories.iter().map(|c| c.category.as_str()).collect();
    let values: Vec<f64> = categories.iter().map(|c| c.spend).collect();
    let colors: Vec<&str> = (0..categories.len()).map(|i| PALETTE[i % PALETTE.len()]).collect();

    let traces = serde_json::json!([{
        "labels": labels,
        "values": values,
        "type": "pie",
        "hole": 0.5,
        "marker": {"colors": colors},
        "textinfo": "label+percent"
    }]);
    let layout = base_layout(serde_json::json!({
        "margin": {"t": 10, "r": 10, "l": 10, "b": 10},
        "showlegend": true
    }));

    html! { <Plot id="chart-category-spend" {traces} {layout} /> }
}

#[function_component(CategoryChart)]
pub fn category_chart() -> Html {
    let (state, refetch) = use_fetch_with_refetch(get_category_spend);

    html! {
        <ChartCard title="Spend by Category">
            <FetchRender<Vec<CategorySpend>>
                state={(*state).clone()}
                render={Callback::from(render_categories)}
                on_retry={Some(refetch)}
            />
        </ChartCard>
    }
}

fn render_outflow(outflow: Vec<CashOutflow>) -> Html {
    let months = monthly_outflow(&outflow);
    if months.is_empty() {
        return empty_notice("No upcoming payments.");
    }
    let (labels, amounts): (Vec<String>, Vec<f64>) = months.into_iter().unzip();

    let traces = serde_json::json!([{
        "x": labels,
        "y": amounts,
        "type": "bar",
        "name": "Amount",
        "marker": {"color": "#8884d8"}
    }]);
    let layout = base_layout(serde_json::json!({
        "yaxis": {"showgrid": true, "gridcolor": "#eee", "tickprefix": "€"}
    }));

    html! { <Plot id="chart-cash-outflow" {traces} {layout} /> }
}

#[function_component(CashOutflowChart)]
pub fn cash_outflow_chart() -> Html {
    let (state, refetch) = use_fetch_with_refetch(get_cash_outflow);

    html! {
        <ChartCard title="Cash Outflow Forecast" subtitle={Some(AttrValue::from("Payments by due month"))}>
            <FetchRender<Vec<CashOutflow>>
                state={(*state).clone()}
                render={Callback::from(render_outflow)}
                on_retry={Some(refetch)}
            />
        </ChartCard>
    }
}
