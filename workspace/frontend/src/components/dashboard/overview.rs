use yew::prelude::*;
use common::StatsResponse;
use crate::api_client::dashboard::get_stats;
use crate::common::fetch_hook::use_fetch_with_refetch;
use crate::common::fetch_render::FetchRender;
use crate::components::plotly::{base_layout, Plot};
use super::series::format_currency;

/// Colour of a change label: green when it rises, red when it falls.
fn change_color(change: &str) -> &'static str {
    if change.starts_with('+') {
        "#22c55e"
    } else if change.starts_with('-') {
        "#ef4444"
    } else {
        "#64748b"
    }
}

#[derive(Properties, PartialEq)]
struct OverviewCardProps {
    id: AttrValue,
    title: AttrValue,
    value: String,
    change: String,
    trend: Vec<f64>,
}

#[function_component(OverviewCard)]
fn overview_card(props: &OverviewCardProps) -> Html {
    let color = change_color(&props.change);
    let traces = serde_json::json!([{
        "y": props.trend,
        "type": "scatter",
        "mode": "lines",
        "fill": "tozeroy",
        "line": {"color": color, "shape": "spline", "width": 1.5},
        "hoverinfo": "skip"
    }]);
    let layout = base_layout(serde_json::json!({
        "margin": {"t": 0, "r": 0, "l": 0, "b": 0},
        "xaxis": {"visible": false},
        "yaxis": {"visible": false}
    }));

    html! {
        <div class="stats shadow bg-base-100">
            <div class="stat">
                <div class="stat-title text-xs">{props.title.clone()}</div>
                <div class="flex items-end justify-between gap-4">
                    <div class="min-w-0">
                        <div class="stat-value text-2xl truncate">{&props.value}</div>
                        <div class="stat-desc">
                            <span class="font-semibold" style={format!("color: {}", color)}>{&props.change}</span>
                            {" from last month"}
                        </div>
                    </div>
                    <Plot id={props.id.clone()} {traces} {layout} style="width: 80px; height: 32px;" />
                </div>
            </div>
        </div>
    }
}

fn render_cards(stats: StatsResponse) -> Html {
    let spend: Vec<f64> = stats.trend.iter().map(|d| d.spend).collect();
    let invoices: Vec<f64> = stats.trend.iter().map(|d| d.invoices as f64).collect();
    let averages: Vec<f64> = stats.trend.iter().map(|d| d.average).collect();

    html! {
        <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-4">
            <OverviewCard
                id="spark-total-spend"
                title="Total Spend (YTD)"
                value={format_currency(stats.total_spend)}
                change={stats.spend_change.clone()}
                trend={spend}
            />
            <OverviewCard
                id="spark-total-invoices"
                title="Total Invoices Processed"
                value={stats.total_invoices.to_string()}
                change={stats.invoices_change.clone()}
                trend={invoices.clone()}
            />
            <OverviewCard
                id="spark-documents"
                title="Documents Uploaded"
                value={stats.documents_uploaded.to_string()}
                change={stats.invoices_change.clone()}
                trend={invoices}
            />
            <OverviewCard
                id="spark-average"
                title="Average Invoice Value"
                value={format_currency(stats.average_invoice_value)}
                change={stats.average_change.clone()}
                trend={averages}
            />
        </div>
    }
}

#[function_component(Overview)]
pub fn overview() -> Html {
    let (state, refetch) = use_fetch_with_refetch(get_stats);

    html! {
        <FetchRender<StatsResponse>
            state={(*state).clone()}
            render={Callback::from(render_cards)}
            on_retry={Some(refetch)}
        />
    }
}
