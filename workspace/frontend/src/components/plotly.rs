use serde_json::Value;
use wasm_bindgen::prelude::*;
use web_sys::Element;
use yew::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = Plotly)]
    fn newPlot(div_id: &str, data: JsValue, layout: JsValue, config: JsValue);
}

/// Layout shared by the dashboard charts; `extra` entries override the defaults.
pub fn base_layout(extra: Value) -> Value {
    let mut layout = serde_json::json!({
        "margin": {"t": 10, "r": 10, "l": 50, "b": 40},
        "paper_bgcolor": "rgba(0,0,0,0)",
        "plot_bgcolor": "rgba(0,0,0,0)",
        "xaxis": {"showgrid": false},
        "yaxis": {"showgrid": true, "gridcolor": "#eee"},
        "showlegend": false
    });
    if let (Some(base), Value::Object(extra)) = (layout.as_object_mut(), extra) {
        base.extend(extra);
    }
    layout
}

#[derive(Properties, PartialEq)]
pub struct PlotProps {
    /// DOM id of the plot container; Plotly addresses plots by id
    pub id: AttrValue,
    pub traces: Value,
    pub layout: Value,
    #[prop_or(AttrValue::Static("height: 300px;"))]
    pub style: AttrValue,
}

/// Container that (re)draws a Plotly figure whenever its data changes.
#[function_component(Plot)]
pub fn plot(props: &PlotProps) -> Html {
    let chart_ref = use_node_ref();

    {
        let chart_ref = chart_ref.clone();
        use_effect_with((props.traces.clone(), props.layout.clone()), move |(traces, layout)| {
            if let Some(element) = chart_ref.cast::<Element>() {
                let config = serde_json::json!({"responsive": true, "displayModeBar": false});
                let div_id = element.id();
                let values = (
                    serde_wasm_bindgen::to_value(traces),
                    serde_wasm_bindgen::to_value(layout),
                    serde_wasm_bindgen::to_value(&config),
                );
                match values {
                    (Ok(traces), Ok(layout), Ok(config)) if !div_id.is_empty() => {
                        log::trace!("Drawing plot {}", div_id);
                        newPlot(&div_id, traces, layout, config);
                    }
                    _ => log::warn!("Skipping plot {}: could not convert figure", div_id),
                }
            }
            || ()
        });
    }

    html! {
        <div ref={chart_ref} id={props.id.clone()} class="chart-container" style={props.style.clone()}></div>
    }
}
