use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ChartCardProps {
    pub title: AttrValue,
    #[prop_or_default]
    pub subtitle: Option<AttrValue>,
    pub children: Children,
}

/// Titled card that frames one dashboard widget.
#[function_component(ChartCard)]
pub fn chart_card(props: &ChartCardProps) -> Html {
    html! {
        <div class="card bg-base-100 shadow h-full">
            <div class="card-body">
                <h2 class="card-title text-lg">{props.title.clone()}</h2>
                if let Some(subtitle) = &props.subtitle {
                    <p class="text-sm text-gray-500">{subtitle.clone()}</p>
                }
                { for props.children.iter() }
            </div>
        </div>
    }
}
