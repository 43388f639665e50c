use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct LoadingProps {
    #[prop_or_default]
    pub size: LoadingSize,
    #[prop_or_default]
    pub text: Option<String>,
    /// Render inline instead of as a padded block
    #[prop_or_default]
    pub inline: bool,
}

#[derive(Clone, PartialEq, Default)]
pub enum LoadingSize {
    Small,
    #[default]
    Large,
}

impl LoadingSize {
    fn class(&self) -> &'static str {
        match self {
            LoadingSize::Small => "loading-sm",
            LoadingSize::Large => "loading-lg",
        }
    }
}

#[function_component(Loading)]
pub fn loading(props: &LoadingProps) -> Html {
    let container = if props.inline {
        "inline-flex items-center gap-2"
    } else {
        "flex flex-col justify-center items-center py-12 gap-4"
    };

    html! {
        <div class={container}>
            <span class={classes!("loading", "loading-spinner", props.size.class())}></span>
            if let Some(text) = &props.text {
                <span class="text-sm text-gray-500">{text}</span>
            }
        </div>
    }
}
