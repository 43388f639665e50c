use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct Props {
    pub title: AttrValue,
}

#[function_component(Navbar)]
pub fn navbar(props: &Props) -> Html {
    // Widgets keep no shared cache, so a refresh reloads the whole page
    let on_reload = Callback::from(|_| {
        log::debug!("Reloading dashboard");
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().reload() {
                log::error!("Reload failed: {:?}", e);
            }
        }
    });

    html! {
        <div class="navbar bg-base-100 shadow-sm z-40 sticky top-0">
            <div class="flex-none lg:hidden">
                <label aria-label="open sidebar" class="btn btn-square btn-ghost" for="app-drawer">
                    <i class="fas fa-bars text-xl"></i>
                </label>
            </div>
            <div class="flex-1 px-4">
                <h1 class="text-xl font-bold">{props.title.clone()}</h1>
            </div>
            <div class="flex-none">
                <button class="btn btn-ghost btn-circle" title="Reload" onclick={on_reload}>
                    <i class="fas fa-sync-alt"></i>
                </button>
            </div>
        </div>
    }
}
