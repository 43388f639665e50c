use yew::prelude::*;
use yew_router::prelude::*;
use crate::Route;

#[function_component(Sidebar)]
pub fn sidebar() -> Html {
    let route = use_route::<Route>();
    let item = |target: Route, icon: &'static str, label: &'static str| {
        let active = route.as_ref() == Some(&target);
        html! {
            <li>
                <Link<Route> to={target} classes={classes!("nav-link", active.then_some("active"))}>
                    <i class={classes!("fas", icon, "w-5")}></i>{format!(" {}", label)}
                </Link<Route>>
            </li>
        }
    };

    html! {
        <div class="drawer-side z-50">
            <label aria-label="close sidebar" class="drawer-overlay" for="app-drawer"></label>
            <ul class="menu p-4 w-64 min-h-full bg-base-100 text-base-content border-r border-base-300">
                <li class="mb-4">
                    <div class="flex items-center gap-3 px-2">
                        <div class="w-10 h-10 rounded-lg bg-primary flex items-center justify-center text-primary-content font-bold text-2xl">
                            <i class="fas fa-file-invoice"></i>
                        </div>
                        <span class="text-2xl font-bold tracking-tight">{"Invoices"}</span>
                    </div>
                </li>
                {item(Route::Dashboard, "fa-home", "Dashboard")}
                {item(Route::Chat, "fa-comments", "Chat with Data")}
            </ul>
        </div>
    }
}
