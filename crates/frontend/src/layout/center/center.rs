use crate::layout::global_context::AppGlobalContext;
use crate::layout::pages::render_page;
use leptos::prelude::*;

/// Main content zone: renders the page selected in the sidebar.
///
/// Switching pages drops the previous page, and with it its grid controller.
#[component]
pub fn Center() -> impl IntoView {
    let ctx = leptos::context::use_context::<AppGlobalContext>()
        .expect("AppGlobalContext context not found");

    view! {
        <div data-zone="center" class="app-tabs" style="flex: 1; overflow: auto;">
            {move || render_page(ctx.active.get().as_deref())}
        </div>
    }
}
