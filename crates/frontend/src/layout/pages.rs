//! Page registry: the single place mapping a page key to its label and view.

use crate::domain::a001_materials::ui::list::MaterialsList;
use crate::domain::a002_service_orders::ui::list::ServiceOrdersList;
use crate::shared::page_frame::PageFrame;
use crate::shared::page_standard::PAGE_CAT_CUSTOM;
use leptos::logging::log;
use leptos::prelude::*;

/// Keys in sidebar order.
pub const PAGE_KEYS: &[&str] = &["a001_materials", "a002_service_orders"];

/// Readable label for a page key. Falls back to the key itself.
pub fn page_label(key: &str) -> &str {
    match key {
        "a001_materials" => "Materiali",
        "a002_service_orders" => "Ordini Servizi",
        other => other,
    }
}

/// Renders the page for `key`, or the welcome page when nothing is selected.
pub fn render_page(key: Option<&str>) -> AnyView {
    match key {
        Some("a001_materials") => view! { <MaterialsList /> }.into_any(),
        Some("a002_service_orders") => view! { <ServiceOrdersList /> }.into_any(),
        Some(unknown) => {
            log!("Unknown page key: {}", unknown);
            view! { <div class="placeholder">{format!("Pagina sconosciuta: {}", unknown)}</div> }
                .into_any()
        }
        None => view! { <Welcome /> }.into_any(),
    }
}

#[component]
fn Welcome() -> impl IntoView {
    view! {
        <PageFrame page_id="welcome--custom" category=PAGE_CAT_CUSTOM>
            <div class="placeholder">"Selezionare una tabella dal menu a sinistra."</div>
        </PageFrame>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_has_a_label() {
        for key in PAGE_KEYS {
            assert_ne!(page_label(key), *key);
        }
        assert_eq!(page_label("a999_unknown"), "a999_unknown");
    }
}
