//! Page category constants.
//!
//! Every page rendered in the center zone declares an HTML `id` in the
//! format `{entity}--{category}` (e.g. `"a001_materials--list"`) and a
//! `data-page-category` with one of the constants below.

/// List of records: grid with filters and pagination.
pub const PAGE_CAT_LIST: &str = "list";

/// Free-form page, exempt from the `page__header` + `page__content` layout.
pub const PAGE_CAT_CUSTOM: &str = "custom";

/// Validate that a page id matches the `{entity}--{category}` format.
pub fn is_valid_page_id(id: &str) -> bool {
    let parts: Vec<&str> = id.splitn(2, "--").collect();
    parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty()
}
