//! Materials inventory grid: read-only, partitioned by purchase year.

pub const GRID_ID: &str = "materials";
pub const KEY_FIELD: &str = "id";

pub const CODICE: &str = "codice";
pub const CODICENET: &str = "codicenet";
pub const DESCRIZIONE: &str = "descrizione";
pub const IMPORTO: &str = "Importo";

/// Per-warehouse stock columns, in display order.
pub const QUANTITIES: [&str; 5] = [
    "Qta Torino",
    "Qta Milano",
    "Qta Genova",
    "Qta Bologna",
    "Qta Roma",
];

/// Columns filtered from the page's search panel.
pub const TEXT_FILTERS: [(&str, &str); 3] = [
    (CODICE, "Codice"),
    (CODICENET, "Codice NET"),
    (DESCRIZIONE, "Descrizione"),
];

pub fn is_quantity(field: &str) -> bool {
    QUANTITIES.contains(&field)
}
