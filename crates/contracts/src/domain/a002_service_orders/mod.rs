//! Service orders grid: editable, partitioned by presentation month.

pub const GRID_ID: &str = "service_orders";
pub const KEY_FIELD: &str = "ID";

/// Column holding the presentation month (`MAGGIO`, ...).
pub const PARTITION_FIELD: &str = "MesePresentazione";
/// Technician column, filtered through an exact-match dropdown.
pub const RTC: &str = "RTC";

pub const MONTHS: [&str; 12] = [
    "GENNAIO",
    "FEBBRAIO",
    "MARZO",
    "APRILE",
    "MAGGIO",
    "GIUGNO",
    "LUGLIO",
    "AGOSTO",
    "SETTEMBRE",
    "OTTOBRE",
    "NOVEMBRE",
    "DICEMBRE",
];
