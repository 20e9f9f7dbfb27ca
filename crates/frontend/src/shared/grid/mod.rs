//! Server-driven editable grid: sans-IO model, async controller over a
//! transport seam, and the Leptos views that render it.

pub mod controller;
pub mod debounce;
pub mod error;
pub mod model;
pub mod transport;
pub mod view;

pub use controller::{GridController, DEFAULT_DEBOUNCE_MS};
pub use error::{GridError, Notice, NoticeKind};
pub use model::{EditOutcome, FetchOutcome, GridModel, GridPhase, GridSnapshot};
pub use transport::{BrowserTimer, GridTimer, GridTransport, HttpTransport};
pub use view::{
    plain_cell, CellFormatter, CellView, ColumnMenu, EditableGrid, GridFooter, GridHandle,
    NoticeBanner,
};
