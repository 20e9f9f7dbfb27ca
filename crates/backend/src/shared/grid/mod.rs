pub mod error;
pub mod export;
pub mod query_builder;
pub mod registry;
pub mod repository;
pub mod schema;

pub use error::GridQueryError;
pub use registry::load_schema;
