//! Data module - sales CSV ingestion, cleaning, caching and filtering

pub mod clean;
pub mod schema;

mod cache;
mod filter;
mod loader;

pub use cache::TableCache;
pub use filter::FilterState;
pub use loader::{LoaderError, SalesLoader};
