pub mod database_lifecycle;
pub mod filter_adapter;
pub mod round_executor;

pub use database_lifecycle::{DatabaseHandle, DatabaseManager};
pub use filter_adapter::FilterAdapter;
pub use round_executor::RoundExecutor;
