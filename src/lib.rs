pub mod api;
pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod reconcile;
pub mod resolve;
pub mod transport;

pub use api::ApiClient;
pub use error::{ApiError, ApiResult};
pub use transport::Transport;
