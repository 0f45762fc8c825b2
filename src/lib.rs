pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod reconcile;
pub mod services;
pub mod session;

pub use api::HttpApiClient;
pub use config::ClientConfig;
pub use error::{AppError, ErrorKind};
pub use session::Session;
