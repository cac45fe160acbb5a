//! zenclass - Zen Class reporting API
//!
//! Read-only HTTP reports over the bootcamp tracking data: learners, mentors,
//! attendance, coding practice, curriculum topics/tasks and recruiting drives.
//!
//! # Architecture
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Records and report projections
//! - [`storage`] - Record store trait, MongoDB and in-memory implementations
//! - [`reports`] - Query logic behind each endpoint
//! - [`server`] - axum router, handlers and server lifecycle
//! - [`utils`] - Date parsing and formatting helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use zenclass::config::Config;
//! use zenclass::server::ReportServer;
//! use zenclass::storage::MongoRecordStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let store = MongoRecordStore::connect(&config.database).await?;
//!     let server = ReportServer::new(config.server, Arc::new(store))?;
//!     server.start().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod reports;
pub mod server;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::models::{DateWindow, RecordId};
    pub use crate::server::{ReportServer, ServerConfig};
    pub use crate::storage::{MemoryRecordStore, MongoRecordStore, RecordStore, SharedRecordStore};
}

pub use models::{DateWindow, RecordId};
