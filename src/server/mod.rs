//! HTTP server for the reporting API
//!
//! # Endpoints
//!
//! ```text
//! GET /topics-tasks/october
//! GET /company-drives/date-range?startDate=..&endDate=..
//! GET /company-drives-with-students
//! GET /codekata/problems-solved/{user_id}
//! GET /mentors/with-mentees-count
//! GET /users/absent-no-task
//! ```
//!
//! Any other path answers 404 `{"error":"Endpoint not found"}`.
//!
//! # Usage
//!
//! ```ignore
//! use zenclass::server::{ReportServer, ServerConfig};
//! use zenclass::storage::create_memory_store;
//!
//! let server = ReportServer::new(ServerConfig::default(), create_memory_store())?;
//! server.start().await?;
//! ```

pub mod api;
pub mod config;
#[allow(clippy::module_inception)]
pub mod server;

pub use config::ServerConfig;
pub use server::{AppState, ReportServer, ServerError};
