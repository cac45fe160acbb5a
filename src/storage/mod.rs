//! Record store access
//!
//! This module defines the [`RecordStore`] abstraction used by the reports and
//! its two implementations: MongoDB for production and an in-memory store.

pub mod mongo;
pub mod repository;

pub use mongo::MongoRecordStore;
pub use repository::{create_memory_store, MemoryRecordStore, RecordStore, SharedRecordStore};
