//! # Application State
//!
//! ```text
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │ AppConfig                │   │ DbState                  │
//! │ storage mode, file path  │──►│ Database (writer mutex + │
//! │ (read-only after start)  │   │ snapshot cache)          │
//! └──────────────────────────┘   └──────────────────────────┘
//! ```

mod config;
mod db;

pub use config::{AppConfig, StorageMode, DEFAULT_STORAGE_KEY};
pub use db::DbState;
