#![forbid(unsafe_code)]

//! Core domain model and business logic for the LiftLog system.
//!
//! This crate provides:
//! - Domain types (sets, exercises, workouts, routines)
//! - Unit/intensity conversion and derived metrics
//! - The session store and its set mutation engine
//! - The rest timer
//! - Persistence, backend and notification collaborators
//! - Finish/save flows, history and CSV export

pub mod types;
pub mod error;
pub mod units;
pub mod metrics;
pub mod sets;
pub mod session;
pub mod timer;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod persist;
pub mod backend;
pub mod notify;
pub mod flows;
pub mod history;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use session::{ActiveSession, ActiveSessionMut, SessionStore, StoreMode};
pub use timer::{RestTimer, Tick, TimerTarget};
pub use catalog::{get_default_catalog, ReferenceData};
pub use config::Config;
pub use persist::{FileStore, KeyValueStore, MemoryStore, SessionPersister};
pub use backend::{Backend, LocalBackend};
pub use notify::{Notifier, TracingNotifier};
pub use metrics::{format_time, total_sets, total_volume, workout_percentage, SetTotals};
