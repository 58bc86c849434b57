#![forbid(unsafe_code)]

//! Core domain model and business logic for FitTrack.
//!
//! This crate provides:
//! - Domain types (meals, workouts, daily logs, profile, cycle data)
//! - Persistence behind the `KeyValueStore` trait
//! - Daily log editing, the weekly nutrition plan and workout editing
//! - The cycle engine and the stats engine
//! - AI estimation with offline fallbacks
//! - CSV export

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod dates;
pub mod store;
pub mod daily_log;
pub mod nutrition;
pub mod plan;
pub mod workout;
pub mod profile;
pub mod cycle;
pub mod stats;
pub mod ai;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use ai::{Estimator, FoodEstimate, WorkoutPlan};
pub use cycle::{CycleSettings, MonthCalendar};
pub use profile::{BmiCategory, ProfileUpdate};
pub use stats::calculate_stats;
