//! # Taskmill Core Library
//!
//! Core business logic for the Taskmill personal task tracker. All
//! operations are available through the standalone CLI binary, which is a
//! thin layer over this library.
//!
//! ## Architecture
//!
//! - **Calendar**: timezone-aware date resolution, parsing, and formatting
//! - **Storage**: SQLite-backed tasks and templates plus TOML configuration
//! - **Recurrence**: pure rule matching and idempotent occurrence
//!   generation over a bounded horizon
//! - **Buckets**: the overdue/today/upcoming/soon/someday/inbox partition
//!   of the live task set
//!
//! ## Key Components
//!
//! - [`Calendar`]: calendar context bound to the configured timezone
//! - [`TaskDb`]: task and template persistence
//! - [`Config`]: application configuration
//! - [`generate_all`]: materialize occurrences from enabled templates

pub mod buckets;
pub mod calendar;
pub mod error;
pub mod recurrence;
pub mod storage;
pub mod task;
pub mod template;

pub use buckets::{classify, completed, stats, Buckets, TaskStats};
pub use calendar::Calendar;
pub use error::{ConfigError, CoreError, DatabaseError, ParseError, ValidationError};
pub use recurrence::{
    generate_all, generate_for_template, matches_on, GenerationReport, DEFAULT_HORIZON_DAYS,
    MAX_HORIZON_DAYS,
};
pub use storage::{Config, TaskDb};
pub use task::{normalize_tags, Placement, Priority, Task};
pub use template::{parse_recurrence, RecurUnit, Template};
