//! The pure computation core: calendar bucketing, gap filling, moving
//! averages, change reconstruction and incident extraction. Everything here
//! is synchronous, deterministic and free of I/O; orchestration and data
//! access live in `metrics` and `store`.

pub mod average;
pub mod bucket;
pub mod changes;
pub mod error;
pub mod fill;
pub mod incidents;

pub use average::{moving_average, moving_average_ratio, ZeroDenominator};
pub use bucket::bucket_daily;
pub use changes::reconstruct_changes;
pub use error::EngineError;
pub use fill::{fill_gaps, FilledDaily};
pub use incidents::{extract_incidents, Relation};
