//! Observability: Prometheus exposition of host status.
//!
//! # Usage
//!
//! ```rust,ignore
//! use judge_probe::observability::StatusMetrics;
//!
//! let metrics = StatusMetrics::new()?;
//! metrics.observe(&reporter.snapshot());
//! println!("{}", metrics.encode()?);
//! ```

pub mod metrics;

pub use metrics::StatusMetrics;
