//! Host status reporting.
//!
//! A [`StatusSnapshot`] combines the usable core count with live host
//! metrics and the judging engine version. Serialized as:
//!
//! ```json
//! {"hostname":"judge-1","cpu":12.5,"cpu_core":4,"memory":40.0,"judger_version":"2.1.0"}
//! ```

mod reporter;
mod snapshot;

pub use reporter::StatusReporter;
pub use snapshot::{JudgerVersion, StatusSnapshot};
