// Pre-settlement inspection pipeline.
//
// Takes a wide checklist export (one row per unit audit) and a trade
// mapping, and produces normalized defect items plus the metrics snapshot
// that reports and dashboards read. See `pipeline::process`.

pub mod building;
pub mod classify;
pub mod columns;
pub mod config;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod pipeline;
pub mod schedule;
pub mod store;
pub mod trades;
pub mod types;
pub mod util;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use loader::{RawInspectionRow, RawTable};
pub use pipeline::{process, process_at, Pipeline, ProcessedInspection};
pub use trades::TradeMapping;
pub use types::{
    AreaType, BuildingDefaults, Metrics, NormalizedItem, StatusClass, Urgency, UserPriorityConfig,
};
