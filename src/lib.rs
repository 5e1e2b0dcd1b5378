pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::storage::LocalStorage;
pub use app::view::{render, DashboardView};
pub use crate::core::{
    aggregate::{aggregate, aggregate_by, GroupKey, Metric, SummaryTable, SummaryTables},
    etl::{EtlEngine, EtlOutcome},
    hours::build_hour_label_map,
    loader::{load, LoadOptions},
    pipeline::DashboardPipeline,
};
pub use domain::model::{NullKeyPolicy, OrderTable};
pub use utils::error::{DashboardError, Result};
