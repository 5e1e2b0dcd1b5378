use crate::core::aggregate::SummaryTables;
use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// What a finished run hands back to the caller.
#[derive(Debug, Clone)]
pub struct EtlOutcome {
    pub output_path: String,
    pub summary: SummaryTables,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Runs extract, transform and load in order. The first failing stage aborts the run.
    pub async fn run(&self) -> Result<EtlOutcome> {
        tracing::info!("Starting dashboard aggregation...");

        let table = self.pipeline.extract().await?;
        tracing::info!("Extracted {} order rows from {}", table.len(), table.origin);
        self.monitor.log_stats("Extract");

        let summary = self.pipeline.transform(table).await?;
        tracing::info!(
            "Built summary tables: {}",
            summary
                .tables()
                .iter()
                .map(|t| format!("{}={}", t.name, t.len()))
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.monitor.log_stats("Transform");

        let output_path = self.pipeline.load(&summary).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(EtlOutcome {
            output_path,
            summary,
        })
    }
}
