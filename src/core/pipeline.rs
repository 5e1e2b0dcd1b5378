use crate::app::view::render;
use crate::core::aggregate::{aggregate, SummaryTable, SummaryTables};
use crate::core::loader::{LoadOptions, COL_HOUR};
use crate::core::{ConfigProvider, OrderTable, OutputFormat, Pipeline, Storage};
use crate::utils::error::{DashboardError, Result};
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const BUNDLE_NAME: &str = "dashboard_output.zip";

/// Reads the orders export, aggregates it and bundles the tables for the renderer.
pub struct DashboardPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> DashboardPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn build_bundle(&self, summary: &SummaryTables) -> Result<Vec<u8>> {
        let formats = self.config.output_formats();
        let options = SimpleFileOptions::default();
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        if formats.contains(&OutputFormat::Csv) {
            for table in summary.tables() {
                zip.start_file(format!("{}.csv", table.name), options)?;
                zip.write_all(&table_csv(table)?)?;
            }
            zip.start_file("hour_to_clock.csv", options)?;
            zip.write_all(&hour_map_csv(summary)?)?;
        }

        if formats.contains(&OutputFormat::Json) {
            zip.start_file("summary.json", options)?;
            zip.write_all(serde_json::to_string_pretty(summary)?.as_bytes())?;

            zip.start_file("view.json", options)?;
            zip.write_all(serde_json::to_string_pretty(&render(summary))?.as_bytes())?;
        }

        // 清單檔案，記錄來源與各表列數
        let tables: serde_json::Map<String, serde_json::Value> = summary
            .tables()
            .iter()
            .map(|t| (t.name.clone(), serde_json::json!(t.len())))
            .collect();
        let manifest = serde_json::json!({
            "dashboard": self.config.dashboard_name(),
            "input": self.config.input_path(),
            "orders": summary.order_count(),
            "tables": tables,
            "formats": formats,
            "generated_at": chrono::Utc::now().to_rfc3339(),
        });
        zip.start_file("manifest.json", options)?;
        zip.write_all(serde_json::to_string_pretty(&manifest)?.as_bytes())?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| DashboardError::IoError(e.into_error()))
}

pub fn table_csv(table: &SummaryTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns())?;
    for row in table.string_rows() {
        writer.write_record(&row)?;
    }
    finish_csv(writer)
}

fn hour_map_csv(summary: &SummaryTables) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([COL_HOUR, "label"])?;
    for (hour, label) in &summary.hour_to_clock {
        writer.write_record([hour, label])?;
    }
    finish_csv(writer)
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DashboardPipeline<S, C> {
    async fn extract(&self) -> Result<OrderTable> {
        let input = self.config.input_path();
        tracing::debug!("Reading orders from: {}", input);

        let bytes = self.storage.read_file(input).await.map_err(|e| match e {
            DashboardError::IoError(io) => DashboardError::data_load(input, io.to_string()),
            other => other,
        })?;

        let options = LoadOptions {
            missing_keys: self.config.missing_keys(),
        };
        OrderTable::from_bytes(input, &bytes, &options)
    }

    async fn transform(&self, table: OrderTable) -> Result<SummaryTables> {
        aggregate(&table)
    }

    async fn load(&self, summary: &SummaryTables) -> Result<String> {
        let output_path = std::path::Path::new(self.config.output_path())
            .join(BUNDLE_NAME)
            .to_string_lossy()
            .into_owned();

        let bundle = self.build_bundle(summary)?;

        tracing::debug!("Writing bundle ({} bytes) to {}", bundle.len(), output_path);
        self.storage.write_file(&output_path, &bundle).await?;

        Ok(output_path)
    }
}
