use crate::domain::model::NullKeyPolicy;
use crate::domain::ports::{ConfigProvider, OutputFormat};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DASHBOARD_NAME: &str = "Simple Product Sales Dashboard";

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "order-dashboard")]
#[command(about = "Aggregate an orders CSV into sales dashboard tables")]
pub struct CliConfig {
    /// Orders CSV export to aggregate
    #[arg(long, default_value = "orders.csv")]
    pub input: String,

    /// Directory that receives dashboard_output.zip
    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_values_t = [OutputFormat::Csv, OutputFormat::Json])]
    pub formats: Vec<OutputFormat>,

    /// How to treat empty customer, date and state values: reject or bucket
    #[arg(long, default_value_t = NullKeyPolicy::Reject)]
    pub missing_keys: NullKeyPolicy,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process memory and timing per stage")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn dashboard_name(&self) -> &str {
        DEFAULT_DASHBOARD_NAME
    }

    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    fn missing_keys(&self) -> NullKeyPolicy {
        self.missing_keys
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_file_extension("input", &self.input, &["csv"])?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_output_formats("formats", &self.formats)
    }
}
