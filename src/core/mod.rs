pub mod aggregate;
pub mod etl;
pub mod hours;
pub mod loader;
pub mod pipeline;

pub use crate::domain::model::{OrderRecord, OrderTable, Record};
pub use crate::domain::ports::{ConfigProvider, OutputFormat, Pipeline, Storage};
pub use crate::utils::error::Result;
