use crate::domain::model::{
    Amount, NullKeyPolicy, OrderRecord, OrderTable, PurchaseHour, MISSING_KEY,
};
use crate::utils::error::{DashboardError, Result};
use csv::StringRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const COL_SKU: &str = "sku";
pub const COL_QUANTITY: &str = "quantity-shipped";
pub const COL_PRICE: &str = "item-price";
pub const COL_CUSTOMER: &str = "New";
pub const COL_DATE: &str = "purchase date";
pub const COL_HOUR: &str = "purchase-hour";
pub const COL_STATE: &str = "ship-state";

pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_SKU,
    COL_QUANTITY,
    COL_PRICE,
    COL_CUSTOMER,
    COL_DATE,
    COL_HOUR,
    COL_STATE,
];

const CUSTOMER_TYPES: [&str; 2] = ["New", "Repeat"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub missing_keys: NullKeyPolicy,
}

/// Reads and validates the orders CSV at `path`.
pub fn load<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<OrderTable> {
    OrderTable::from_path(path, options)
}

/// Positions of the required columns in the header row.
struct ColumnIndex {
    sku: usize,
    quantity: usize,
    price: usize,
    customer: usize,
    date: usize,
    hour: usize,
    state: usize,
}

impl ColumnIndex {
    fn resolve(origin: &str, headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| find(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(DashboardError::data_load(
                origin,
                format!("missing required columns: {}", missing.join(", ")),
            ));
        }

        let at = |name: &str| find(name).unwrap_or_default();
        Ok(Self {
            sku: at(COL_SKU),
            quantity: at(COL_QUANTITY),
            price: at(COL_PRICE),
            customer: at(COL_CUSTOMER),
            date: at(COL_DATE),
            hour: at(COL_HOUR),
            state: at(COL_STATE),
        })
    }
}

impl OrderTable {
    pub fn from_path<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let file = File::open(path).map_err(|e| DashboardError::data_load(&origin, e.to_string()))?;
        Self::from_reader(origin, file, options)
    }

    pub fn from_bytes(
        origin: impl Into<String>,
        bytes: &[u8],
        options: &LoadOptions,
    ) -> Result<Self> {
        Self::from_reader(origin, bytes, options)
    }

    /// Parses a header row plus data rows. Fails on the first bad row.
    pub fn from_reader<R: Read>(
        origin: impl Into<String>,
        reader: R,
        options: &LoadOptions,
    ) -> Result<Self> {
        let origin = origin.into();
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| DashboardError::data_load(&origin, e.to_string()))?
            .clone();
        let columns = ColumnIndex::resolve(&origin, &headers)?;

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| DashboardError::data_load(&origin, e.to_string()))?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            rows.push(parse_row(&record, line, &columns, options)?);
        }

        tracing::debug!("Loaded {} order rows from {}", rows.len(), origin);
        Ok(OrderTable::new(origin, rows))
    }
}

fn parse_row(
    record: &StringRecord,
    line: u64,
    columns: &ColumnIndex,
    options: &LoadOptions,
) -> Result<OrderRecord> {
    let field = |idx: usize| record.get(idx).unwrap_or_default();

    let sku = field(columns.sku).trim();
    if sku.is_empty() {
        return Err(DashboardError::data_validation(line, COL_SKU, sku, "sku is required"));
    }

    let raw_quantity = field(columns.quantity);
    let quantity_shipped = parse_quantity(raw_quantity).map_err(|reason| {
        DashboardError::data_validation(line, COL_QUANTITY, raw_quantity, reason)
    })?;

    let raw_price = field(columns.price);
    let item_price: Amount = raw_price.parse().map_err(|reason: String| {
        DashboardError::data_validation(line, COL_PRICE, raw_price, reason)
    })?;

    let raw_hour = field(columns.hour);
    let purchase_hour: PurchaseHour = raw_hour.parse().map_err(|reason: String| {
        DashboardError::data_validation(line, COL_HOUR, raw_hour, reason)
    })?;

    let customer_type = key_field(field(columns.customer), COL_CUSTOMER, line, options)?;
    if customer_type != MISSING_KEY && !CUSTOMER_TYPES.contains(&customer_type.as_str()) {
        return Err(DashboardError::data_validation(
            line,
            COL_CUSTOMER,
            &customer_type,
            "expected \"New\" or \"Repeat\"",
        ));
    }

    Ok(OrderRecord {
        line,
        sku: sku.to_string(),
        quantity_shipped,
        item_price,
        customer_type,
        purchase_date: key_field(field(columns.date), COL_DATE, line, options)?,
        purchase_hour,
        ship_state: key_field(field(columns.state), COL_STATE, line, options)?,
    })
}

fn parse_quantity(raw: &str) -> std::result::Result<u64, String> {
    let text = raw.trim();
    if text.is_empty() {
        return Err("quantity is required".to_string());
    }
    match text.parse::<u64>() {
        Ok(quantity) => Ok(quantity),
        Err(_) if text.parse::<i64>().is_ok() => Err("quantity cannot be negative".to_string()),
        Err(_) => Err("quantity must be a whole number".to_string()),
    }
}

fn key_field(raw: &str, column: &str, line: u64, options: &LoadOptions) -> Result<String> {
    let value = raw.trim();
    if !value.is_empty() {
        return Ok(value.to_string());
    }
    match options.missing_keys {
        NullKeyPolicy::Reject => Err(DashboardError::data_validation(
            line,
            column,
            value,
            "value is missing",
        )),
        NullKeyPolicy::Bucket => Ok(MISSING_KEY.to_string()),
    }
}
