use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Key used for empty group values when missing keys are bucketed.
pub const MISSING_KEY: &str = "(missing)";

/// One output row of a summary table, keyed by column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: BTreeMap<String, serde_json::Value>,
}

/// Exact currency amount. Keeps whatever scale the export used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn as_f64(self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl FromStr for Amount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if !text.bytes().any(|b| b.is_ascii_digit()) {
            return Err("not a decimal number".to_string());
        }

        let parsed = if text.contains(['e', 'E']) {
            Decimal::from_scientific(text)
        } else {
            Decimal::from_str_exact(text)
        };
        parsed
            .map(Amount)
            .map_err(|e| format!("not a decimal number: {}", e))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut value = self.0;
        if value.scale() < 2 {
            value.rescale(2);
        }
        write!(f, "{}", value)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Hour of day as exported: two digits, "00" through "23".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PurchaseHour(u8);

impl PurchaseHour {
    pub fn new(hour: u8) -> Option<Self> {
        (hour < 24).then_some(Self(hour))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl FromStr for PurchaseHour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.len() != 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err("hour must be two digits between \"00\" and \"23\"".to_string());
        }
        let hour: u8 = text
            .parse()
            .map_err(|_| "hour must be two digits".to_string())?;
        Self::new(hour).ok_or_else(|| "hour must be between \"00\" and \"23\"".to_string())
    }
}

impl fmt::Display for PurchaseHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// What to do with empty values in the customer, date and state columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullKeyPolicy {
    #[default]
    Reject,
    Bucket,
}

impl FromStr for NullKeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "bucket" => Ok(Self::Bucket),
            other => Err(format!(
                "unknown missing key policy '{}', expected 'reject' or 'bucket'",
                other
            )),
        }
    }
}

impl fmt::Display for NullKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => f.write_str("reject"),
            Self::Bucket => f.write_str("bucket"),
        }
    }
}

/// A single purchased line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    /// Line in the source file, for error reporting.
    pub line: u64,
    pub sku: String,
    pub quantity_shipped: u64,
    pub item_price: Amount,
    /// The `New` column: "New" or "Repeat".
    pub customer_type: String,
    pub purchase_date: String,
    pub purchase_hour: PurchaseHour,
    pub ship_state: String,
}

/// Validated in-memory copy of an orders export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTable {
    pub origin: String,
    pub rows: Vec<OrderRecord>,
}

impl OrderTable {
    pub fn new(origin: impl Into<String>, rows: Vec<OrderRecord>) -> Self {
        Self {
            origin: origin.into(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_quantity(&self) -> u64 {
        self.rows.iter().map(|r| r.quantity_shipped).sum()
    }
}
