//! Group-by aggregation over a loaded [`OrderTable`].
//!
//! Every summary table is a pure function of the input rows. Keys come out in
//! ascending order so repeated runs over the same file produce equal tables.

use crate::core::hours::build_hour_label_map;
use crate::core::loader::{
    COL_CUSTOMER, COL_DATE, COL_HOUR, COL_PRICE, COL_QUANTITY, COL_SKU, COL_STATE,
};
use crate::domain::model::{Amount, OrderRecord, OrderTable, Record};
use crate::utils::error::{DashboardError, Result};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::collections::BTreeMap;

pub const UNITS_BY_SKU: &str = "units_by_sku";
pub const NEW_V_REPEAT: &str = "new_v_repeat";
pub const OVER_TIME: &str = "over_time";
pub const STATE: &str = "state";
pub const ORDERS_BY_TIME: &str = "orders_by_time";

pub const COL_COUNT: &str = "count";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Sku,
    CustomerType,
    PurchaseDate,
    ShipState,
    PurchaseHour,
}

impl GroupKey {
    /// Name of the input column this key groups on.
    pub fn column(self) -> &'static str {
        match self {
            Self::Sku => COL_SKU,
            Self::CustomerType => COL_CUSTOMER,
            Self::PurchaseDate => COL_DATE,
            Self::ShipState => COL_STATE,
            Self::PurchaseHour => COL_HOUR,
        }
    }

    fn key_of(self, row: &OrderRecord) -> Cow<'_, str> {
        match self {
            Self::Sku => Cow::Borrowed(&row.sku),
            Self::CustomerType => Cow::Borrowed(&row.customer_type),
            Self::PurchaseDate => Cow::Borrowed(&row.purchase_date),
            Self::ShipState => Cow::Borrowed(&row.ship_state),
            Self::PurchaseHour => Cow::Owned(row.purchase_hour.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Sum `quantity-shipped` and `item-price`.
    Sum,
    /// Count rows.
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Totals {
        quantity_shipped: u64,
        item_price: Amount,
    },
    Count(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub key: String,
    pub measure: Measure,
}

impl SummaryRow {
    pub fn quantity_shipped(&self) -> Option<u64> {
        match self.measure {
            Measure::Totals { quantity_shipped, .. } => Some(quantity_shipped),
            Measure::Count(_) => None,
        }
    }

    pub fn item_price(&self) -> Option<Amount> {
        match self.measure {
            Measure::Totals { item_price, .. } => Some(item_price),
            Measure::Count(_) => None,
        }
    }

    pub fn count(&self) -> Option<u64> {
        match self.measure {
            Measure::Count(n) => Some(n),
            Measure::Totals { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryTable {
    pub name: String,
    pub group_key: GroupKey,
    pub metric: Metric,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|row| row.key == key)
    }

    /// Output column names, key column first.
    pub fn columns(&self) -> Vec<&'static str> {
        match self.metric {
            Metric::Sum => vec![self.group_key.column(), COL_QUANTITY, COL_PRICE],
            Metric::Count => vec![self.group_key.column(), COL_COUNT],
        }
    }

    /// Rows as column name -> value maps.
    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                let mut data = BTreeMap::new();
                data.insert(
                    self.group_key.column().to_string(),
                    serde_json::Value::String(row.key.clone()),
                );
                match row.measure {
                    Measure::Totals {
                        quantity_shipped,
                        item_price,
                    } => {
                        data.insert(COL_QUANTITY.to_string(), serde_json::json!(quantity_shipped));
                        data.insert(COL_PRICE.to_string(), serde_json::json!(item_price.as_f64()));
                    }
                    Measure::Count(n) => {
                        data.insert(COL_COUNT.to_string(), serde_json::json!(n));
                    }
                }
                Record { data }
            })
            .collect()
    }

    /// Field values in [`columns`](Self::columns) order, exact decimal text for prices.
    pub fn string_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| match row.measure {
                Measure::Totals {
                    quantity_shipped,
                    item_price,
                } => vec![row.key.clone(), quantity_shipped.to_string(), item_price.to_string()],
                Measure::Count(n) => vec![row.key.clone(), n.to_string()],
            })
            .collect()
    }
}

impl Serialize for SummaryTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SummaryTable", 4)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("key_column", self.group_key.column())?;
        state.serialize_field("metric", &self.metric)?;
        state.serialize_field("rows", &self.records())?;
        state.end()
    }
}

/// The full set of derived tables handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryTables {
    pub units_by_sku: SummaryTable,
    pub new_v_repeat: SummaryTable,
    pub over_time: SummaryTable,
    pub state: SummaryTable,
    pub orders_by_time: SummaryTable,
    pub hour_to_clock: BTreeMap<String, String>,
}

impl SummaryTables {
    pub fn tables(&self) -> [&SummaryTable; 5] {
        [
            &self.units_by_sku,
            &self.new_v_repeat,
            &self.over_time,
            &self.state,
            &self.orders_by_time,
        ]
    }

    pub fn table(&self, name: &str) -> Option<&SummaryTable> {
        self.tables().into_iter().find(|t| t.name == name)
    }

    /// Number of input orders, recovered from the per-state counts.
    pub fn order_count(&self) -> u64 {
        self.state.rows.iter().filter_map(SummaryRow::count).sum()
    }
}

enum Accumulator {
    Totals(u64, Amount),
    Count(u64),
}

pub fn aggregate_by(
    table: &OrderTable,
    group_key: GroupKey,
    metric: Metric,
) -> Result<SummaryTable> {
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();

    for row in &table.rows {
        let acc = groups
            .entry(group_key.key_of(row).into_owned())
            .or_insert_with(|| match metric {
                Metric::Sum => Accumulator::Totals(0, Amount::ZERO),
                Metric::Count => Accumulator::Count(0),
            });

        match acc {
            Accumulator::Totals(quantity, price) => {
                *quantity = quantity.checked_add(row.quantity_shipped).ok_or_else(|| {
                    DashboardError::data_validation(
                        row.line,
                        COL_QUANTITY,
                        &row.quantity_shipped.to_string(),
                        "total quantity overflows",
                    )
                })?;
                *price = price.checked_add(row.item_price).ok_or_else(|| {
                    DashboardError::data_validation(
                        row.line,
                        COL_PRICE,
                        &row.item_price.to_string(),
                        "total price overflows",
                    )
                })?;
            }
            Accumulator::Count(n) => *n += 1,
        }
    }

    let rows = groups
        .into_iter()
        .map(|(key, acc)| SummaryRow {
            key,
            measure: match acc {
                Accumulator::Totals(quantity_shipped, item_price) => Measure::Totals {
                    quantity_shipped,
                    item_price,
                },
                Accumulator::Count(n) => Measure::Count(n),
            },
        })
        .collect();

    Ok(SummaryTable {
        name: group_key.column().to_string(),
        group_key,
        metric,
        rows,
    })
}

pub fn aggregate(table: &OrderTable) -> Result<SummaryTables> {
    let summary = SummaryTables {
        units_by_sku: aggregate_by(table, GroupKey::Sku, Metric::Sum)?.with_name(UNITS_BY_SKU),
        new_v_repeat: aggregate_by(table, GroupKey::CustomerType, Metric::Sum)?
            .with_name(NEW_V_REPEAT),
        over_time: aggregate_by(table, GroupKey::PurchaseDate, Metric::Sum)?.with_name(OVER_TIME),
        state: aggregate_by(table, GroupKey::ShipState, Metric::Count)?.with_name(STATE),
        orders_by_time: aggregate_by(table, GroupKey::PurchaseHour, Metric::Sum)?
            .with_name(ORDERS_BY_TIME),
        hour_to_clock: build_hour_label_map(),
    };

    tracing::debug!(
        "Aggregated {} rows: {} skus, {} dates, {} states, {} hours",
        table.len(),
        summary.units_by_sku.len(),
        summary.over_time.len(),
        summary.state.len(),
        summary.orders_by_time.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loader::LoadOptions;

    const HEADER: &str =
        "sku,quantity-shipped,item-price,New,purchase date,purchase-hour,ship-state";

    fn table(body: &str) -> OrderTable {
        let csv = format!("{}\n{}", HEADER, body);
        OrderTable::from_bytes("test.csv", csv.as_bytes(), &LoadOptions::default()).unwrap()
    }

    #[test]
    fn test_two_row_scenario() {
        let orders = table(
            "A,3,10.00,New,2023-01-01,09,CA\n\
             A,2,8.00,Repeat,2023-01-01,09,CA\n",
        );
        let summary = aggregate(&orders).unwrap();

        assert_eq!(summary.units_by_sku.len(), 1);
        let sku = summary.units_by_sku.get("A").unwrap();
        assert_eq!(sku.quantity_shipped(), Some(5));
        assert_eq!(sku.item_price(), Some(Amount::from_cents(1800)));

        let hour = summary.orders_by_time.get("09").unwrap();
        assert_eq!(hour.quantity_shipped(), Some(5));
        assert_eq!(summary.hour_to_clock["09"], "9 AM");

        assert_eq!(summary.new_v_repeat.get("New").unwrap().quantity_shipped(), Some(3));
        assert_eq!(summary.new_v_repeat.get("Repeat").unwrap().quantity_shipped(), Some(2));
        assert_eq!(summary.state.get("CA").unwrap().count(), Some(2));
        assert_eq!(
            summary.over_time.get("2023-01-01").unwrap().item_price(),
            Some(Amount::from_cents(1800))
        );
    }

    #[test]
    fn test_totals_are_conserved() {
        let orders = table(
            "A,3,1.10,New,2023-01-01,09,CA\n\
             B,4,2.20,New,2023-01-02,10,NY\n\
             A,5,3.30,Repeat,2023-01-03,09,TX\n\
             C,0,0.00,Repeat,2023-01-03,23,CA\n",
        );
        let summary = aggregate(&orders).unwrap();

        let by_sku: u64 = summary
            .units_by_sku
            .rows
            .iter()
            .filter_map(SummaryRow::quantity_shipped)
            .sum();
        assert_eq!(by_sku, orders.total_quantity());
        assert_eq!(summary.order_count(), orders.len() as u64);

        let revenue = summary
            .over_time
            .rows
            .iter()
            .filter_map(SummaryRow::item_price)
            .try_fold(Amount::ZERO, Amount::checked_add)
            .unwrap();
        assert_eq!(revenue, Amount::from_cents(660));
    }

    #[test]
    fn test_sub_cent_prices_sum_exactly() {
        let orders = table(
            "A,1,14.995,New,2023-01-01,09,CA\n\
             A,1,0.005,Repeat,2023-01-01,10,CA\n",
        );
        let summary = aggregate(&orders).unwrap();

        let sku = summary.units_by_sku.get("A").unwrap();
        assert_eq!(sku.item_price().unwrap().to_string(), "15.000");
        assert_eq!(
            summary.units_by_sku.string_rows(),
            vec![vec!["A".to_string(), "2".to_string(), "15.000".to_string()]]
        );
    }

    #[test]
    fn test_keys_are_sorted() {
        let orders = table(
            "Z,1,1.00,New,2023-03-01,23,WA\n\
             A,1,1.00,New,2023-01-01,00,AK\n\
             M,1,1.00,New,2023-02-01,12,CA\n",
        );
        let summary = aggregate(&orders).unwrap();

        let skus: Vec<&str> = summary.units_by_sku.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(skus, vec!["A", "M", "Z"]);
        let hours: Vec<&str> = summary.orders_by_time.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(hours, vec!["00", "12", "23"]);
    }

    #[test]
    fn test_empty_input_gives_empty_tables() {
        let summary = aggregate(&table("")).unwrap();
        for t in summary.tables() {
            assert!(t.is_empty(), "{} should be empty", t.name);
        }
        assert_eq!(summary.hour_to_clock.len(), 24);
        assert_eq!(summary.order_count(), 0);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let orders = table("A,3,10.00,New,2023-01-01,09,CA\nB,2,8.00,Repeat,2023-01-02,17,OR\n");
        assert_eq!(aggregate(&orders).unwrap(), aggregate(&orders).unwrap());
    }

    #[test]
    fn test_count_metric_on_any_key() {
        let orders = table("A,3,10.00,New,2023-01-01,09,CA\nA,2,8.00,Repeat,2023-01-02,17,OR\n");
        let counted = aggregate_by(&orders, GroupKey::Sku, Metric::Count).unwrap();
        assert_eq!(counted.get("A").unwrap().count(), Some(2));
        assert_eq!(counted.columns(), vec!["sku", "count"]);
    }

    #[test]
    fn test_records_use_source_column_names() {
        let orders = table("A,3,10.00,New,2023-01-01,09,CA\n");
        let summary = aggregate(&orders).unwrap();

        let sku_rows = summary.units_by_sku.records();
        assert_eq!(sku_rows[0].data["sku"], "A");
        assert_eq!(sku_rows[0].data["quantity-shipped"], 3);
        assert_eq!(sku_rows[0].data["item-price"], 10.0);

        let state_rows = summary.state.records();
        assert_eq!(state_rows[0].data["ship-state"], "CA");
        assert_eq!(state_rows[0].data["count"], 1);

        assert_eq!(
            summary.units_by_sku.string_rows(),
            vec![vec!["A".to_string(), "3".to_string(), "10.00".to_string()]]
        );
    }

    #[test]
    fn test_quantity_overflow_is_reported() {
        let orders = table(&format!(
            "A,{},1.00,New,2023-01-01,09,CA\nA,1,1.00,New,2023-01-01,09,CA\n",
            u64::MAX
        ));
        let err = aggregate_by(&orders, GroupKey::Sku, Metric::Sum).unwrap_err();
        assert!(matches!(err, DashboardError::DataValidation { line: 3, .. }));
    }

    #[test]
    fn test_table_lookup_by_name() {
        let summary = aggregate(&table("A,3,10.00,New,2023-01-01,09,CA\n")).unwrap();
        assert_eq!(summary.table(STATE).unwrap().group_key, GroupKey::ShipState);
        assert!(summary.table("missing").is_none());
    }
}
