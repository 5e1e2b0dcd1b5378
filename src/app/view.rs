//! Chart view model for the sales dashboard.
//!
//! [`render`] turns [`SummaryTables`] into plain chart descriptions. It never
//! reaches back into the aggregation; whatever draws the page only needs this.

use crate::core::aggregate::{SummaryRow, SummaryTable, SummaryTables};
use serde::Serialize;

pub const DASHBOARD_TITLE: &str = "Simple Product Sales Dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Bar,
    Line,
    Choropleth,
    PolarScatter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_bar_title: Option<String>,
    /// Named continuous color scale, e.g. "Blues".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_scale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_axis: Option<TimeAxis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<MarkerEncoding>,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeStep {
    Month,
    Year,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepMode {
    /// From the start of the current step, e.g. year to date.
    Todate,
    Backward,
}

/// Quick zoom button above a date axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeButton {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    pub step: RangeStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_mode: Option<StepMode>,
}

impl RangeButton {
    fn new(label: &str, count: u32, step: RangeStep, step_mode: StepMode) -> Self {
        Self {
            label: label.to_string(),
            count: Some(count),
            step,
            step_mode: Some(step_mode),
        }
    }

    fn all() -> Self {
        Self {
            label: "all".to_string(),
            count: None,
            step: RangeStep::All,
            step_mode: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeAxis {
    pub range_slider: bool,
    pub range_buttons: Vec<RangeButton>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeoSettings {
    /// How point labels resolve to map regions; "USA-states" means two-letter codes.
    pub location_mode: String,
    pub scope: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerEncoding {
    pub size_by_value: bool,
    pub color_by_value: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub charts: Vec<ChartView>,
}

impl DashboardView {
    pub fn chart(&self, id: &str) -> Option<&ChartView> {
        self.charts.iter().find(|c| c.id == id)
    }
}

fn points<L, V>(table: &SummaryTable, label: L, value: V) -> Vec<ChartPoint>
where
    L: Fn(&SummaryRow) -> String,
    V: Fn(&SummaryRow) -> f64,
{
    table
        .rows
        .iter()
        .map(|row| ChartPoint {
            label: label(row),
            value: value(row),
        })
        .collect()
}

fn quantity(row: &SummaryRow) -> f64 {
    row.quantity_shipped().unwrap_or_default() as f64
}

fn key(row: &SummaryRow) -> String {
    row.key.clone()
}

struct ChartSpec {
    id: &'static str,
    title: &'static str,
    kind: ChartKind,
    x_label: &'static str,
    y_label: &'static str,
}

impl ChartSpec {
    fn build(self, points: Vec<ChartPoint>) -> ChartView {
        ChartView {
            id: self.id.to_string(),
            title: self.title.to_string(),
            kind: self.kind,
            x_label: self.x_label.to_string(),
            y_label: self.y_label.to_string(),
            color_bar_title: None,
            color_scale: None,
            time_axis: None,
            geo: None,
            marker: None,
            points,
        }
    }
}

fn date_range_axis() -> TimeAxis {
    TimeAxis {
        range_slider: true,
        range_buttons: vec![
            RangeButton::new("YTD", 1, RangeStep::Year, StepMode::Todate),
            RangeButton::new("1m", 1, RangeStep::Month, StepMode::Backward),
            RangeButton::new("3m", 3, RangeStep::Month, StepMode::Backward),
            RangeButton::new("6m", 6, RangeStep::Month, StepMode::Backward),
            RangeButton::new("1y", 1, RangeStep::Year, StepMode::Backward),
            RangeButton::all(),
        ],
    }
}

pub fn render(summary: &SummaryTables) -> DashboardView {
    let mut revenue = ChartSpec {
        id: "revenue-over-time",
        title: "Revenue Over Time",
        kind: ChartKind::Line,
        x_label: "purchase date",
        y_label: "item-price",
    }
    .build(points(&summary.over_time, key, |row| {
        row.item_price().map(|p| p.as_f64()).unwrap_or_default()
    }));
    revenue.time_axis = Some(date_range_axis());

    let units = ChartSpec {
        id: "units-by-sku",
        title: "Total Units Sold by SKU",
        kind: ChartKind::Bar,
        x_label: "sku",
        y_label: "quantity-shipped",
    }
    .build(points(&summary.units_by_sku, key, quantity));

    let new_repeat = ChartSpec {
        id: "new-v-repeat",
        title: "New vs. Repeat Customer Units Sold",
        kind: ChartKind::Bar,
        x_label: "New",
        y_label: "quantity-shipped",
    }
    .build(points(&summary.new_v_repeat, key, quantity));

    let mut by_state = ChartSpec {
        id: "units-by-state",
        title: "Total Units Sold by State",
        kind: ChartKind::Choropleth,
        x_label: "ship-state",
        y_label: "count",
    }
    .build(points(&summary.state, key, |row| {
        row.count().unwrap_or_default() as f64
    }));
    by_state.color_bar_title = Some("Quantity Shipped".to_string());
    by_state.color_scale = Some("Blues".to_string());
    by_state.geo = Some(GeoSettings {
        location_mode: "USA-states".to_string(),
        scope: "usa".to_string(),
    });

    // label by key: hours with no orders are absent from the table
    let mut by_hour = ChartSpec {
        id: "quantity-shipped-time",
        title: "Quantity Shipped by Time of Day",
        kind: ChartKind::PolarScatter,
        x_label: "purchase-hour",
        y_label: "quantity-shipped",
    }
    .build(points(
        &summary.orders_by_time,
        |row| {
            summary
                .hour_to_clock
                .get(&row.key)
                .cloned()
                .unwrap_or_else(|| row.key.clone())
        },
        quantity,
    ));
    by_hour.color_scale = Some("dense".to_string());
    by_hour.marker = Some(MarkerEncoding {
        size_by_value: true,
        color_by_value: true,
    });

    DashboardView {
        title: DASHBOARD_TITLE.to_string(),
        charts: vec![revenue, units, new_repeat, by_state, by_hour],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate::aggregate;
    use crate::core::loader::LoadOptions;
    use crate::domain::model::OrderTable;

    fn summary() -> SummaryTables {
        let csv = "sku,quantity-shipped,item-price,New,purchase date,purchase-hour,ship-state\n\
                   A,3,10.00,New,2023-01-01,09,CA\n\
                   A,2,8.00,Repeat,2023-01-01,09,CA\n\
                   B,1,2.50,New,2023-01-02,21,NY\n";
        let table =
            OrderTable::from_bytes("view.csv", csv.as_bytes(), &LoadOptions::default()).unwrap();
        aggregate(&table).unwrap()
    }

    #[test]
    fn test_render_builds_all_charts() {
        let view = render(&summary());
        assert_eq!(view.title, DASHBOARD_TITLE);
        let ids: Vec<&str> = view.charts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "revenue-over-time",
                "units-by-sku",
                "new-v-repeat",
                "units-by-state",
                "quantity-shipped-time"
            ]
        );
    }

    #[test]
    fn test_hourly_chart_uses_clock_labels() {
        let view = render(&summary());
        let chart = view.chart("quantity-shipped-time").unwrap();
        assert_eq!(
            chart.points,
            vec![
                ChartPoint {
                    label: "9 AM".to_string(),
                    value: 5.0
                },
                ChartPoint {
                    label: "9 PM".to_string(),
                    value: 1.0
                },
            ]
        );
    }

    #[test]
    fn test_revenue_and_state_values() {
        let view = render(&summary());

        let revenue = view.chart("revenue-over-time").unwrap();
        assert_eq!(revenue.kind, ChartKind::Line);
        assert_eq!(revenue.points[0].label, "2023-01-01");
        assert_eq!(revenue.points[0].value, 18.0);

        let states = view.chart("units-by-state").unwrap();
        assert_eq!(states.color_bar_title.as_deref(), Some("Quantity Shipped"));
        assert_eq!(states.points[0].label, "CA");
        assert_eq!(states.points[0].value, 2.0);
    }

    #[test]
    fn test_view_serializes_kind_in_kebab_case() {
        let json = serde_json::to_value(render(&summary())).unwrap();
        assert_eq!(json["charts"][4]["kind"], "polar-scatter");
        assert!(json["charts"][0].get("color_bar_title").is_none());
        assert!(json["charts"][1].get("time_axis").is_none());
        assert!(json["charts"][1].get("geo").is_none());
        assert!(json["charts"][1].get("marker").is_none());
    }

    #[test]
    fn test_revenue_chart_has_range_controls() {
        let view = render(&summary());
        let axis = view
            .chart("revenue-over-time")
            .and_then(|c| c.time_axis.as_ref())
            .unwrap();
        assert!(axis.range_slider);
        let labels: Vec<&str> = axis.range_buttons.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["YTD", "1m", "3m", "6m", "1y", "all"]);
        assert_eq!(axis.range_buttons[2].count, Some(3));
        assert_eq!(axis.range_buttons[5].count, None);

        let json = serde_json::to_value(&view).unwrap();
        let ytd = &json["charts"][0]["time_axis"]["range_buttons"][0];
        assert_eq!(ytd["step"], "year");
        assert_eq!(ytd["step_mode"], "todate");
        let all = &json["charts"][0]["time_axis"]["range_buttons"][5];
        assert_eq!(all["step"], "all");
        assert!(all.get("count").is_none());
    }

    #[test]
    fn test_state_map_is_scoped_to_usa() {
        let view = render(&summary());
        let states = view.chart("units-by-state").unwrap();
        assert_eq!(states.color_scale.as_deref(), Some("Blues"));
        assert_eq!(
            states.geo,
            Some(GeoSettings {
                location_mode: "USA-states".to_string(),
                scope: "usa".to_string(),
            })
        );
    }

    #[test]
    fn test_hourly_points_sized_and_colored_by_quantity() {
        let view = render(&summary());
        let chart = view.chart("quantity-shipped-time").unwrap();
        assert_eq!(chart.color_scale.as_deref(), Some("dense"));
        assert_eq!(
            chart.marker,
            Some(MarkerEncoding {
                size_by_value: true,
                color_by_value: true,
            })
        );
    }
}
