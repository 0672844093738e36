use crate::models::{ActualPoint, ChartPoint, Period, PredictedEntry, PredictedPoint};
use crate::records::parse_day;
use chrono::NaiveDate;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Last `period.window()` archive entries, oldest first, one point per entry.
///
/// Entries sharing a date stay separate points. Missing or non-numeric
/// fields count as zero.
pub fn actual_series(mut history: Vec<Value>, period: Period) -> Vec<ActualPoint> {
    history.sort_by(|a, b| compare_dates(entry_date(a), entry_date(b)));
    last_n(history, period.window())
        .iter()
        .map(|entry| summarize(entry_date(entry).to_string(), entry_items(entry)))
        .collect()
}

pub fn predicted_series(mut entries: Vec<PredictedEntry>, period: Period) -> Vec<PredictedPoint> {
    entries.sort_by(|a, b| compare_dates(&a.date, &b.date));
    last_n(entries, period.window())
        .into_iter()
        .map(|entry| PredictedPoint {
            date: entry.date,
            predicted: entry.predicted,
            predicted_earning: entry.predicted_earning,
        })
        .collect()
}

/// Point for the day still being recorded, computed from the live servings.
pub fn live_point(today: NaiveDate, servings: &[Value]) -> ActualPoint {
    summarize(today.format("%Y-%m-%d").to_string(), servings)
}

/// Joins actual and predicted points on their date. A missing side counts as
/// zero; the live point replaces whatever actual value its date already had.
pub fn assemble_chart(
    actual: Vec<ActualPoint>,
    predicted: Vec<PredictedPoint>,
    live: Option<ActualPoint>,
) -> Vec<ChartPoint> {
    let mut rows: BTreeMap<String, ChartPoint> = BTreeMap::new();
    let blank = |date: &str| ChartPoint {
        date: date.to_string(),
        actual: 0,
        actual_earning: 0.0,
        predicted: 0.0,
        predicted_earning: 0.0,
    };

    for point in actual.into_iter().chain(live) {
        let row = rows
            .entry(point.date.clone())
            .or_insert_with(|| blank(&point.date));
        row.actual = point.actual;
        row.actual_earning = point.actual_earning;
    }
    for point in predicted {
        let row = rows
            .entry(point.date.clone())
            .or_insert_with(|| blank(&point.date));
        row.predicted = point.predicted;
        row.predicted_earning = point.predicted_earning;
    }

    let mut chart: Vec<ChartPoint> = rows.into_values().collect();
    chart.sort_by(|a, b| compare_dates(&a.date, &b.date));
    chart
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn summarize(date: String, items: &[Value]) -> ActualPoint {
    ActualPoint {
        date,
        actual: items.iter().map(plates).sum(),
        actual_earning: round2(items.iter().map(|item| number(item, "totalEarning")).sum()),
    }
}

fn entry_date(entry: &Value) -> &str {
    entry.get("date").and_then(Value::as_str).unwrap_or("")
}

fn entry_items(entry: &Value) -> &[Value] {
    entry
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn number(item: &Value, field: &str) -> f64 {
    item.get(field)
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

fn plates(item: &Value) -> u64 {
    let count = number(item, "totalPlates");
    if count > 0.0 { count.round() as u64 } else { 0 }
}

fn last_n<T>(mut items: Vec<T>, n: usize) -> Vec<T> {
    let skip = items.len().saturating_sub(n);
    items.drain(..skip);
    items
}

/// Calendar order when both dates parse, string order otherwise.
fn compare_dates(a: &str, b: &str) -> Ordering {
    match (parse_day(a), parse_day(b)) {
        (Some(left), Some(right)) => left.cmp(&right).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}
