use crate::errors::StoreError;
use crate::models::{Event, Serving};
use crate::storage::{DocumentKey, Store};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// Upcoming events shown on the dashboard.
pub const UPCOMING_LIMIT: usize = 4;

// Stored records are kept as raw JSON: only new records are checked, and
// whatever is already in a document is passed through untouched.

pub async fn list_servings(store: &Store) -> Result<Vec<Value>, StoreError> {
    store.read(DocumentKey::Today).await
}

pub async fn add_serving(store: &Store, serving: Serving) -> Result<(), StoreError> {
    let record = to_record(DocumentKey::Today, &serving)?;
    store
        .update(DocumentKey::Today, |today: &mut Vec<Value>| today.push(record))
        .await?;
    info!(name = %serving.name, "serving added");
    Ok(())
}

/// Removes every serving named `name`. Returns how many were removed.
pub async fn remove_servings(store: &Store, name: &str) -> Result<usize, StoreError> {
    let removed = remove_matching(store, DocumentKey::Today, "name", name).await?;
    info!(%name, removed, "servings removed");
    Ok(removed)
}

pub async fn list_events(store: &Store) -> Result<Vec<Value>, StoreError> {
    store.read(DocumentKey::Events).await
}

pub async fn add_event(store: &Store, event: Event) -> Result<(), StoreError> {
    let record = to_record(DocumentKey::Events, &event)?;
    store
        .update(DocumentKey::Events, |events: &mut Vec<Value>| events.push(record))
        .await?;
    info!(id = %event.id, "event added");
    Ok(())
}

pub async fn remove_events(store: &Store, id: &str) -> Result<usize, StoreError> {
    let removed = remove_matching(store, DocumentKey::Events, "id", id).await?;
    info!(%id, removed, "events removed");
    Ok(removed)
}

/// Calendar day the dashboard counts as today; the nightly job runs on the
/// same local clock.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Events on or after `today`, soonest first. Events without a parseable
/// `date` are left out.
pub fn upcoming_events(events: Vec<Value>, today: NaiveDate, limit: usize) -> Vec<Value> {
    let mut dated: Vec<(NaiveDate, Value)> = events
        .into_iter()
        .filter_map(|event| {
            let day = event.get("date").and_then(Value::as_str).and_then(parse_day)?;
            Some((day, event))
        })
        .filter(|(day, _)| *day >= today)
        .collect();
    dated.sort_by_key(|(day, _)| *day);
    dated.into_iter().take(limit).map(|(_, event)| event).collect()
}

/// Parses the calendar day at the start of an ISO date or date-time string.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn to_record<T: Serialize>(key: DocumentKey, record: &T) -> Result<Value, StoreError> {
    serde_json::to_value(record).map_err(|source| StoreError::Encode { key, source })
}

async fn remove_matching(
    store: &Store,
    key: DocumentKey,
    field: &str,
    value: &str,
) -> Result<usize, StoreError> {
    store
        .update(key, |records: &mut Vec<Value>| {
            let before = records.len();
            records.retain(|record| record.get(field).and_then(Value::as_str) != Some(value));
            before - records.len()
        })
        .await
}
