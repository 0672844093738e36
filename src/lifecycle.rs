use crate::errors::StoreError;
use crate::models::ArchiveEntry;
use crate::storage::{DocumentGuard, DocumentKey, Store};
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub date: String,
    pub items: usize,
}

/// UTC calendar day used to stamp archive entries.
pub fn archive_date() -> NaiveDate {
    Utc::now().date_naive()
}

/// Appends today's servings to the history under the current UTC date.
/// Today's servings are left in place.
pub async fn archive(store: &Store) -> Result<ArchiveSummary, StoreError> {
    archive_on(store, archive_date()).await
}

pub async fn archive_on(store: &Store, date: NaiveDate) -> Result<ArchiveSummary, StoreError> {
    let today = store.lock(DocumentKey::Today).await;
    let history = store.lock(DocumentKey::History).await;

    let summary = append_snapshot(&today, &history, date).await?;
    info!(date = %summary.date, items = summary.items, "archived today's servings");
    Ok(summary)
}

/// Clears today's servings. History is untouched.
pub async fn reset(store: &Store) -> Result<(), StoreError> {
    store
        .write(DocumentKey::Today, &Vec::<Value>::new())
        .await?;
    info!("cleared today's servings");
    Ok(())
}

pub async fn archive_and_reset(store: &Store) -> Result<ArchiveSummary, StoreError> {
    archive_and_reset_on(store, archive_date()).await
}

/// Archive followed by reset while holding both documents, so nothing added
/// in between can be cleared without having been archived. Today is only
/// cleared once the history write has returned.
pub async fn archive_and_reset_on(
    store: &Store,
    date: NaiveDate,
) -> Result<ArchiveSummary, StoreError> {
    let today = store.lock(DocumentKey::Today).await;
    let history = store.lock(DocumentKey::History).await;

    let summary = append_snapshot(&today, &history, date).await?;
    drop(history);
    today.write(&Vec::<Value>::new()).await?;

    info!(date = %summary.date, items = summary.items, "archived and cleared today's servings");
    Ok(summary)
}

async fn append_snapshot(
    today: &DocumentGuard<'_>,
    history: &DocumentGuard<'_>,
    date: NaiveDate,
) -> Result<ArchiveSummary, StoreError> {
    // Both documents are handled as plain JSON so earlier entries are
    // appended to, never re-validated or rewritten.
    let servings: Vec<Value> = today.read().await?;
    let mut entries: Vec<Value> = history.read().await?;
    let summary = ArchiveSummary {
        date: date.format("%Y-%m-%d").to_string(),
        items: servings.len(),
    };
    let entry = ArchiveEntry {
        date: summary.date.clone(),
        items: servings,
    };
    entries.push(
        serde_json::to_value(&entry).map_err(|source| StoreError::Encode {
            key: DocumentKey::History,
            source,
        })?,
    );
    history.write(&entries).await?;
    Ok(summary)
}
