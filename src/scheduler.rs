use crate::errors::StoreError;
use crate::lifecycle::{self, ArchiveSummary};
use crate::state::AppState;
use crate::trainer::recalibrate;
use chrono::{DateTime, Local, TimeZone};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Runs the nightly job at every local midnight for as long as the process
/// lives. Midnights missed while the process was down are not made up.
pub fn spawn_nightly(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = until_next_midnight(Local::now());
            info!(wait_secs = wait.as_secs(), "nightly job scheduled");
            tokio::time::sleep(wait).await;

            if let Err(err) = run_nightly(&state).await {
                error!("nightly archive failed: {err}");
            }
        }
    })
}

/// Archive, reset, then recalibrate in the background. Only archive and
/// reset decide the outcome; trainer failures are logged.
pub async fn run_nightly(state: &AppState) -> Result<ArchiveSummary, StoreError> {
    let summary = lifecycle::archive_and_reset(&state.store).await?;
    info!(date = %summary.date, items = summary.items, "nightly job finished");

    let trainer = Arc::clone(&state.trainer);
    tokio::spawn(async move {
        if let Err(err) = recalibrate(trainer.as_ref()).await {
            error!("nightly recalibration failed: {err}");
        }
    });
    Ok(summary)
}

pub fn until_next_midnight<Tz: TimeZone>(now: DateTime<Tz>) -> Duration {
    let tz = now.timezone();
    let next = now
        .date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|midnight| tz.from_local_datetime(&midnight).earliest());

    match next {
        Some(next) => (next - now).to_std().unwrap_or(Duration::ZERO),
        // Midnight skipped by a clock change; try again in an hour.
        None => Duration::from_secs(60 * 60),
    }
}
