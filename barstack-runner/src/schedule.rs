//! Daily schedule loop.
//!
//! `watch` runs the full pipeline once per day at a fixed UTC wall-clock
//! time. The next-fire computation is pure so it can be tested without
//! sleeping.

use chrono::{DateTime, NaiveTime, Utc};
use tracing::{error, info};

use crate::config::EtlConfig;
use crate::runner::run_once;

/// Next instant strictly after `now` at which the daily run fires.
///
/// Today at `at` if that is still ahead, otherwise the same time tomorrow.
pub fn next_fire(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(at).and_utc();
    if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    }
}

/// Run the pipeline once per day at `at` (UTC), forever.
///
/// A failed run is logged and the loop waits for the next day; it never
/// tears the process down.
pub fn watch(config: &EtlConfig, at: NaiveTime) -> ! {
    loop {
        let now = Utc::now();
        let fire_at = next_fire(now, at);
        let wait = (fire_at - now).to_std().unwrap_or_default();
        info!(
            "next run at {}, sleeping {}s",
            fire_at.format("%Y-%m-%d %H:%M:%S UTC"),
            wait.as_secs()
        );
        std::thread::sleep(wait);

        match run_once(config) {
            Ok(summary) => info!(
                "scheduled run persisted {} rows to {} sink",
                summary.persisted_rows, summary.sink
            ),
            Err(e) => error!("scheduled run failed: {e}"),
        }
    }
}
