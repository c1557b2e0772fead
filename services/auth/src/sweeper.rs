use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{error, info};

use crate::infra::db::DbVerificationCodeRepository;
use crate::usecase::sweep::SweepExpiredCodesUseCase;

/// Time from `now` until the next multiple of `period` since the Unix epoch.
///
/// With the default hourly period this lands on the top of the hour. A `now` sitting
/// exactly on a boundary waits a full period.
pub fn first_tick_delay(now: DateTime<Utc>, period: Duration) -> Duration {
    let period_ms = period.as_millis().max(1);
    let now_ms = u128::try_from(now.timestamp_millis()).unwrap_or(0);
    let remainder = now_ms % period_ms;
    let wait_ms = period_ms - remainder;
    Duration::from_millis(u64::try_from(wait_ms).unwrap_or(u64::MAX))
}

/// Run the expired-code sweep on a fixed, epoch-aligned schedule until the runtime shuts down.
pub fn spawn_code_sweeper(codes: DbVerificationCodeRepository, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let delay = first_tick_delay(Utc::now(), period);
        info!(
            period_secs = period.as_secs(),
            first_in_secs = delay.as_secs(),
            "code sweeper scheduled"
        );

        let mut ticker = interval_at(Instant::now() + delay, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let usecase = SweepExpiredCodesUseCase { codes };
        loop {
            ticker.tick().await;
            if let Err(e) = usecase.execute(Utc::now()).await {
                error!(error = ?e, "expired code sweep failed");
            }
        }
    })
}
