use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};

use crate::app::ActivityLogger;

/// Writes one row per `period` until `shutdown` resolves. Shutdown is only
/// observed while waiting for the next tick, never during a flush. Returns the
/// number of rows written; the first failed flush ends the loop.
pub async fn run_flush_loop<F>(
    logger: Arc<ActivityLogger>,
    period: Duration,
    shutdown: F,
) -> Result<u64>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut written = 0;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                logger.flush()?;
                written += 1;
            }
        }
    }

    Ok(written)
}
