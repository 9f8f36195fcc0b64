use crate::Result;
use nivis::{SnowflakeGenerator, TimeSource};
use std::{sync::Arc, time::Duration};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Cadence at which a maintained generator receives fresh clock readings.
pub const TICK: Duration = Duration::from_millis(1);

/// Drives a generator's clock until `shutdown` fires.
///
/// Every tick stores the current wall-clock reading into the generator,
/// which also releases any caller waiting out a spent sequence window. The
/// task takes only the generator's timestamp lock, and only briefly, so it
/// never contends with the sequence side of a mint.
pub async fn run<T>(
    generator: Arc<SnowflakeGenerator<T>>,
    shutdown: CancellationToken,
) -> Result<()>
where
    T: TimeSource + Send + Sync + 'static,
{
    let mut ticker = interval(TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    debug!("Clock maintenance started");

    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                debug!("Clock maintenance stopped");
                return Ok(());
            }
            _ = ticker.tick() => generator.observe_clock(),
        }
    }
}
