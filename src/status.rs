use std::convert::Infallible;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

pub const DEFAULT_ROTATE_INTERVAL: Duration = Duration::from_secs(3);

/// Call `on_tick` every `period`, starting one period from now.
///
/// Never completes: the rotation lives exactly as long as the future is
/// polled, so dropping it (e.g. when the request branch of a `select!`
/// wins) stops it.
pub async fn rotate(period: Duration, mut on_tick: impl FnMut()) -> Infallible {
    let period = period.max(Duration::from_millis(1));
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        on_tick();
    }
}
