//! Producer side of the history.
//!
//! Without radio hardware attached, the receiver synthesizes the telegram a
//! DCF77 module would have decoded for the current local time and appends it
//! once per interval.

use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tracing::debug;

use crate::config::ReceiverConfig;
use crate::dcf77::Dcf77Frame;
use crate::history::{Event, RingLog};

/// UTC offset of central European summer time.
const CEST_OFFSET_SECS: i32 = 2 * 3600;

/// Encodes `time` as a telegram and appends it to `history`.
pub fn record<const N: usize>(history: &RingLog<N>, time: &NaiveDateTime, summer: bool) -> Event {
    let event = Dcf77Frame::encode(time, summer).raw();
    history.append(event);
    event
}

/// Appends one sample of the current local time.
pub fn record_now<const N: usize>(history: &RingLog<N>) -> Event {
    let now = Local::now();
    let summer = now.offset().local_minus_utc() >= CEST_OFFSET_SECS;
    record(history, &now.naive_local(), summer)
}

/// Records a sample every `interval_ms`, forever.
pub async fn run<const N: usize>(history: &'static RingLog<N>, cfg: ReceiverConfig) {
    let mut ticker = tokio::time::interval(Duration::from_millis(cfg.interval_ms.max(1)));

    loop {
        ticker.tick().await;
        let event = record_now(history);
        debug!(
            event = %format!("{:#018x}", event),
            retained = history.length(),
            "time sample recorded"
        );
    }
}
