//! Calendar arithmetic for the daily reminder sweep.

use chrono::{DateTime, Days, TimeZone};

use crate::types::Timestamp;

/// `emailSentLog` entry type written by the reminder sweep.
pub const REMINDER_LOG_TYPE: &str = "reminder";

/// Default local hour at which the sweep fires.
pub const DEFAULT_REMINDER_HOUR: u32 = 8;

/// Whether a reminder was already sent on the same calendar day as `now`.
///
/// Only the date part matters, evaluated in `tz`, so a reminder sent at 23:59
/// does not block one at 00:01 the next day.
pub fn reminded_today<Tz: TimeZone>(last_sent: Option<Timestamp>, now: Timestamp, tz: &Tz) -> bool {
    match last_sent {
        Some(last) => {
            last.with_timezone(tz).date_naive() == now.with_timezone(tz).date_naive()
        }
        None => false,
    }
}

/// Next instant strictly after `now` at `hour:00` local time.
///
/// Hours above 23 are clamped. Local times skipped by a DST gap roll over to
/// the following day.
pub fn next_run_after<Tz: TimeZone>(now: &DateTime<Tz>, hour: u32) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();

    for offset in 0..=2 {
        let candidate = (today + Days::new(offset))
            .and_hms_opt(hour.min(23), 0, 0)
            .and_then(|naive| tz.from_local_datetime(&naive).earliest());

        if let Some(at) = candidate {
            if at > *now {
                return at;
            }
        }
    }

    now.clone() + chrono::Duration::days(1)
}
