use crate::models::common::TimestampNs;
use crate::models::init::SpendingPeriod;
use chrono::{DateTime, Datelike, NaiveDate, Utc};

pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Returns the current Internet Computer time as nanoseconds since epoch.
pub fn get_current_time_ns() -> TimestampNs {
    ic_cdk::api::time()
}

/// Start of the calendar month (UTC) containing `now`.
pub fn calendar_month_start(now: TimestampNs) -> TimestampNs {
    let secs = (now / NANOS_PER_SEC) as i64;
    DateTime::<Utc>::from_timestamp(secs, 0)
        .and_then(|dt| NaiveDate::from_ymd_opt(dt.year(), dt.month(), 1))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|start| (start.and_utc().timestamp() as u64).saturating_mul(NANOS_PER_SEC))
        .unwrap_or(0)
}

/// Start of the period a fresh account opened at `now` belongs to.
pub fn period_start_for(period: SpendingPeriod, now: TimestampNs) -> TimestampNs {
    match period {
        SpendingPeriod::CalendarMonth => calendar_month_start(now),
        SpendingPeriod::Rolling { .. } => now,
    }
}

/// True once `now` lies outside the period that opened at `period_start`.
pub fn period_has_elapsed(period: SpendingPeriod, period_start: TimestampNs, now: TimestampNs) -> bool {
    match period {
        SpendingPeriod::CalendarMonth => calendar_month_start(now) > period_start,
        SpendingPeriod::Rolling { seconds } => {
            let length = seconds.saturating_mul(NANOS_PER_SEC);
            now >= period_start.saturating_add(length)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-15T12:00:00Z
    const MID_MARCH_2024: TimestampNs = 1_710_504_000 * NANOS_PER_SEC;
    // 2024-03-01T00:00:00Z
    const MARCH_1_2024: TimestampNs = 1_709_251_200 * NANOS_PER_SEC;
    // 2024-04-01T00:00:00Z
    const APRIL_1_2024: TimestampNs = 1_711_929_600 * NANOS_PER_SEC;

    #[test]
    fn calendar_month_start_truncates_to_first_day() {
        assert_eq!(calendar_month_start(MID_MARCH_2024), MARCH_1_2024);
        assert_eq!(calendar_month_start(MARCH_1_2024), MARCH_1_2024);
    }

    #[test]
    fn calendar_period_rolls_on_month_boundary() {
        let start = period_start_for(SpendingPeriod::CalendarMonth, MID_MARCH_2024);
        assert!(!period_has_elapsed(SpendingPeriod::CalendarMonth, start, APRIL_1_2024 - 1));
        assert!(period_has_elapsed(SpendingPeriod::CalendarMonth, start, APRIL_1_2024));
    }

    #[test]
    fn rolling_period_rolls_after_its_length() {
        let period = SpendingPeriod::Rolling { seconds: 60 };
        let start = period_start_for(period, MID_MARCH_2024);
        assert_eq!(start, MID_MARCH_2024);
        assert!(!period_has_elapsed(period, start, start + 59 * NANOS_PER_SEC));
        assert!(period_has_elapsed(period, start, start + 60 * NANOS_PER_SEC));
    }
}
