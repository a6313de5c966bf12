use time::{macros::format_description, OffsetDateTime};

/// Current wall-clock time as Unix epoch seconds.
/// Breaker timestamps are compared at second granularity.
#[inline]
pub fn curr_time_secs() -> u64 {
    OffsetDateTime::now_utc().unix_timestamp() as u64
}

#[inline]
pub fn format_time_secs(ts_secs: u64) -> String {
    OffsetDateTime::from_unix_timestamp(ts_secs as i64)
        .unwrap()
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap()
}
