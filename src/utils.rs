/// Converts milliseconds since epoch to [`chrono::DateTime<chrono::Utc>`].
///
/// Returns [`None`] for negative values, as the protocol uses those as "unset" markers,
/// or if the value is out of range.
#[cfg(feature = "ts_chrono")]
pub(crate) fn millis_to_chrono_datetime(millis: i64) -> Option<chrono::DateTime<chrono::Utc>> {
    use chrono::TimeZone;

    if millis < 0 {
        return None;
    }

    chrono::Utc.timestamp_millis_opt(millis).single()
}

/// Converts milliseconds to [`chrono::Duration`].
///
/// Returns [`None`] for negative values, as the protocol uses those as "unset" markers.
#[cfg(feature = "ts_chrono")]
pub(crate) fn millis_to_chrono_duration(millis: i64) -> Option<chrono::Duration> {
    (millis >= 0).then(|| chrono::Duration::milliseconds(millis))
}

/// Converts milliseconds since epoch to [`time::OffsetDateTime`].
///
/// Returns [`None`] for negative values, as the protocol uses those as "unset" markers,
/// or if the value is out of range.
#[cfg(feature = "ts_time")]
pub(crate) fn millis_to_time_offset_datetime(millis: i64) -> Option<time::OffsetDateTime> {
    if millis < 0 {
        return None;
    }

    time::OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000).ok()
}

/// Converts milliseconds to [`time::Duration`].
///
/// Returns [`None`] for negative values, as the protocol uses those as "unset" markers.
#[cfg(feature = "ts_time")]
pub(crate) fn millis_to_time_duration(millis: i64) -> Option<time::Duration> {
    (millis >= 0).then(|| time::Duration::milliseconds(millis))
}

/// Used in unit tests to verify type is Thread Safe and Async/Await Safe.
///
/// It enforces that the given type implements the following standard traits:
///
/// * `std::marker::Sized`: type has a constant size known at compile time
/// * `std::marker::Send`: type is safe to send to another thread
/// * `std::marker::Sync`: type is Sync if it is safe to share between threads;
///   type can be Sync if and only if a reference to it is Send
/// * `std::marker::Unpin`: type can be safely moved after pinning
#[cfg(test)]
pub(crate) fn is_thread_safe<T: Sized + Send + Sync + Unpin>() {}
