use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime, Offset, TimeZone, Timelike};

use crate::solar::SolarParameters;

/// Solar parameters for `latitude`/`longitude` at the current local wall-clock time.
pub fn now_parameters(latitude: f64, longitude: f64) -> SolarParameters {
    parameters_at(&Local::now(), latitude, longitude)
}

/// Solar parameters for an explicit zoned timestamp.
pub fn parameters_at<Tz: TimeZone>(
    now: &DateTime<Tz>,
    latitude: f64,
    longitude: f64,
) -> SolarParameters {
    let offset_seconds = now.offset().fix().local_minus_utc();
    SolarParameters {
        local_time: hours(&now.time()),
        latitude,
        longitude,
        utc_offset: offset_seconds as f64 / 3600.0,
        day: now.day(),
        month: now.month(),
        year: now.year(),
    }
}

/// Solar parameters for a calendar date and local time with a fixed UTC offset.
pub fn parameters_on(
    date: NaiveDate,
    time: NaiveTime,
    utc_offset: f64,
    latitude: f64,
    longitude: f64,
) -> SolarParameters {
    SolarParameters {
        local_time: hours(&time),
        latitude,
        longitude,
        utc_offset,
        day: date.day(),
        month: date.month(),
        year: date.year(),
    }
}

fn hours(time: &NaiveTime) -> f64 {
    time.hour() as f64 + time.minute() as f64 / 60.0 + time.second() as f64 / 3600.0
}
