use chrono::{NaiveDate, NaiveTime};
use mongodb::bson::DateTime;

pub mod bookings;
pub mod destination;
pub mod favorite;
pub mod location;
pub mod review;
pub mod user;

/// Start of `date` in UTC, the form date-only fields are stored in.
pub fn midnight(date: NaiveDate) -> DateTime {
    DateTime::from_millis(date.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
}
