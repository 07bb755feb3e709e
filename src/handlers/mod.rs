pub mod calendar;
pub mod health;
pub mod profile;
pub mod routine;
pub mod routine_draft;
pub mod session;
pub mod stats;
pub mod workout;

use chrono::{Local, NaiveDate};

/// The calendar day "today" is evaluated against, in server local time.
pub(crate) fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
