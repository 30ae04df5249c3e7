use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

//monday to friday, no exchange holiday calendar
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

//all business days in [start, end]
pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut date = start;

    while date <= end {
        if is_business_day(date) {
            days.push(date);
        }
        date += Duration::days(1);
    }

    days
}

//the first business day strictly after date
pub fn next_business_day(date: NaiveDate) -> NaiveDate {
    let mut next = date + Duration::days(1);
    while !is_business_day(next) {
        next += Duration::days(1);
    }
    next
}

//converts a wall-clock offset from midnight on date into a utc instant
//returns none for local times skipped by a dst transition
pub fn localize_offset(tz: Tz, date: NaiveDate, offset: Duration) -> Option<DateTime<Utc>> {
    let naive = date.and_time(NaiveTime::MIN) + offset;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

//converts date + clock time in tz into a utc instant
pub fn localize(tz: Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    localize_offset(tz, date, time - NaiveTime::MIN)
}

//the exchange-local calendar date of an instant
pub fn local_date(tz: Tz, ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&tz).date_naive()
}
