use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::CanonicalEvent;

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})(?::(\d{2}))?").expect("valid time regex"));

/// Parse the sheet's `D/M/YYYY` / `DD/MM/YYYY` date strings.
///
/// Leading zeros are optional and anything after the first space (usually
/// time text pasted into the date column) is ignored. Returns `None` for
/// anything that does not split into exactly three numeric components or
/// names an impossible calendar date; never panics.
pub fn parse_local_date(input: &str) -> Option<NaiveDate> {
    let date_part = input.trim().split_whitespace().next()?;
    let parts: Vec<&str> = date_part.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let year: i32 = parts[2].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse "22", "22:30" style wall-clock times from the sheet.
fn parse_time(input: &str) -> Option<NaiveTime> {
    let caps = TIME_RE.captures(input.trim())?;
    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = caps
        .get(2)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// The instant an event stops counting as upcoming.
///
/// With an end time, that time on the event's date — rolled forward one
/// day when the end hour is below the start hour (a party running past
/// midnight), or, with no start time, below 12 (an early-morning end can
/// only mean the next day). Without an end time the event lasts until the
/// last millisecond of its date.
pub fn effective_end(event: &CanonicalEvent) -> Option<NaiveDateTime> {
    let date = parse_local_date(&event.date)?;
    match event.end_time.as_deref().and_then(parse_time) {
        Some(end_time) => {
            let start_hour = event
                .start_time
                .as_deref()
                .and_then(parse_time)
                .map(|t| t.hour());
            let rolls_over = match start_hour {
                Some(start) => end_time.hour() < start,
                None => end_time.hour() < 12,
            };
            let end_date = if rolls_over { date.succ_opt()? } else { date };
            Some(end_date.and_time(end_time))
        }
        None => date.and_hms_milli_opt(23, 59, 59, 999),
    }
}

/// Whether `now` is strictly past the event's effective end.
///
/// An event with no parseable date is conservatively treated as over.
pub fn is_over(event: &CanonicalEvent, now: NaiveDateTime) -> bool {
    match effective_end(event) {
        Some(end) => now > end,
        None => true,
    }
}

/// Ascending by parsed date; events whose date does not parse sort after
/// every event with a valid date. Ties compare equal so a stable sort
/// keeps the sheet's row order.
pub fn compare_for_sort(a: &CanonicalEvent, b: &CanonicalEvent) -> Ordering {
    match (a.parsed_date(), b.parsed_date()) {
        (Some(date_a), Some(date_b)) => date_a.cmp(&date_b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(date: &str, start: Option<&str>, end: Option<&str>) -> CanonicalEvent {
        CanonicalEvent {
            name: "Teste".to_string(),
            date: date.to_string(),
            location: None,
            start_time: start.map(str::to_string),
            end_time: end.map(str::to_string),
            attractions: None,
            producer: None,
            image_url: None,
            genres: None,
            ticket_info: None,
            instagram_url: None,
            coupon: None,
            hidden: false,
            slug: "teste".to_string(),
        }
    }

    #[test]
    fn parses_with_and_without_leading_zeros() {
        assert_eq!(
            parse_local_date("01/03/2026"),
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
        assert_eq!(
            parse_local_date("1/3/2026"),
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
    }

    #[test]
    fn trailing_time_text_is_ignored() {
        assert_eq!(
            parse_local_date("10/12/2025 22:00"),
            NaiveDate::from_ymd_opt(2025, 12, 10)
        );
    }

    #[test]
    fn malformed_dates_parse_to_none() {
        assert_eq!(parse_local_date(""), None);
        assert_eq!(parse_local_date("bad-date"), None);
        assert_eq!(parse_local_date("10/12"), None);
        assert_eq!(parse_local_date("a/b/c"), None);
        assert_eq!(parse_local_date("32/13/2025"), None);
    }

    #[test]
    fn overnight_event_is_not_over_before_midnight() {
        // Ends at 02:00 after starting at 22:00, so the end rolls to the
        // next calendar day.
        let event = event("10/12/2025", Some("22:00"), Some("02:00"));
        let before_midnight = NaiveDate::from_ymd_opt(2025, 12, 10)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        let next_morning = NaiveDate::from_ymd_opt(2025, 12, 11)
            .unwrap()
            .and_hms_opt(3, 0, 0)
            .unwrap();
        assert!(!is_over(&event, before_midnight));
        assert!(is_over(&event, next_morning));
    }

    #[test]
    fn early_morning_end_without_start_rolls_forward() {
        let event = event("10/12/2025", None, Some("04:00"));
        let end = effective_end(&event).unwrap();
        assert_eq!(end.date(), NaiveDate::from_ymd_opt(2025, 12, 11).unwrap());
    }

    #[test]
    fn evening_end_without_start_stays_on_the_event_date() {
        let event = event("10/12/2025", None, Some("23:00"));
        let end = effective_end(&event).unwrap();
        assert_eq!(end.date(), NaiveDate::from_ymd_opt(2025, 12, 10).unwrap());
    }

    #[test]
    fn without_end_time_the_event_lasts_the_whole_day() {
        let event = event("10/12/2025", Some("20:00"), None);
        let same_day_late = NaiveDate::from_ymd_opt(2025, 12, 10)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        let next_day = NaiveDate::from_ymd_opt(2025, 12, 11)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(!is_over(&event, same_day_late));
        assert!(is_over(&event, next_day));
    }

    #[test]
    fn unparseable_date_counts_as_over() {
        let now = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(is_over(&event("Data a confirmar", None, None), now));
    }

    #[test]
    fn invalid_dates_sort_last() {
        let mut events = vec![
            event("10/12/2025", None, None),
            event("bad-date", None, None),
            event("01/01/2026", None, None),
        ];
        events.sort_by(compare_for_sort);
        assert_eq!(events[0].date, "10/12/2025");
        assert_eq!(events[1].date, "01/01/2026");
        assert_eq!(events[2].date, "bad-date");
    }

    #[test]
    fn same_date_ties_keep_input_order() {
        let mut first = event("10/12/2025", None, None);
        first.name = "A".to_string();
        let mut second = event("10/12/2025", None, None);
        second.name = "B".to_string();
        let mut events = vec![first, second];
        events.sort_by(compare_for_sort);
        assert_eq!(events[0].name, "A");
        assert_eq!(events[1].name, "B");
    }
}
