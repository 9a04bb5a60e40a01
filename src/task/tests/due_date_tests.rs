//! Tests for due date normalisation.

use super::fixtures::date;
use crate::task::domain::{DueDateValue, StoreTimestamp, format_calendar_date, parse_date_text};
use rstest::rstest;

#[rstest]
#[case("2026-03-14", Some(date(2026, 3, 14)))]
#[case("  2026-03-14  ", Some(date(2026, 3, 14)))]
#[case("2026-03-14T23:30:00+02:00", Some(date(2026, 3, 14)))]
#[case("2026-03-14T08:15:00Z", Some(date(2026, 3, 14)))]
#[case("2026-03-14T08:15:00.250", Some(date(2026, 3, 14)))]
#[case("", None)]
#[case("tomorrow", None)]
#[case("2026-02-30", None)]
fn parse_date_text_accepts_iso_forms(#[case] raw: &str, #[case] expected: Option<chrono::NaiveDate>) {
    assert_eq!(parse_date_text(raw), expected);
}

#[rstest]
fn every_representation_normalises_to_the_same_date() {
    let expected = date(2026, 7, 1);
    let values = [
        DueDateValue::Date(expected),
        DueDateValue::Timestamp(StoreTimestamp::from_date(expected)),
        DueDateValue::Text("2026-07-01".to_owned()),
    ];

    for value in values {
        assert_eq!(value.to_calendar_date(), Some(expected), "{value:?}");
    }
}

#[rstest]
fn timestamp_uses_utc_calendar_day() {
    let late_evening = StoreTimestamp {
        seconds: StoreTimestamp::from_date(date(2026, 7, 1)).seconds + 23 * 3600,
        nanoseconds: 999_999_999,
    };
    assert_eq!(late_evening.to_date(), Some(date(2026, 7, 1)));
}

#[rstest]
fn out_of_range_timestamp_has_no_date() {
    let value = DueDateValue::Timestamp(StoreTimestamp {
        seconds: i64::MAX,
        nanoseconds: 0,
    });
    assert_eq!(value.to_calendar_date(), None);
}

#[rstest]
fn format_calendar_date_is_zero_padded() {
    assert_eq!(format_calendar_date(date(2026, 1, 5)), "2026-01-05");
}
