//! Tests for civil-calendar resolution and DST gap handling.

use availability_engine::zone::{civil_days, parse_timezone, resolve_local, LocalResolution};
use availability_engine::{DstPolicy, EngineError, OffsetProvider};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

#[test]
fn parse_known_and_unknown_zones() {
    assert!(parse_timezone("America/Los_Angeles").is_ok());
    assert!(parse_timezone("UTC").is_ok());
    assert_eq!(
        parse_timezone("Not/A_Zone").unwrap_err(),
        EngineError::InvalidTimezone("Not/A_Zone".to_string())
    );
}

#[test]
fn weekday_is_evaluated_in_the_zone_not_utc() {
    let la = parse_timezone("America/Los_Angeles").unwrap();
    let tokyo = parse_timezone("Asia/Tokyo").unwrap();
    // Saturday 2026-01-03 03:00 UTC
    let instant = utc(2026, 1, 3, 3, 0);

    assert_eq!(Utc.weekday(instant), Weekday::Sat);
    assert_eq!(la.weekday(instant), Weekday::Fri);
    assert_eq!(tokyo.weekday(instant), Weekday::Sat);
    assert_eq!(la.civil_date(instant), NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
}

#[test]
fn civil_date_clamps_at_the_ends_of_representable_time() {
    let tokyo = parse_timezone("Asia/Tokyo").unwrap();
    let la = parse_timezone("America/Los_Angeles").unwrap();

    let max = DateTime::<Utc>::MAX_UTC;
    let min = DateTime::<Utc>::MIN_UTC;
    assert_eq!(tokyo.civil_date(max), max.date_naive());
    assert_eq!(la.civil_date(min), min.date_naive());
    assert_eq!(civil_days(&la, min, min).count(), 1);
}

#[test]
fn offset_changes_across_spring_forward() {
    let ny = parse_timezone("America/New_York").unwrap();
    assert_eq!(ny.offset_seconds(utc(2026, 3, 8, 6, 59)), -5 * 3600);
    assert_eq!(ny.offset_seconds(utc(2026, 3, 8, 7, 0)), -4 * 3600);
}

#[test]
fn resolve_reports_gap_and_ambiguity() {
    let ny = parse_timezone("America/New_York").unwrap();

    assert_eq!(ny.resolve(local(2026, 3, 8, 2, 30)), LocalResolution::Gap);
    assert_eq!(
        ny.resolve(local(2026, 11, 1, 1, 30)),
        LocalResolution::Ambiguous {
            earliest: utc(2026, 11, 1, 5, 30),
            latest: utc(2026, 11, 1, 6, 30),
        }
    );
    assert_eq!(
        ny.resolve(local(2026, 6, 1, 9, 0)),
        LocalResolution::Single(utc(2026, 6, 1, 13, 0))
    );
}

#[test]
fn ambiguous_local_time_resolves_to_earliest() {
    let ny = parse_timezone("America/New_York").unwrap();
    for policy in [DstPolicy::Skip, DstPolicy::ShiftForward, DstPolicy::WallClock] {
        assert_eq!(
            resolve_local(&ny, local(2026, 11, 1, 1, 30), policy),
            Some(utc(2026, 11, 1, 5, 30))
        );
    }
}

#[test]
fn gap_resolution_per_policy() {
    let ny = parse_timezone("America/New_York").unwrap();
    let in_gap = local(2026, 3, 8, 2, 30);

    assert_eq!(resolve_local(&ny, in_gap, DstPolicy::Skip), None);
    assert_eq!(
        resolve_local(&ny, in_gap, DstPolicy::ShiftForward),
        Some(utc(2026, 3, 8, 7, 0))
    );
    assert_eq!(
        resolve_local(&ny, in_gap, DstPolicy::WallClock),
        Some(utc(2026, 3, 8, 7, 30))
    );
}

#[test]
fn civil_days_span_local_dates_inclusively() {
    let la = parse_timezone("America/Los_Angeles").unwrap();
    // 2026-01-01 00:00 UTC is Dec 31 in LA; 2026-01-03 07:59 UTC is Jan 2.
    let days: Vec<NaiveDate> = civil_days(&la, utc(2026, 1, 1, 0, 0), utc(2026, 1, 3, 7, 59)).collect();

    assert_eq!(
        days,
        vec![
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
        ]
    );
}

#[test]
fn civil_days_empty_when_last_before_first() {
    let days: Vec<NaiveDate> = civil_days(&Utc, utc(2026, 1, 5, 0, 0), utc(2026, 1, 3, 0, 0)).collect();
    assert!(days.is_empty());
}
