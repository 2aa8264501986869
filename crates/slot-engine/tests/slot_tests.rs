//! Tests for slot generation on a single date.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use slot_engine::slots::{
    available_dates, generate_slots, generate_slots_for_date, generate_slots_for_date_with,
    generate_slots_with, slot_dates, BookedInterval, CandidateSlot, SlotOptions, SteppingPolicy,
    MAX_DATE_RANGE_DAYS,
};
use slot_engine::{AvailabilityRuleSet, DstPolicy, SlotError, WeeklyAvailabilityWindow};

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Monday.
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
}

fn t(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn utc_window(weekday: Weekday, start: (u32, u32), end: (u32, u32)) -> WeeklyAvailabilityWindow {
    WeeklyAvailabilityWindow::new(weekday, t(start.0, start.1), t(end.0, end.1), Tz::UTC)
}

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, hour, minute, 0).unwrap()
}

fn booking(start: (u32, u32), end: (u32, u32)) -> BookedInterval {
    BookedInterval::new(at(start.0, start.1), at(end.0, end.1))
}

fn starts(slots: &[CandidateSlot]) -> Vec<DateTime<Utc>> {
    slots.iter().map(|s| s.start.with_timezone(&Utc)).collect()
}

// ── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn scenario_a_full_day_thirty_minute_slots() {
    let window = utc_window(Weekday::Mon, (9, 0), (17, 0));

    let slots = generate_slots(Some(&window), monday(), 30, &[]).unwrap();

    assert_eq!(slots.len(), 16);
    assert_eq!(slots[0].start, at(9, 0));
    assert_eq!(slots[0].end, at(9, 30));
    assert_eq!(slots[15].start, at(16, 30));
    assert_eq!(slots[15].end, at(17, 0));
    assert!(slots.iter().all(|s| s.duration_minutes() == 30));
}

#[test]
fn scenario_b_booking_removes_exactly_its_slot() {
    let window = utc_window(Weekday::Mon, (9, 0), (17, 0));
    let bookings = [booking((10, 0), (10, 30))];

    let slots = generate_slots(Some(&window), monday(), 30, &bookings).unwrap();
    let starts = starts(&slots);

    assert_eq!(slots.len(), 15);
    assert!(!starts.contains(&at(10, 0)));
    assert!(starts.contains(&at(9, 30)), "slot ending at booking start stays");
    assert!(starts.contains(&at(10, 30)), "slot starting at booking end stays");
}

#[test]
fn scenario_c_partial_trailing_slot_is_dropped() {
    let window = utc_window(Weekday::Mon, (9, 0), (9, 45));

    let slots = generate_slots(Some(&window), monday(), 30, &[]).unwrap();

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].start, at(9, 0));
    assert_eq!(slots[0].end, at(9, 30));
}

#[test]
fn scenario_d_no_window_is_empty_not_error() {
    let slots = generate_slots(None, monday(), 30, &[]).unwrap();
    assert!(slots.is_empty());

    let rules = AvailabilityRuleSet::new(Tz::UTC, vec![utc_window(Weekday::Tue, (9, 0), (17, 0))])
        .unwrap();
    let slots = generate_slots_for_date(&rules, monday(), 30, &[]).unwrap();
    assert!(slots.is_empty(), "Monday has no configured window");
}

// ── Edge cases ──────────────────────────────────────────────────────────────

#[test]
fn window_for_another_weekday_yields_nothing() {
    let window = utc_window(Weekday::Fri, (9, 0), (17, 0));
    let slots = generate_slots(Some(&window), monday(), 30, &[]).unwrap();
    assert!(slots.is_empty());
}

#[test]
fn non_positive_duration_fails_fast() {
    let window = utc_window(Weekday::Mon, (9, 0), (17, 0));

    assert_eq!(
        generate_slots(Some(&window), monday(), 0, &[]),
        Err(SlotError::InvalidDuration(0))
    );
    assert_eq!(
        generate_slots(Some(&window), monday(), -15, &[]),
        Err(SlotError::InvalidDuration(-15))
    );
    // Even without a window, a bad duration is a caller bug.
    assert_eq!(
        generate_slots(None, monday(), 0, &[]),
        Err(SlotError::InvalidDuration(0))
    );
}

#[test]
fn zero_length_or_inverted_window_is_empty() {
    let zero = utc_window(Weekday::Mon, (9, 0), (9, 0));
    assert!(generate_slots(Some(&zero), monday(), 30, &[]).unwrap().is_empty());

    let inverted = utc_window(Weekday::Mon, (17, 0), (9, 0));
    assert!(generate_slots(Some(&inverted), monday(), 30, &[]).unwrap().is_empty());
}

#[test]
fn duration_longer_than_window_is_empty() {
    let window = utc_window(Weekday::Mon, (9, 0), (9, 45));
    assert!(generate_slots(Some(&window), monday(), 60, &[]).unwrap().is_empty());
}

#[test]
fn booking_straddling_two_slots_removes_both() {
    let window = utc_window(Weekday::Mon, (9, 0), (12, 0));
    let bookings = [booking((9, 45), (10, 15))];

    let slots = generate_slots(Some(&window), monday(), 30, &bookings).unwrap();
    let starts = starts(&slots);

    assert_eq!(slots.len(), 4);
    assert!(!starts.contains(&at(9, 30)));
    assert!(!starts.contains(&at(10, 0)));
    assert!(starts.contains(&at(9, 0)));
    assert!(starts.contains(&at(10, 30)));
}

#[test]
fn fixed_grid_does_not_realign_after_short_booking() {
    // 60-minute grid from 09:00. A 15-minute booking at 09:00 kills the 09:00
    // slot; the next offer is still 10:00, never 09:15.
    let window = utc_window(Weekday::Mon, (9, 0), (12, 0));
    let bookings = [booking((9, 0), (9, 15))];

    let slots = generate_slots(Some(&window), monday(), 60, &bookings).unwrap();

    assert_eq!(starts(&slots), vec![at(10, 0), at(11, 0)]);
}

#[test]
fn fully_booked_day_is_empty() {
    let window = utc_window(Weekday::Mon, (9, 0), (12, 0));
    let bookings = [booking((8, 0), (13, 0))];

    let slots = generate_slots(Some(&window), monday(), 30, &bookings).unwrap();
    assert!(slots.is_empty());
}

#[test]
fn bookings_on_other_days_are_ignored() {
    let window = utc_window(Weekday::Mon, (9, 0), (10, 0));
    let tuesday_booking = BookedInterval::new(
        Utc.with_ymd_and_hms(2026, 3, 17, 9, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 3, 17, 10, 0, 0).unwrap(),
    );

    let slots = generate_slots(Some(&window), monday(), 30, &[tuesday_booking]).unwrap();
    assert_eq!(slots.len(), 2);
}

#[test]
fn identical_inputs_give_identical_output() {
    let window = utc_window(Weekday::Mon, (9, 0), (17, 0));
    let bookings = [booking((11, 0), (12, 15)), booking((14, 10), (14, 20))];

    let first = generate_slots(Some(&window), monday(), 45, &bookings).unwrap();
    let second = generate_slots(Some(&window), monday(), 45, &bookings).unwrap();
    assert_eq!(first, second);
}

#[test]
fn slots_are_expressed_in_the_host_zone() {
    let window = WeeklyAvailabilityWindow::new(
        Weekday::Mon,
        t(9, 0),
        t(10, 0),
        chrono_tz::America::New_York,
    );

    let slots = generate_slots(Some(&window), monday(), 30, &[]).unwrap();

    // 2026-03-16 is after the US spring-forward, so New York is UTC-4.
    assert_eq!(slots[0].start.to_rfc3339(), "2026-03-16T09:00:00-04:00");
    assert_eq!(slots[0].start.with_timezone(&Utc), at(13, 0));
}

// ── Stepping policy ─────────────────────────────────────────────────────────

#[test]
fn pack_around_bookings_restarts_grid_at_booking_end() {
    let window = utc_window(Weekday::Mon, (9, 0), (12, 0));
    let bookings = [booking((9, 0), (9, 15))];
    let options = SlotOptions {
        stepping: SteppingPolicy::PackAroundBookings,
        ..SlotOptions::default()
    };

    let slots = generate_slots_with(Some(&window), monday(), 60, &bookings, &options).unwrap();

    assert_eq!(starts(&slots), vec![at(9, 15), at(10, 15)]);
}

#[test]
fn pack_around_bookings_jumps_past_the_latest_blocking_booking() {
    let window = utc_window(Weekday::Mon, (9, 0), (11, 0));
    let bookings = [booking((9, 10), (9, 20)), booking((9, 0), (9, 40))];
    let options = SlotOptions {
        stepping: SteppingPolicy::PackAroundBookings,
        ..SlotOptions::default()
    };

    let slots = generate_slots_with(Some(&window), monday(), 30, &bookings, &options).unwrap();

    assert_eq!(starts(&slots), vec![at(9, 40), at(10, 10)]);
}

#[test]
fn pack_and_grid_agree_without_bookings() {
    let window = utc_window(Weekday::Mon, (9, 0), (17, 0));
    let packed = SlotOptions {
        stepping: SteppingPolicy::PackAroundBookings,
        ..SlotOptions::default()
    };

    assert_eq!(
        generate_slots_with(Some(&window), monday(), 25, &[], &packed).unwrap(),
        generate_slots(Some(&window), monday(), 25, &[]).unwrap()
    );
}

// ── not_before ──────────────────────────────────────────────────────────────

#[test]
fn not_before_drops_past_slots_without_shifting_the_grid() {
    let window = utc_window(Weekday::Mon, (9, 0), (12, 0));
    let options = SlotOptions {
        not_before: Some(at(10, 10)),
        ..SlotOptions::default()
    };

    let slots = generate_slots_with(Some(&window), monday(), 30, &[], &options).unwrap();

    assert_eq!(
        starts(&slots),
        vec![at(10, 30), at(11, 0), at(11, 30)],
        "10:10 is not a grid point; the next offer is 10:30"
    );
}

#[test]
fn not_before_on_a_grid_point_keeps_that_slot() {
    let window = utc_window(Weekday::Mon, (9, 0), (10, 0));
    let options = SlotOptions {
        not_before: Some(at(9, 30)),
        ..SlotOptions::default()
    };

    let slots = generate_slots_with(Some(&window), monday(), 30, &[], &options).unwrap();
    assert_eq!(starts(&slots), vec![at(9, 30)]);
}

// ── DST ─────────────────────────────────────────────────────────────────────

#[test]
fn spring_forward_day_keeps_real_slot_lengths() {
    // 2026-03-08 (Sunday): New York jumps 02:00 EST -> 03:00 EDT.
    // 00:00-04:00 local spans only three real hours.
    let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
    let window = WeeklyAvailabilityWindow::new(
        Weekday::Sun,
        t(0, 0),
        t(4, 0),
        chrono_tz::America::New_York,
    );

    let slots = generate_slots(Some(&window), date, 60, &[]).unwrap();

    assert_eq!(slots.len(), 3);
    assert!(slots.iter().all(|s| s.duration_minutes() == 60));
    assert_eq!(slots[2].start.to_rfc3339(), "2026-03-08T03:00:00-04:00");
}

#[test]
fn window_start_in_dst_gap_shifts_forward_by_default() {
    let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
    let window = WeeklyAvailabilityWindow::new(
        Weekday::Sun,
        t(2, 30),
        t(5, 0),
        chrono_tz::America::New_York,
    );

    let slots = generate_slots(Some(&window), date, 60, &[]).unwrap();

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].start.to_rfc3339(), "2026-03-08T03:00:00-04:00");
}

#[test]
fn window_start_in_dst_gap_is_skipped_under_skip_policy() {
    let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
    let window = WeeklyAvailabilityWindow::new(
        Weekday::Sun,
        t(2, 30),
        t(5, 0),
        chrono_tz::America::New_York,
    );
    let options = SlotOptions {
        dst_policy: DstPolicy::Skip,
        ..SlotOptions::default()
    };

    let slots = generate_slots_with(Some(&window), date, 60, &[], &options).unwrap();
    assert!(slots.is_empty());
}

#[test]
fn fall_back_day_has_an_extra_real_hour() {
    // 2026-11-01 (Sunday): New York repeats 01:00-02:00. 00:00 EDT to 03:00 EST
    // is four real hours.
    let date = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
    let window = WeeklyAvailabilityWindow::new(
        Weekday::Sun,
        t(0, 0),
        t(3, 0),
        chrono_tz::America::New_York,
    );

    let slots = generate_slots(Some(&window), date, 60, &[]).unwrap();

    assert_eq!(slots.len(), 4);
    assert_eq!(slots[0].start.to_rfc3339(), "2026-11-01T00:00:00-04:00");
    assert_eq!(slots[3].end.to_rfc3339(), "2026-11-01T03:00:00-05:00");
}

// ── Multiple windows per day ────────────────────────────────────────────────

#[test]
fn multiple_windows_are_concatenated_in_order() {
    let rules = AvailabilityRuleSet::new(
        Tz::UTC,
        vec![
            utc_window(Weekday::Mon, (14, 0), (15, 0)),
            utc_window(Weekday::Mon, (9, 0), (10, 0)),
        ],
    )
    .unwrap();

    let slots = generate_slots_for_date(&rules, monday(), 30, &[]).unwrap();

    assert_eq!(
        starts(&slots),
        vec![at(9, 0), at(9, 30), at(14, 0), at(14, 30)]
    );
}

#[test]
fn each_window_has_its_own_grid() {
    // The second window starts off the first window's 45-minute grid.
    let rules = AvailabilityRuleSet::new(
        Tz::UTC,
        vec![
            utc_window(Weekday::Mon, (9, 0), (10, 30)),
            utc_window(Weekday::Mon, (11, 10), (12, 40)),
        ],
    )
    .unwrap();

    let slots = generate_slots_for_date(&rules, monday(), 45, &[]).unwrap();

    assert_eq!(
        starts(&slots),
        vec![at(9, 0), at(9, 45), at(11, 10), at(11, 55)]
    );
}

#[test]
fn booking_across_adjacent_windows_removes_slots_from_both() {
    let rules = AvailabilityRuleSet::new(
        Tz::UTC,
        vec![
            utc_window(Weekday::Mon, (9, 0), (10, 0)),
            utc_window(Weekday::Mon, (10, 0), (11, 0)),
        ],
    )
    .unwrap();
    let bookings = [booking((9, 45), (10, 15))];

    let slots = generate_slots_for_date(&rules, monday(), 30, &bookings).unwrap();

    assert_eq!(starts(&slots), vec![at(9, 0), at(10, 30)]);
}

#[test]
fn rule_set_generation_checks_duration_even_on_empty_days() {
    let rules = AvailabilityRuleSet::empty(Tz::UTC);
    assert_eq!(
        generate_slots_for_date_with(&rules, monday(), 0, &[], &SlotOptions::default()),
        Err(SlotError::InvalidDuration(0))
    );
}

// ── Date helpers ────────────────────────────────────────────────────────────

#[test]
fn slot_dates_are_unique_and_sorted() {
    let rules = AvailabilityRuleSet::new(
        Tz::UTC,
        vec![
            utc_window(Weekday::Mon, (9, 0), (11, 0)),
            utc_window(Weekday::Tue, (9, 0), (11, 0)),
        ],
    )
    .unwrap();
    let tuesday = NaiveDate::from_ymd_opt(2026, 3, 17).unwrap();

    let mut slots = generate_slots_for_date(&rules, tuesday, 30, &[]).unwrap();
    slots.extend(generate_slots_for_date(&rules, monday(), 30, &[]).unwrap());

    assert_eq!(slot_dates(&slots), vec![monday(), tuesday]);
}

#[test]
fn available_dates_skip_unconfigured_and_fully_booked_days() {
    let rules = AvailabilityRuleSet::new(
        Tz::UTC,
        vec![
            utc_window(Weekday::Mon, (9, 0), (10, 0)),
            utc_window(Weekday::Wed, (9, 0), (10, 0)),
            utc_window(Weekday::Fri, (9, 0), (10, 0)),
        ],
    )
    .unwrap();
    // Wednesday 2026-03-18 is fully booked.
    let bookings = [BookedInterval::new(
        Utc.with_ymd_and_hms(2026, 3, 18, 9, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 3, 18, 10, 0, 0).unwrap(),
    )];

    let dates = available_dates(
        &rules,
        monday(),
        NaiveDate::from_ymd_opt(2026, 3, 22).unwrap(),
        30,
        &bookings,
        &SlotOptions::default(),
    )
    .unwrap();

    assert_eq!(
        dates,
        vec![monday(), NaiveDate::from_ymd_opt(2026, 3, 20).unwrap()]
    );
}

#[test]
fn available_dates_with_reversed_range_is_empty() {
    let rules = AvailabilityRuleSet::new(Tz::UTC, vec![utc_window(Weekday::Mon, (9, 0), (10, 0))])
        .unwrap();
    let dates = available_dates(
        &rules,
        monday(),
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        30,
        &[],
        &SlotOptions::default(),
    )
    .unwrap();
    assert!(dates.is_empty());
}

#[test]
fn available_dates_rejects_oversized_range() {
    let rules = AvailabilityRuleSet::empty(Tz::UTC);
    let to = monday() + chrono::Duration::days(MAX_DATE_RANGE_DAYS);
    let err = available_dates(&rules, monday(), to, 30, &[], &SlotOptions::default()).unwrap_err();
    assert!(matches!(err, SlotError::InvalidDateRange(_)));
}
