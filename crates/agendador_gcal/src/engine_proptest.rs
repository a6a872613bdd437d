#[cfg(test)]
mod tests {
    use crate::slots::SlotCatalog;
    use crate::timezone::{format_time, local_to_utc, utc_to_local};
    use agendador_common::{overlaps, TimeWindow};
    use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
    use chrono_tz::Tz;
    use proptest::prelude::*;

    const FIXED_OFFSET_ZONES: [Tz; 3] = [Tz::UTC, Tz::Asia__Tokyo, Tz::Asia__Kolkata];
    const DST_ZONES: [Tz; 4] = [
        Tz::America__Santiago,
        Tz::America__New_York,
        Tz::Europe__Berlin,
        Tz::Australia__Sydney,
    ];

    fn window(start_minute: i64, len_minutes: i64) -> TimeWindow {
        let base = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();
        let start = base + Duration::minutes(start_minute);
        TimeWindow::new(start, start + Duration::minutes(len_minutes))
    }

    proptest! {
        // Zones without DST round trip on any day of the year.
        #[test]
        fn test_round_trip_fixed_offset_zones(
            zone in 0..3usize,
            year in 2020..2030i32,
            ordinal in 1..366u32,
            hour in 0..24u32,
            minute in 0..60u32,
        ) {
            let tz = FIXED_OFFSET_ZONES[zone];
            let date = NaiveDate::from_yo_opt(year, ordinal).unwrap();
            let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap();

            let (back_date, back_time) = utc_to_local(local_to_utc(date, time, tz).unwrap(), tz);
            prop_assert_eq!(back_date, date);
            prop_assert_eq!(back_time, format_time(time));
        }

        // DST zones round trip away from their transitions (mid January, June, July).
        #[test]
        fn test_round_trip_dst_zones_between_transitions(
            zone in 0..4usize,
            year in 2020..2030i32,
            month_index in 0..3usize,
            day in 10..=20u32,
            hour in 0..24u32,
            minute in 0..60u32,
        ) {
            let tz = DST_ZONES[zone];
            let month = [1, 6, 7][month_index];
            let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
            let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap();

            let (back_date, back_time) = utc_to_local(local_to_utc(date, time, tz).unwrap(), tz);
            prop_assert_eq!(back_date, date);
            prop_assert_eq!(back_time, format_time(time));
        }

        #[test]
        fn test_overlap_is_symmetric(
            a_start in 0..1440i64,
            a_len in 1..240i64,
            b_start in 0..1440i64,
            b_len in 1..240i64,
        ) {
            let a = window(a_start, a_len);
            let b = window(b_start, b_len);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
            prop_assert_eq!(
                overlaps(a.start, a.end, b.start, b.end),
                overlaps(b.start, b.end, a.start, a.end)
            );
        }

        #[test]
        fn test_adjacent_slots_never_overlap(start in 0..1440i64, len in 1..240i64) {
            let first = window(start, len);
            let next = window(start + len, len);
            prop_assert!(!first.overlaps(&next));
        }

        #[test]
        fn test_catalog_is_increasing_and_bounded(
            start_minute in 0..1440u32,
            end_minute in 0..1440u32,
            step in 1..180u32,
        ) {
            let start = NaiveTime::from_num_seconds_from_midnight_opt(start_minute * 60, 0).unwrap();
            let end = NaiveTime::from_num_seconds_from_midnight_opt(end_minute * 60, 0).unwrap();
            let slots: Vec<NaiveTime> = SlotCatalog::new(start, end, step).unwrap().collect();

            if end < start {
                prop_assert!(slots.is_empty());
            } else {
                prop_assert_eq!(slots.first().copied(), Some(start));
                prop_assert!(slots.windows(2).all(|w| w[0] < w[1]));
                prop_assert!(slots.iter().all(|s| *s >= start && *s <= end));
                let expected = ((end_minute - start_minute) / step + 1) as usize;
                prop_assert_eq!(slots.len(), expected);
            }
        }
    }
}
