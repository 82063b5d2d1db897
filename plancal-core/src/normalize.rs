//! Wall-clock to UTC normalization.
//!
//! The timetable publishes local dates and times plus a duration in academic
//! periods, e.g. `"Pn 09:45 - 11:15 (2g)"`. Offsets come from an [`OffsetRule`];
//! the default [`SeasonalOffsetRule`] is a closed-form daylight-saving rule.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime,
    Offset, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::{PlancalError, PlancalResult, ValueError};
use crate::extract::ScheduleRow;

/// Length of one academic period ("1g").
pub const ACADEMIC_PERIOD_MINUTES: i64 = 45;

/// Maps a local wall-clock timestamp to its offset from UTC.
pub trait OffsetRule {
    fn utc_offset(&self, local: NaiveDateTime) -> FixedOffset;

    fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let offset = Duration::seconds(i64::from(self.utc_offset(local).local_minus_utc()));
        (local - offset).and_utc()
    }
}

impl<R: OffsetRule + ?Sized> OffsetRule for &R {
    fn utc_offset(&self, local: NaiveDateTime) -> FixedOffset {
        (**self).utc_offset(local)
    }
}

impl<R: OffsetRule + ?Sized> OffsetRule for Box<R> {
    fn utc_offset(&self, local: NaiveDateTime) -> FixedOffset {
        (**self).utc_offset(local)
    }
}

/// Summer time from the last Sunday of March (inclusive) to the last Sunday of
/// October (exclusive), both taken at local midnight.
///
/// The switch happens at day granularity, so the hours between midnight and the
/// real transition on those two Sundays get the other season's offset.
#[derive(Debug, Clone, Copy)]
pub struct SeasonalOffsetRule {
    winter: FixedOffset,
    summer: FixedOffset,
}

impl SeasonalOffsetRule {
    pub fn new(winter: FixedOffset, summer: FixedOffset) -> Self {
        SeasonalOffsetRule { winter, summer }
    }

    pub fn from_hours(winter: i32, summer: i32) -> PlancalResult<Self> {
        let offset = |hours: i32| {
            FixedOffset::east_opt(hours * 3600).ok_or_else(|| {
                PlancalError::Config(format!("UTC offset of {hours} hours is out of range"))
            })
        };
        Ok(Self::new(offset(winter)?, offset(summer)?))
    }

    pub fn is_summer(&self, local: NaiveDateTime) -> bool {
        let year = local.year();
        match (last_sunday(year, 3), last_sunday(year, 10)) {
            (Some(start), Some(end)) => {
                start.and_time(NaiveTime::MIN) <= local && local < end.and_time(NaiveTime::MIN)
            }
            _ => false,
        }
    }
}

impl Default for SeasonalOffsetRule {
    /// Central European Time / Central European Summer Time.
    fn default() -> Self {
        SeasonalOffsetRule {
            winter: FixedOffset::east_opt(3600).unwrap_or(Utc.fix()),
            summer: FixedOffset::east_opt(7200).unwrap_or(Utc.fix()),
        }
    }
}

impl OffsetRule for SeasonalOffsetRule {
    fn utc_offset(&self, local: NaiveDateTime) -> FixedOffset {
        if self.is_summer(local) {
            self.summer
        } else {
            self.winter
        }
    }
}

/// Offsets from the IANA timezone database.
#[derive(Debug, Clone, Copy)]
pub struct TzdbOffsetRule {
    tz: Tz,
}

impl TzdbOffsetRule {
    pub fn new(tz: Tz) -> Self {
        TzdbOffsetRule { tz }
    }
}

impl OffsetRule for TzdbOffsetRule {
    fn utc_offset(&self, local: NaiveDateTime) -> FixedOffset {
        // Ambiguous times take the earlier (summer) offset; skipped times the one before the gap.
        // Read as UTC, the wall time a day back is past the previous transition and before the gap.
        match self.tz.offset_from_local_datetime(&local).earliest() {
            Some(offset) => offset.fix(),
            None => self
                .tz
                .offset_from_utc_datetime(&(local - Duration::days(1)))
                .fix(),
        }
    }
}

/// Last Sunday of `month` in `year`.
pub fn last_sunday(year: i32, month: u32) -> Option<NaiveDate> {
    let last_day = NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()?;
    let back = (last_day.weekday().num_days_from_monday() + 1) % 7;
    last_day.checked_sub_signed(Duration::days(i64::from(back)))
}

/// Parsed time-and-duration cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeField {
    pub start: NaiveTime,
    /// Number of 45-minute academic periods.
    pub periods: u32,
}

impl TimeField {
    /// Parse `"<... HH:MM ...> (<N>g...)"`.
    pub fn parse(raw: &str) -> Result<Self, ValueError> {
        let (time_part, marker) = raw.split_once('(').ok_or(ValueError::MissingDuration)?;

        let periods = marker
            .split_once('g')
            .and_then(|(count, _)| count.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .ok_or_else(|| ValueError::MalformedDuration(format!("({marker}")))?;

        let start = time_part
            .split_whitespace()
            .find_map(|token| NaiveTime::parse_from_str(token, "%H:%M").ok())
            .ok_or(ValueError::MissingStartTime)?;

        Ok(TimeField { start, periods })
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.periods) * ACADEMIC_PERIOD_MINUTES)
    }
}

/// Absolute start and end instants of a row.
pub fn normalize(
    row: &ScheduleRow,
    rule: &dyn OffsetRule,
) -> PlancalResult<(DateTime<Utc>, DateTime<Utc>)> {
    let raw_time = row.time.as_deref().ok_or_else(|| PlancalError::RowShape {
        row: row.row,
        reason: "time column is empty".to_string(),
    })?;

    let field = TimeField::parse(raw_time).map_err(|source| PlancalError::Parse {
        row: row.row,
        value: raw_time.to_string(),
        source,
    })?;

    let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|e| {
        PlancalError::Parse {
            row: row.row,
            value: row.date.clone(),
            source: e.into(),
        }
    })?;

    let start = rule.to_utc(date.and_time(field.start));
    Ok((start, start + field.duration()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, time: &str) -> ScheduleRow {
        ScheduleRow {
            row: 2,
            date: date.to_string(),
            time: Some(time.to_string()),
            subject: Some("Statystyka".to_string()),
            class_type: Some("wykład".to_string()),
            instructor: None,
            location: None,
        }
    }

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn local(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_last_sunday() {
        assert_eq!(last_sunday(2024, 3), NaiveDate::from_ymd_opt(2024, 3, 31));
        assert_eq!(last_sunday(2024, 10), NaiveDate::from_ymd_opt(2024, 10, 27));
        assert_eq!(last_sunday(2025, 3), NaiveDate::from_ymd_opt(2025, 3, 30));
        assert_eq!(last_sunday(2025, 10), NaiveDate::from_ymd_opt(2025, 10, 26));
        assert_eq!(last_sunday(2024, 12), NaiveDate::from_ymd_opt(2024, 12, 29));
    }

    #[test]
    fn test_time_field_parses_both_layouts() {
        let short = TimeField::parse("10:00 (2g)").unwrap();
        assert_eq!(short.start, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(short.periods, 2);

        let live = TimeField::parse("Pn 09:45 - 11:15 (2g)").unwrap();
        assert_eq!(live.start, NaiveTime::from_hms_opt(9, 45, 0).unwrap());
    }

    #[test]
    fn test_duration_is_45_minutes_per_period() {
        for n in 1..=8u32 {
            let field = TimeField::parse(&format!("08:00 ({n}g)")).unwrap();
            assert_eq!(field.duration(), Duration::minutes(45 * i64::from(n)));
        }
    }

    #[test]
    fn test_time_field_errors() {
        assert!(matches!(
            TimeField::parse("10:00"),
            Err(ValueError::MissingDuration)
        ));
        assert!(matches!(
            TimeField::parse("10:00 (xg)"),
            Err(ValueError::MalformedDuration(_))
        ));
        assert!(matches!(
            TimeField::parse("10:00 (2)"),
            Err(ValueError::MalformedDuration(_))
        ));
        assert!(matches!(
            TimeField::parse("10:00 (0g)"),
            Err(ValueError::MalformedDuration(_))
        ));
        assert!(matches!(
            TimeField::parse("rano (2g)"),
            Err(ValueError::MissingStartTime)
        ));
    }

    #[test]
    fn test_normalize_winter_example() {
        let rule = SeasonalOffsetRule::default();
        let (start, end) = normalize(&row("2024-11-05", "10:00 (2g)"), &rule).unwrap();

        assert_eq!(start, utc("2024-11-05T09:00:00Z"));
        assert_eq!(end, utc("2024-11-05T10:30:00Z"));
    }

    #[test]
    fn test_normalize_summer_example() {
        let rule = SeasonalOffsetRule::default();
        let (start, end) = normalize(&row("2024-06-10", "10:00 (1g)"), &rule).unwrap();

        assert_eq!(start, utc("2024-06-10T08:00:00Z"));
        assert_eq!(end, utc("2024-06-10T08:45:00Z"));
    }

    #[test]
    fn test_seasonal_bounds() {
        let rule = SeasonalOffsetRule::default();

        assert!(!rule.is_summer(local("2024-03-30 23:59")));
        // Lower bound is inclusive from midnight of the transition Sunday
        assert!(rule.is_summer(local("2024-03-31 00:00")));
        assert!(rule.is_summer(local("2024-03-31 10:00")));
        assert!(rule.is_summer(local("2024-10-26 23:59")));
        // Upper bound is exclusive
        assert!(!rule.is_summer(local("2024-10-27 00:00")));
        assert!(!rule.is_summer(local("2024-10-27 10:00")));
    }

    #[test]
    fn test_normalize_on_transition_sundays() {
        let rule = SeasonalOffsetRule::default();

        let (march, _) = normalize(&row("2024-03-31", "10:00 (1g)"), &rule).unwrap();
        assert_eq!(march, utc("2024-03-31T08:00:00Z"));

        let (october, _) = normalize(&row("2024-10-27", "10:00 (1g)"), &rule).unwrap();
        assert_eq!(october, utc("2024-10-27T09:00:00Z"));
    }

    #[test]
    fn test_normalize_missing_time_is_row_shape_error() {
        let mut r = row("2024-11-05", "");
        r.time = None;

        let err = normalize(&r, &SeasonalOffsetRule::default()).unwrap_err();
        assert!(matches!(err, PlancalError::RowShape { row: 2, .. }));
    }

    #[test]
    fn test_normalize_bad_values_are_parse_errors() {
        let rule = SeasonalOffsetRule::default();

        let err = normalize(&row("2024-11-05", "10:00"), &rule).unwrap_err();
        assert!(matches!(
            err,
            PlancalError::Parse {
                source: ValueError::MissingDuration,
                ..
            }
        ));

        let err = normalize(&row("05.11.2024", "10:00 (2g)"), &rule).unwrap_err();
        assert!(matches!(
            err,
            PlancalError::Parse {
                source: ValueError::Date(_),
                ..
            }
        ));
    }

    #[test]
    fn test_tzdb_rule_matches_seasonal_away_from_transitions() {
        let tzdb = TzdbOffsetRule::new(chrono_tz::Europe::Warsaw);
        let seasonal = SeasonalOffsetRule::default();

        for ts in ["2024-01-15 08:00", "2024-06-10 10:00", "2024-11-05 10:00"] {
            assert_eq!(tzdb.utc_offset(local(ts)), seasonal.utc_offset(local(ts)), "{ts}");
        }
    }

    #[test]
    fn test_tzdb_rule_switches_at_transition_hour() {
        let tzdb = TzdbOffsetRule::new(chrono_tz::Europe::Warsaw);

        // Clocks go back at 03:00 local on 2024-10-27; the seasonal rule already says winter
        assert_eq!(tzdb.utc_offset(local("2024-10-27 01:00")).local_minus_utc(), 7200);
        assert_eq!(tzdb.utc_offset(local("2024-10-27 10:00")).local_minus_utc(), 3600);
    }

    #[test]
    fn test_tzdb_rule_gap_takes_offset_before_gap() {
        let tzdb = TzdbOffsetRule::new(chrono_tz::Europe::Warsaw);

        // 02:00-03:00 on 2024-03-31 does not exist in Warsaw.
        assert_eq!(tzdb.utc_offset(local("2024-03-31 02:30")).local_minus_utc(), 3600);
        assert_eq!(tzdb.utc_offset(local("2024-03-31 02:00")).local_minus_utc(), 3600);
        assert_eq!(tzdb.utc_offset(local("2024-03-31 03:00")).local_minus_utc(), 7200);
        assert_eq!(
            tzdb.to_utc(local("2024-03-31 02:30")),
            Utc.with_ymd_and_hms(2024, 3, 31, 1, 30, 0).unwrap()
        );
    }
}
