use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::ScheduleError;

/// One scheduled time interval with a subject label and an attendance flag.
///
/// A lesson may cross midnight, in which case `end_date` is the day after
/// `start_date` and `end` is earlier than `start`. Interval math always runs
/// on the combined date+time instants, never on the time-of-day alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub subject: String,
    pub is_present: bool,
}

impl Lesson {
    /// Canonical constructor over already-parsed primitives. String parsing
    /// (HH:MM, YYYY-MM-DD) belongs to the request layer.
    pub fn new(
        start: NaiveTime,
        end: NaiveTime,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        subject: impl Into<String>,
    ) -> Result<Self, ScheduleError> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(ScheduleError::InvalidArgument(
                "lesson subject must not be blank".to_string(),
            ));
        }
        let end_date = end_date.unwrap_or(start_date);
        if end_date < start_date {
            return Err(ScheduleError::InvalidArgument(
                "lesson end date must not be before start date".to_string(),
            ));
        }
        Ok(Self {
            start,
            end,
            start_date,
            end_date,
            subject,
            is_present: false,
        })
    }

    pub fn start_at(&self) -> NaiveDateTime {
        self.start_date.and_time(self.start)
    }

    pub fn end_at(&self) -> NaiveDateTime {
        self.end_date.and_time(self.end)
    }

    /// Whether the intervals `[start_at, end_at)` intersect. Exact
    /// end-to-start adjacency is not overlap.
    pub fn overlaps_with(&self, other: &Lesson) -> bool {
        self.start_at() < other.end_at() && other.start_at() < self.end_at()
    }

    /// Chronological ordering: by start instant, ties broken by end instant.
    /// Lessons sharing both instants are order-equivalent. Kept as a named
    /// comparator rather than `Ord` because it ignores subject and presence,
    /// which `Eq` does not.
    pub fn cmp_chronological(&self, other: &Lesson) -> Ordering {
        self.start_at()
            .cmp(&other.start_at())
            .then_with(|| self.end_at().cmp(&other.end_at()))
    }

    /// Copy with only the attendance flag changed.
    pub fn with_presence(&self, is_present: bool) -> Lesson {
        Lesson {
            is_present,
            ..self.clone()
        }
    }
}

impl fmt::Display for Lesson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attendance = if self.is_present {
            "Present"
        } else {
            "Not Present"
        };
        write!(
            f,
            "{}: {} || {} to {} || {}[{}]",
            self.subject,
            self.start_date.format("%Y-%m-%d"),
            self.start.format("%H:%M"),
            self.end_date.format("%Y-%m-%d"),
            self.end.format("%H:%M"),
            attendance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(text: &str) -> NaiveTime {
        NaiveTime::parse_from_str(text, "%H:%M").unwrap()
    }

    fn date(text: &str) -> NaiveDate {
        text.parse().unwrap()
    }

    fn lesson(start: &str, end: &str, day: &str, subject: &str) -> Lesson {
        Lesson::new(time(start), time(end), date(day), None, subject).unwrap()
    }

    fn overnight(start: &str, end: &str, day: &str, end_day: &str, subject: &str) -> Lesson {
        Lesson::new(time(start), time(end), date(day), Some(date(end_day)), subject).unwrap()
    }

    #[test]
    fn new_rejects_blank_subject() {
        let err =
            Lesson::new(time("10:00"), time("11:00"), date("2023-01-01"), None, "   ").unwrap_err();
        assert_eq!(err.code(), "invalid_argument");
    }

    #[test]
    fn new_rejects_end_date_before_start_date() {
        let err = Lesson::new(
            time("22:00"),
            time("01:00"),
            date("2023-01-02"),
            Some(date("2023-01-01")),
            "Camp",
        )
        .unwrap_err();
        assert_eq!(err.code(), "invalid_argument");
    }

    #[test]
    fn equality_covers_all_fields() {
        let base = lesson("10:00", "11:00", "2023-01-01", "Math");
        assert_eq!(base, lesson("10:00", "11:00", "2023-01-01", "Math"));
        assert_ne!(base, lesson("10:01", "11:00", "2023-01-01", "Math"));
        assert_ne!(base, lesson("10:00", "11:00", "2023-01-02", "Math"));
        assert_ne!(base, lesson("10:00", "11:00", "2023-01-01", "Science"));
        assert_ne!(base, base.with_presence(true));
        assert_ne!(
            base,
            overnight("10:00", "11:00", "2023-01-01", "2023-01-02", "Math")
        );
    }

    #[test]
    fn overlap_same_date_is_symmetric() {
        let existing = lesson("10:00", "11:00", "2023-01-01", "Math");
        let overlapping = lesson("10:30", "11:30", "2023-01-01", "Science");
        assert!(existing.overlaps_with(&overlapping));
        assert!(overlapping.overlaps_with(&existing));
    }

    #[test]
    fn adjacency_is_not_overlap() {
        let existing = lesson("10:00", "11:00", "2023-01-01", "Math");
        let adjacent = lesson("11:00", "12:00", "2023-01-01", "Science");
        let other_day = lesson("10:30", "11:30", "2023-01-02", "Science");
        assert!(!existing.overlaps_with(&adjacent));
        assert!(!adjacent.overlaps_with(&existing));
        assert!(!existing.overlaps_with(&other_day));
    }

    #[test]
    fn cross_midnight_overlap() {
        let camp = overnight("23:00", "01:00", "2023-01-01", "2023-01-02", "Camp");
        let breakfast = lesson("00:30", "02:00", "2023-01-02", "Breakfast");
        assert!(camp.overlaps_with(&breakfast));
        assert!(breakfast.overlaps_with(&camp));
    }

    #[test]
    fn chronological_order_uses_end_as_tie_break() {
        let short = lesson("10:00", "10:30", "2023-01-01", "Math");
        let long = lesson("10:00", "11:00", "2023-01-01", "Science");
        let later = lesson("09:00", "10:00", "2023-01-02", "Physics");
        assert_eq!(short.cmp_chronological(&long), Ordering::Less);
        assert_eq!(long.cmp_chronological(&short), Ordering::Greater);
        assert_eq!(short.cmp_chronological(&later), Ordering::Less);
        assert_eq!(short.cmp_chronological(&short), Ordering::Equal);
    }

    #[test]
    fn display_matches_expected_format() {
        let not_present = lesson("14:00", "15:00", "2023-01-02", "Science");
        assert_eq!(
            not_present.to_string(),
            "Science: 2023-01-02 || 14:00 to 2023-01-02 || 15:00[Not Present]"
        );

        let present = lesson("10:00", "11:00", "2023-01-01", "Math").with_presence(true);
        assert_eq!(
            present.to_string(),
            "Math: 2023-01-01 || 10:00 to 2023-01-01 || 11:00[Present]"
        );

        let camp = overnight("22:00", "01:00", "2023-01-01", "2023-01-02", "Camp");
        assert_eq!(
            camp.to_string(),
            "Camp: 2023-01-01 || 22:00 to 2023-01-02 || 01:00[Not Present]"
        );
    }
}
