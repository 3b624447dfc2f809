//! Calendar days in the course's time zone.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use entities::Course;

use crate::{AttendanceError, AttendanceResult};

/// Zone used when neither configuration nor course names one.
pub const DEFAULT_TIME_ZONE: &str = "America/Mazatlan";

/// Parses an IANA time zone name.
pub fn parse_zone(name: &str) -> AttendanceResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| AttendanceError::InvalidTimeZone(name.to_string()))
}

/// Returns the calendar day `instant` falls on in `zone`.
///
/// The result depends only on the instant and the zone, never on the local
/// zone of the machine running the code.
pub fn to_local_date(instant: DateTime<Utc>, zone: Tz) -> NaiveDate {
    instant.with_timezone(&zone).date_naive()
}

/// Decides which time zone a course's calendar days are computed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZonePolicy {
    default_zone: Tz,
}

impl Default for ZonePolicy {
    fn default() -> Self {
        Self {
            default_zone: chrono_tz::America::Mazatlan,
        }
    }
}

impl ZonePolicy {
    /// Creates a policy with the given default zone.
    pub fn new(default_zone: Tz) -> Self {
        Self { default_zone }
    }

    /// Creates a policy from an IANA zone name.
    pub fn from_name(name: &str) -> AttendanceResult<Self> {
        parse_zone(name).map(Self::new)
    }

    /// Returns the zone for a course: its own override if valid, else the default.
    pub fn zone_for(&self, course: Option<&Course>) -> Tz {
        let Some(name) = course.and_then(|c| c.time_zone.as_deref()) else {
            return self.default_zone;
        };
        match parse_zone(name) {
            Ok(zone) => zone,
            Err(_) => {
                tracing::warn!(
                    time_zone = %name,
                    default = %self.default_zone,
                    "Course has an unknown time zone, using the default"
                );
                self.default_zone
            }
        }
    }

    /// Returns the calendar day of `instant` for a course.
    pub fn local_date(&self, course: Option<&Course>, instant: DateTime<Utc>) -> NaiveDate {
        to_local_date(instant, self.zone_for(course))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_local_date_crosses_midnight_in_zone() {
        // 03:30 UTC is still the previous evening in Mazatlán (UTC-7)
        let instant = Utc.with_ymd_and_hms(2024, 11, 6, 3, 30, 0).unwrap();

        let zone = parse_zone("America/Mazatlan").unwrap();
        assert_eq!(
            to_local_date(instant, zone),
            NaiveDate::from_ymd_opt(2024, 11, 5).unwrap()
        );
        assert_eq!(
            to_local_date(instant, chrono_tz::UTC),
            NaiveDate::from_ymd_opt(2024, 11, 6).unwrap()
        );
    }

    #[test]
    fn test_local_date_is_stable_for_same_instant() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 10, 6, 59, 59).unwrap();
        let zone = parse_zone("America/Mazatlan").unwrap();

        let first = to_local_date(instant, zone);
        let second = to_local_date(instant, zone);
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_zone_rejects_unknown_names() {
        assert!(parse_zone("Mars/Olympus_Mons").is_err());
        assert!(parse_zone(" Europe/Madrid ").is_ok());
    }

    #[test]
    fn test_course_override_and_fallback() {
        let policy = ZonePolicy::from_name("America/Mazatlan").unwrap();
        let madrid = Course::new("Math", "A", "2024-2025").with_time_zone("Europe/Madrid");
        let broken = Course::new("Math", "A", "2024-2025").with_time_zone("Nowhere/City");
        let plain = Course::new("Math", "A", "2024-2025");

        assert_eq!(policy.zone_for(Some(&madrid)), chrono_tz::Europe::Madrid);
        assert_eq!(policy.zone_for(Some(&broken)), chrono_tz::America::Mazatlan);
        assert_eq!(policy.zone_for(Some(&plain)), chrono_tz::America::Mazatlan);
        assert_eq!(policy.zone_for(None), chrono_tz::America::Mazatlan);
    }
}
