use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::TouPeriod;

fn validate_hours(hours: &[u32]) -> Result<(), ValidationError> {
    if hours.iter().any(|h| *h >= 24) {
        return Err(ValidationError::new("hour_out_of_range"));
    }
    Ok(())
}

/// Hour-of-day to time-of-use mapping; unlisted hours are mid-peak
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TouSchedule {
    #[validate(custom(function = "validate_hours"))]
    pub peak_hours: Vec<u32>,
    #[validate(custom(function = "validate_hours"))]
    pub off_peak_hours: Vec<u32>,
}

impl Default for TouSchedule {
    fn default() -> Self {
        Self {
            peak_hours: (16..=20).collect(),
            off_peak_hours: (0..=6).chain(22..=23).collect(),
        }
    }
}

impl TouSchedule {
    pub fn period_for_hour(&self, hour: u32) -> TouPeriod {
        if self.peak_hours.contains(&hour) {
            TouPeriod::Peak
        } else if self.off_peak_hours.contains(&hour) {
            TouPeriod::OffPeak
        } else {
            TouPeriod::MidPeak
        }
    }

    /// Periods for a whole day, indexed by hour
    pub fn day_profile(&self) -> Vec<TouPeriod> {
        (0..24).map(|h| self.period_for_hour(h)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(3, TouPeriod::OffPeak)]
    #[case(7, TouPeriod::MidPeak)]
    #[case(16, TouPeriod::Peak)]
    #[case(20, TouPeriod::Peak)]
    #[case(21, TouPeriod::MidPeak)]
    #[case(23, TouPeriod::OffPeak)]
    fn test_default_schedule(#[case] hour: u32, #[case] expected: TouPeriod) {
        assert_eq!(TouSchedule::default().period_for_hour(hour), expected);
    }

    #[test]
    fn test_day_profile_covers_every_hour() {
        let profile = TouSchedule::default().day_profile();
        assert_eq!(profile.len(), 24);
        assert_eq!(profile.iter().filter(|p| **p == TouPeriod::Peak).count(), 5);
    }

    #[test]
    fn test_rejects_invalid_hours() {
        let schedule = TouSchedule {
            peak_hours: vec![17, 24],
            off_peak_hours: vec![],
        };
        assert!(schedule.validate().is_err());
        assert!(TouSchedule::default().validate().is_ok());
    }
}
