use crate::hydrogen::h2_system_utils::ValidationError;

/// Hourly availability of wind and solar generation per kW of installed capacity.
///
/// The wind series is stored already derated. Both series are immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RenewableProfiles {
    solar: Vec<f64>,
    wind: Vec<f64>,
}

/// Borrowed view of the first `hours` values of both profiles.
#[derive(Debug, Clone, Copy)]
pub struct ProfileWindow<'a> {
    pub solar: &'a [f64],
    pub wind: &'a [f64],
}

impl ProfileWindow<'_> {
    pub fn hours(&self) -> usize {
        self.solar.len()
    }
}

impl RenewableProfiles {
    /// Wraps two series whose wind values are already derated.
    pub fn new(solar: Vec<f64>, wind: Vec<f64>) -> Self {
        Self { solar, wind }
    }

    /// Builds profiles from raw wind data, applying the wind derating factor.
    pub fn from_raw(solar: Vec<f64>, mut raw_wind: Vec<f64>, wind_derating: f64) -> Self {
        raw_wind.iter_mut().for_each(|value| *value *= wind_derating);
        Self {
            solar,
            wind: raw_wind,
        }
    }

    /// Constant profiles over `hours`, mainly for scenarios without measured data.
    pub fn flat(hours: usize, solar: f64, wind: f64) -> Self {
        Self {
            solar: vec![solar; hours],
            wind: vec![wind; hours],
        }
    }

    pub fn solar(&self) -> &[f64] {
        &self.solar
    }

    pub fn wind(&self) -> &[f64] {
        &self.wind
    }

    /// Truncates both series to the horizon after checking length and values.
    pub fn window(&self, horizon: usize) -> Result<ProfileWindow<'_>, ValidationError> {
        if horizon == 0 {
            return Err(ValidationError::EmptyHorizon);
        }

        for (profile, series) in [("solar", &self.solar), ("wind", &self.wind)] {
            if series.len() < horizon {
                return Err(ValidationError::ProfileTooShort {
                    profile,
                    len: series.len(),
                    horizon,
                });
            }
            if let Some((hour, &value)) = series[..horizon]
                .iter()
                .enumerate()
                .find(|(_, value)| !(value.is_finite() && **value >= 0.0))
            {
                return Err(ValidationError::InvalidProfileValue {
                    profile,
                    hour,
                    value,
                });
            }
        }

        Ok(ProfileWindow {
            solar: &self.solar[..horizon],
            wind: &self.wind[..horizon],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_applies_derating() {
        let profiles = RenewableProfiles::from_raw(vec![0.5, 0.5], vec![1.0, 0.5], 0.8);
        assert_eq!(profiles.wind(), &[0.8, 0.4]);
        assert_eq!(profiles.solar(), &[0.5, 0.5]);
    }

    #[test]
    fn test_window_truncates() {
        let profiles = RenewableProfiles::flat(10, 0.3, 0.6);
        let window = profiles.window(4).unwrap();
        assert_eq!(window.hours(), 4);
        assert_eq!(window.solar, &[0.3; 4]);
        assert_eq!(window.wind, &[0.6; 4]);
    }

    #[test]
    fn test_window_rejects_short_profile() {
        let profiles = RenewableProfiles::new(vec![1.0; 24], vec![1.0; 12]);
        assert_eq!(
            profiles.window(24).unwrap_err(),
            ValidationError::ProfileTooShort {
                profile: "wind",
                len: 12,
                horizon: 24,
            }
        );
    }

    #[test]
    fn test_window_rejects_invalid_values() {
        let mut solar = vec![0.5; 24];
        solar[7] = -0.1;
        let profiles = RenewableProfiles::new(solar, vec![0.5; 24]);
        assert!(matches!(
            profiles.window(24),
            Err(ValidationError::InvalidProfileValue {
                profile: "solar",
                hour: 7,
                ..
            })
        ));

        let mut wind = vec![0.5; 24];
        wind[3] = f64::NAN;
        let profiles = RenewableProfiles::new(vec![0.5; 24], wind);
        assert!(matches!(
            profiles.window(24),
            Err(ValidationError::InvalidProfileValue {
                profile: "wind",
                hour: 3,
                ..
            })
        ));

        // Values past the horizon are not inspected
        let mut solar = vec![0.5; 24];
        solar[20] = -1.0;
        let profiles = RenewableProfiles::new(solar, vec![0.5; 24]);
        assert!(profiles.window(12).is_ok());
    }

    #[test]
    fn test_window_rejects_empty_horizon() {
        let profiles = RenewableProfiles::flat(3, 1.0, 1.0);
        assert_eq!(profiles.window(0).unwrap_err(), ValidationError::EmptyHorizon);
    }
}
