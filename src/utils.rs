/// Utility functions
use crate::domain::{ObservationPotential, OrbitType};
use chrono::{DateTime, Timelike, Utc};

const MAX_STALENESS_DAYS: f64 = 5.0;
const STALENESS_EXPONENT: f64 = 1.5276;

/// TLE age in fractional days at the observation time (negative if the epoch is later)
pub fn tle_age_days(tle_epoch: DateTime<Utc>, obs_time: DateTime<Utc>) -> f64 {
    (obs_time - tle_epoch).num_milliseconds() as f64 / 86_400_000.0
}

/// Expected position error of a propagated TLE, in meters.
///
/// Empirical fit: error grows as `days^1.5276` km, with staleness clamped to 0..=5 days.
pub fn tle_position_error_meters(tle_epoch: DateTime<Utc>, obs_time: DateTime<Utc>) -> f64 {
    let staleness = tle_age_days(tle_epoch, obs_time).clamp(0.0, MAX_STALENESS_DAYS);
    staleness.powf(STALENESS_EXPONENT) * 1000.0
}

/// Fraction of the position error to use as the along/cross track search offset
pub fn offset_fraction(orbit_type: Option<OrbitType>, tle_age_days: f64) -> f64 {
    let table: [f64; 6] = match orbit_type {
        Some(OrbitType::Meo) => [1.0 / 4.0, 1.0 / 3.0, 1.0 / 2.0, 1.0, 2.0, 5.0],
        Some(OrbitType::Geosynchronous) => [1.0 / 4.0, 1.0 / 3.0, 1.0 / 2.0, 3.0 / 4.0, 1.0, 2.0],
        Some(OrbitType::Geostationary) => {
            [1.0 / 5.0, 1.0 / 4.0, 1.0 / 3.0, 1.0 / 2.0, 3.0 / 4.0, 1.0]
        }
        _ => [1.0 / 4.0, 1.0 / 2.0, 1.0, 2.0, 5.0, 10.0],
    };
    let bounds = [1.0, 3.0, 5.0, 7.0, 12.0];

    bounds
        .iter()
        .position(|bound| tle_age_days <= *bound)
        .map(|i| table[i])
        .unwrap_or(table[5])
}

/// Along/cross track offset in meters for a target observed at `obs_time`
pub fn search_offset_meters(
    orbit_type: Option<OrbitType>,
    tle_epoch: DateTime<Utc>,
    obs_time: DateTime<Utc>,
) -> f64 {
    let age = tle_age_days(tle_epoch, obs_time);
    tle_position_error_meters(tle_epoch, obs_time) * offset_fraction(orbit_type, age)
}

/// Windows whose end lands exactly on midnight UTC are cut off by the forecast horizon
pub fn is_truncated_window(potential: &ObservationPotential) -> bool {
    let end = potential.last_observable_time;
    end.hour() == 0 && end.minute() == 0 && end.second() == 0 && end.nanosecond() == 0
}

/// Sort windows by first observable time
pub fn sort_by_first_observable(potentials: &mut [ObservationPotential]) {
    potentials.sort_by_key(|p| p.first_observable_time);
}
