//! Search instruction step generation.
//!
//! A search walks the telescope through a sequence of along/cross track offsets
//! around the predicted position. Each step is held for ten seconds with a ten
//! second gap before the next one, and the whole search fits in the first
//! 4m59s of the observation window.

use crate::domain::{ObservationPotential, SearchStep};
use crate::errors::SdaError;
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::str::FromStr;

pub const STEP_SECONDS: i64 = 10;
pub const INTERVAL_SECONDS: i64 = 10;
pub const MAX_SEARCH_SECONDS: i64 = 4 * 60 + 59;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SearchPattern {
    #[value(alias = "flyingv")]
    FlyingV,
    Raster,
    Spiral,
    Concentric,
    #[value(alias = "movealongtrack")]
    MoveAlongTrack,
    #[value(alias = "stayontarget")]
    StayOnTarget,
    #[value(alias = "onestep")]
    OneStep,
}

impl SearchPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchPattern::FlyingV => "flyingv",
            SearchPattern::Raster => "raster",
            SearchPattern::Spiral => "spiral",
            SearchPattern::Concentric => "concentric",
            SearchPattern::MoveAlongTrack => "movealongtrack",
            SearchPattern::StayOnTarget => "stayontarget",
            SearchPattern::OneStep => "onestep",
        }
    }
}

impl fmt::Display for SearchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchPattern {
    type Err = SdaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "flyingv" => Ok(SearchPattern::FlyingV),
            "raster" => Ok(SearchPattern::Raster),
            "spiral" => Ok(SearchPattern::Spiral),
            "concentric" => Ok(SearchPattern::Concentric),
            "movealongtrack" => Ok(SearchPattern::MoveAlongTrack),
            "stayontarget" => Ok(SearchPattern::StayOnTarget),
            "onestep" => Ok(SearchPattern::OneStep),
            _ => Err(SdaError::InvalidInput(format!("invalid search type: {}", s))),
        }
    }
}

/// Accumulates steps until the next one would overrun the search end
struct StepBuilder {
    steps: Vec<SearchStep>,
    cursor: DateTime<Utc>,
    end: DateTime<Utc>,
    offset: f64,
}

impl StepBuilder {
    fn new(start: DateTime<Utc>, window_end: DateTime<Utc>, offset: f64) -> Self {
        let end = (start + Duration::seconds(MAX_SEARCH_SECONDS)).min(window_end);
        Self {
            steps: Vec::new(),
            cursor: start,
            end,
            offset,
        }
    }

    /// Add a step at multiples of the offset; false once the search is out of time
    fn push(&mut self, along: f64, cross: f64) -> bool {
        let step_end = self.cursor + Duration::seconds(STEP_SECONDS);
        if step_end > self.end {
            return false;
        }
        self.steps.push(SearchStep {
            along_track_offset_meters: along * self.offset,
            cross_track_offset_meters: cross * self.offset,
            radial_offset_meters: 0.0,
            start_time: self.cursor,
            end_time: step_end,
        });
        self.cursor = step_end + Duration::seconds(INTERVAL_SECONDS);
        true
    }
}

/// Build the steps of `pattern` for an observation window.
///
/// `offset` is the along/cross track offset unit in meters.
pub fn build_steps(
    pattern: SearchPattern,
    offset: f64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<SearchStep> {
    let mut b = StepBuilder::new(start, end, offset);

    match pattern {
        SearchPattern::FlyingV => {
            for (along, cross) in [(0.0, 0.0), (-1.0, 1.0), (2.0, 0.0), (-2.0, -1.0), (1.0, 1.0)] {
                if !b.push(along, cross) {
                    break;
                }
            }
        }
        SearchPattern::Raster => {
            for i in 0..10 {
                let i = f64::from(i);
                if !b.push(i, 1.0) || !b.push(i, -1.0) {
                    break;
                }
            }
        }
        SearchPattern::Spiral => {
            for i in 1..=5 {
                let i = f64::from(i);
                if !b.push(i, i) {
                    break;
                }
            }
        }
        SearchPattern::Concentric => {
            let directions = [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)];
            for (i, (along, cross)) in directions.into_iter().enumerate() {
                let ring = (i + 1) as f64;
                if !b.push(along * ring, cross * ring) {
                    break;
                }
            }
        }
        SearchPattern::MoveAlongTrack => {
            // flips between 1 and -2 until the search runs out of time
            let mut j: i32 = 1;
            while j.abs() < 30 {
                if !b.push(f64::from(j), 0.0) {
                    break;
                }
                j = -(j + 1);
            }
        }
        SearchPattern::StayOnTarget => {
            let total = MAX_SEARCH_SECONDS / (STEP_SECONDS + INTERVAL_SECONDS);
            for _ in 0..total {
                if !b.push(0.0, 0.0) {
                    break;
                }
            }
        }
        SearchPattern::OneStep => {
            b.push(0.0, 0.0);
        }
    }

    b.steps
}

/// Steps for a forecast window, starting at its first observable time
pub fn steps_for_window(
    pattern: SearchPattern,
    offset: f64,
    window: &ObservationPotential,
) -> Vec<SearchStep> {
    build_steps(
        pattern,
        offset,
        window.first_observable_time,
        window.last_observable_time,
    )
}
