/// Domain models for the SDA service
use crate::errors::{SdaError, SdaResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Orbit classification used by the target filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrbitType {
    Leo,
    Meo,
    Heo,
    Geo,
    Geosynchronous,
    Geostationary,
    #[serde(other)]
    Other,
}

impl OrbitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrbitType::Leo => "LEO",
            OrbitType::Meo => "MEO",
            OrbitType::Heo => "HEO",
            OrbitType::Geo => "GEO",
            OrbitType::Geosynchronous => "GEOSYNCHRONOUS",
            OrbitType::Geostationary => "GEOSTATIONARY",
            OrbitType::Other => "OTHER",
        }
    }
}

impl fmt::Display for OrbitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrbitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LEO" => Ok(OrbitType::Leo),
            "MEO" => Ok(OrbitType::Meo),
            "HEO" => Ok(OrbitType::Heo),
            "GEO" => Ok(OrbitType::Geo),
            "GEOSYNCHRONOUS" => Ok(OrbitType::Geosynchronous),
            "GEOSTATIONARY" => Ok(OrbitType::Geostationary),
            other => Err(format!("unknown orbit type: {}", other)),
        }
    }
}

/// Satellite identified for potential observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatelliteTarget {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub norad_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit_type: Option<OrbitType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tle_epoch: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// Envelope of the target list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SatelliteTargetList {
    #[serde(default)]
    pub targets: Vec<SatelliteTarget>,
}

/// Forecast window during which a target is observable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationPotential {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satellite_target_id: Option<String>,
    pub first_observable_time: DateTime<Utc>,
    pub last_observable_time: DateTime<Utc>,
}

impl ObservationPotential {
    pub fn duration(&self) -> chrono::Duration {
        self.last_observable_time - self.first_observable_time
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationTargetRequest {
    pub satellite_target_id: String,
}

/// Observation task submitted by this organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationTarget {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satellite_target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Output artifact of a completed observation task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationSequenceResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub image_sets: Vec<ImageSet>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub node_id: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// Ground asset referenced by an image set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// Tracking data message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tdm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingType {
    Sidereal,
    TargetRate,
}

/// One pointing offset held for the duration of the step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStep {
    pub along_track_offset_meters: f64,
    pub cross_track_offset_meters: f64,
    pub radial_offset_meters: f64,
    #[serde(serialize_with = "millis_z")]
    pub start_time: DateTime<Utc>,
    #[serde(serialize_with = "millis_z")]
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInstruction {
    pub steps: Vec<SearchStep>,
    pub target_id: String,
    pub tracking_type: TrackingType,
}

fn millis_z<S: Serializer>(t: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&t.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// State of the observation sequence results for a target
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceResults {
    /// The task has not produced output yet
    Pending,
    Ready(Vec<ObservationSequenceResult>),
}

impl SequenceResults {
    pub fn from_results(results: Vec<ObservationSequenceResult>) -> Self {
        if results.is_empty() {
            SequenceResults::Pending
        } else {
            SequenceResults::Ready(results)
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SequenceResults::Pending)
    }

    /// Results for callers that cannot proceed without them
    pub fn into_ready(self, target_id: &str) -> SdaResult<Vec<ObservationSequenceResult>> {
        match self {
            SequenceResults::Pending => Err(SdaError::NotYetAvailable(format!(
                "no observation sequence results for {} yet",
                target_id
            ))),
            SequenceResults::Ready(results) => Ok(results),
        }
    }
}

/// Node properties resolved for one image set
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSetNode {
    pub image_set: ImageSet,
    pub node: NodeProperties,
}

/// Everything one run of the observation pipeline produced
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub target: SatelliteTarget,
    pub windows: Vec<ObservationPotential>,
    pub task: Option<OrganizationTarget>,
    pub results: SequenceResults,
    pub nodes: Vec<ImageSetNode>,
}
