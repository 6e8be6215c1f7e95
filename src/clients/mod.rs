/// SDA REST API client
use crate::config::SdaConfig;
use crate::domain::{
    CreateOrganizationTargetRequest, NodeProperties, ObservationPotential,
    ObservationSequenceResult, OrbitType, OrganizationTarget, SatelliteTarget,
    SatelliteTargetList, SearchInstruction, Tdm,
};
use crate::errors::{SdaError, SdaResult};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

/// HTTP client wrapper with bearer authentication on every request
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &SdaConfig) -> SdaResult<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_token))
            .map_err(|_| SdaError::Configuration("API token is not a valid header value".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .user_agent(concat!("oursky-sda/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| SdaError::Configuration(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn get_client(&self) -> &Client {
        &self.client
    }
}

/// Typed operations over the OurSky SDA API
pub struct SdaClient {
    http_client: HttpClient,
    base_url: String,
}

impl SdaClient {
    pub fn new(config: &SdaConfig) -> SdaResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http_client.get_client().get(self.url(path))
    }

    /// List targets matching a NORAD catalog number, in the order the service returns them
    pub async fn list_satellite_targets(
        &self,
        norad_id: &str,
        orbit_type: Option<OrbitType>,
    ) -> SdaResult<Vec<SatelliteTarget>> {
        let mut req = self
            .get("/v1/satellite-targets")
            .query(&[("noradId", norad_id)]);

        if let Some(orbit_type) = orbit_type {
            req = req.query(&[("orbitType", orbit_type.as_str())]);
        }

        let list: SatelliteTargetList = send(req).await?;
        debug!("fetched {} targets for NORAD {}", list.targets.len(), norad_id);
        Ok(list.targets)
    }

    /// Fetch one target by its service id
    pub async fn get_satellite_target(&self, id: &str) -> SdaResult<SatelliteTarget> {
        let req = self.get("/v1/satellite-target").query(&[("id", id)]);
        send(req).await
    }

    /// Observation windows for a target up to `until` (unordered)
    pub async fn list_observation_potentials(
        &self,
        satellite_target_id: &str,
        until: DateTime<Utc>,
    ) -> SdaResult<Vec<ObservationPotential>> {
        let req = self.get("/v1/satellite-target-potentials").query(&[
            ("satelliteTargetId", satellite_target_id.to_string()),
            ("until", timestamp(until)),
        ]);

        let potentials: Vec<ObservationPotential> = send(req).await?;
        debug!(
            "fetched {} potentials for target {}",
            potentials.len(),
            satellite_target_id
        );
        Ok(potentials)
    }

    /// Submit an observation task request. Every call creates a new task.
    pub async fn create_organization_target(
        &self,
        satellite_target_id: &str,
    ) -> SdaResult<OrganizationTarget> {
        let body = CreateOrganizationTargetRequest {
            satellite_target_id: satellite_target_id.to_string(),
        };
        let req = self
            .http_client
            .get_client()
            .post(self.url("/v1/organization-target"))
            .json(&body);
        send(req).await
    }

    /// Observation sequence results for a target, optionally after a cursor.
    ///
    /// An empty list is a normal answer while the task is still pending.
    pub async fn list_observation_sequence_results(
        &self,
        target_id: &str,
        after: Option<DateTime<Utc>>,
    ) -> SdaResult<Vec<ObservationSequenceResult>> {
        let mut req = self
            .get("/v1/observation-sequence-results")
            .query(&[("targetId", target_id)]);

        if let Some(after) = after {
            req = req.query(&[("after", timestamp(after))]);
        }

        send(req).await
    }

    pub async fn get_node_properties(&self, node_id: &str) -> SdaResult<NodeProperties> {
        let req = self.get("/v1/node-properties").query(&[("nodeId", node_id)]);
        send(req).await
    }

    /// Tracking data messages, optionally only those after a timestamp
    pub async fn list_tdms(&self, after: Option<DateTime<Utc>>) -> SdaResult<Vec<Tdm>> {
        let mut req = self.get("/v1/tdms");
        if let Some(after) = after {
            req = req.query(&[("after", timestamp(after))]);
        }
        send(req).await
    }

    pub async fn create_search_instruction(
        &self,
        instruction: &SearchInstruction,
    ) -> SdaResult<serde_json::Value> {
        let req = self
            .http_client
            .get_client()
            .post(self.url("/v1/search-instruction"))
            .json(instruction);
        send(req).await
    }
}

fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Send a request and decode a 2xx JSON body; anything else is a remote call failure
async fn send<T: DeserializeOwned>(req: RequestBuilder) -> SdaResult<T> {
    let resp = req.send().await?;
    let status = resp.status();
    let url = resp.url().path().to_string();

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            format!("{} returned {}", url, status)
        } else {
            format!("{} returned {}: {}", url, status, body.trim())
        };
        return Err(SdaError::remote(Some(status.as_u16()), message));
    }

    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        SdaError::remote(
            Some(status.as_u16()),
            format!("malformed response body from {}: {}", url, e),
        )
    })
}
