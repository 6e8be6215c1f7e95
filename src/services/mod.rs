/// Observation workflows built on the SDA client
use crate::clients::SdaClient;
use crate::domain::{
    ImageSetNode, ObservationPotential, ObservationSequenceResult, OrbitType, OrganizationTarget,
    PipelineReport, SatelliteTarget, SearchInstruction, SequenceResults, TrackingType,
};
use crate::errors::{SdaError, SdaResult};
use crate::search::{steps_for_window, SearchPattern};
use crate::utils::{is_truncated_window, search_offset_meters, sort_by_first_observable};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Results per page of the observation sequence result endpoint
pub const OSR_PAGE_SIZE: usize = 5;

/// Input of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub norad_id: String,
    pub orbit_type: Option<OrbitType>,
    pub until: DateTime<Utc>,
    /// Create an organization target for the found satellite
    pub submit: bool,
    /// Fail with `NotYetAvailable` instead of reporting pending results
    pub require_results: bool,
}

/// Target lookup, forecast, tasking and result retrieval
pub struct ObservationService {
    client: SdaClient,
}

impl ObservationService {
    pub fn new(client: SdaClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &SdaClient {
        &self.client
    }

    /// First target matching the NORAD id
    pub async fn find_target(
        &self,
        norad_id: &str,
        orbit_type: Option<OrbitType>,
    ) -> SdaResult<SatelliteTarget> {
        let targets = self
            .client
            .list_satellite_targets(norad_id, orbit_type)
            .await?;
        targets
            .into_iter()
            .next()
            .ok_or_else(|| SdaError::EmptyResult(format!("no target found for NORAD id {}", norad_id)))
    }

    /// Observation windows sorted by first observable time; may be empty
    pub async fn upcoming_windows(
        &self,
        target_id: &str,
        until: DateTime<Utc>,
    ) -> SdaResult<Vec<ObservationPotential>> {
        let mut windows = self
            .client
            .list_observation_potentials(target_id, until)
            .await?;
        sort_by_first_observable(&mut windows);
        Ok(windows)
    }

    /// Like [`upcoming_windows`](Self::upcoming_windows) but an empty forecast is an error
    pub async fn require_upcoming_windows(
        &self,
        target_id: &str,
        until: DateTime<Utc>,
    ) -> SdaResult<Vec<ObservationPotential>> {
        let windows = self.upcoming_windows(target_id, until).await?;
        if windows.is_empty() {
            return Err(SdaError::EmptyResult(format!(
                "no upcoming observation windows found for target ID {}",
                target_id
            )));
        }
        Ok(windows)
    }

    pub async fn submit_task(&self, target_id: &str) -> SdaResult<OrganizationTarget> {
        let task = self.client.create_organization_target(target_id).await?;
        info!("Created organization target {} for {}", task.id, target_id);
        Ok(task)
    }

    pub async fn sequence_results(&self, target_id: &str) -> SdaResult<SequenceResults> {
        let results = self
            .client
            .list_observation_sequence_results(target_id, None)
            .await?;
        Ok(SequenceResults::from_results(results))
    }

    /// Node properties for every image set, in result order
    pub async fn resolve_nodes(
        &self,
        results: &[ObservationSequenceResult],
    ) -> SdaResult<Vec<ImageSetNode>> {
        let mut nodes = Vec::new();
        for result in results {
            for image_set in &result.image_sets {
                let node = self.client.get_node_properties(&image_set.node_id).await?;
                nodes.push(ImageSetNode {
                    image_set: image_set.clone(),
                    node,
                });
            }
        }
        Ok(nodes)
    }

    /// Target → windows → optional task → results → nodes, each step awaiting the previous
    pub async fn run_pipeline(&self, request: &PipelineRequest) -> SdaResult<PipelineReport> {
        let target = self
            .find_target(&request.norad_id, request.orbit_type)
            .await?;
        info!("Found target {} for NORAD {}", target.id, request.norad_id);

        let windows = self
            .require_upcoming_windows(&target.id, request.until)
            .await?;
        info!("{} upcoming observation windows", windows.len());

        let task = if request.submit {
            Some(self.submit_task(&target.id).await?)
        } else {
            None
        };

        let mut results = self.sequence_results(&target.id).await?;
        if request.require_results {
            results = SequenceResults::Ready(results.into_ready(&target.id)?);
        }
        let nodes = match &results {
            SequenceResults::Pending => {
                info!("No observation sequence results yet for {}", target.id);
                Vec::new()
            }
            SequenceResults::Ready(results) => self.resolve_nodes(results).await?,
        };

        Ok(PipelineReport {
            target,
            windows,
            task,
            results,
            nodes,
        })
    }

    /// All results created at or after `from`, following the `after` cursor page by page
    pub async fn fetch_results_since(
        &self,
        target_id: &str,
        from: DateTime<Utc>,
    ) -> SdaResult<Vec<ObservationSequenceResult>> {
        let mut collected = Vec::new();
        let mut after = None;

        loop {
            let batch = self
                .client
                .list_observation_sequence_results(target_id, after)
                .await?;
            let cursor = batch.last().map(|r| r.created_at);

            let before = collected.len();
            collected.extend(batch.into_iter().filter(|r| r.created_at >= from));
            let accepted = collected.len() - before;
            info!("Fetched {} additional OSRs", accepted);

            if accepted != OSR_PAGE_SIZE {
                break;
            }
            after = cursor;
        }

        Ok(collected)
    }

    /// One search instruction per usable observation window of the target.
    ///
    /// The search offset comes from the staleness of the target's TLE at `now`.
    pub async fn plan_search(
        &self,
        target_id: &str,
        pattern: SearchPattern,
        tracking_type: TrackingType,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> SdaResult<Vec<SearchInstruction>> {
        let target = self.client.get_satellite_target(target_id).await?;
        let tle_epoch = target.tle_epoch.ok_or_else(|| {
            SdaError::InvalidInput(format!("target {} has no TLE epoch", target_id))
        })?;
        let offset = search_offset_meters(target.orbit_type, tle_epoch, now);
        info!(
            "Target {} ({}): search offset {:.2} m",
            target_id,
            target.orbit_type.map(|o| o.as_str()).unwrap_or("unknown orbit"),
            offset
        );

        let windows: Vec<ObservationPotential> = self
            .upcoming_windows(target_id, until)
            .await?
            .into_iter()
            .filter(|w| !is_truncated_window(w))
            .collect();

        let mut instructions = Vec::new();
        for window in &windows {
            let steps = steps_for_window(pattern, offset, window);
            if steps.is_empty() {
                warn!(
                    "Window starting {} is too short for a {} search",
                    window.first_observable_time, pattern
                );
                continue;
            }
            instructions.push(SearchInstruction {
                steps,
                target_id: target_id.to_string(),
                tracking_type,
            });
        }
        Ok(instructions)
    }

    /// Submit planned search instructions in order, returning how many were accepted
    pub async fn submit_search(&self, instructions: &[SearchInstruction]) -> SdaResult<usize> {
        let mut submitted = 0;
        for instruction in instructions {
            self.client.create_search_instruction(instruction).await?;
            submitted += 1;
            info!(
                "Scheduled {} step search for target {}",
                instruction.steps.len(),
                instruction.target_id
            );
        }
        Ok(submitted)
    }
}

/// Write one result as pretty JSON to `<dir>/<norad_id>_<created_at>.json`
pub fn write_result(
    dir: &Path,
    norad_id: &str,
    result: &ObservationSequenceResult,
) -> SdaResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let created = result
        .created_at
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    let path = dir.join(format!("{}_{}.json", norad_id, created));
    fs::write(&path, serde_json::to_string_pretty(result)?)?;
    Ok(path)
}
