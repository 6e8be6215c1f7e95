//! Typed client for the OurSky Satellite Data Access (SDA) API.
//!
//! [`SdaClient`] wraps the REST endpoints with bearer authentication injected
//! on every request; [`ObservationService`] chains them into the usual
//! target → forecast → tasking → results workflow.

pub mod clients;
pub mod config;
pub mod domain;
pub mod errors;
pub mod search;
pub mod services;
pub mod utils;

pub use clients::SdaClient;
pub use config::SdaConfig;
pub use domain::{
    ImageSet, ImageSetNode, NodeProperties, ObservationPotential, ObservationSequenceResult,
    OrbitType, OrganizationTarget, PipelineReport, SatelliteTarget, SearchInstruction, SearchStep,
    SequenceResults, Tdm, TrackingType,
};
pub use errors::{SdaError, SdaResult};
pub use search::SearchPattern;
pub use services::{ObservationService, PipelineRequest};
