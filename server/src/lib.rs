mod config;
pub mod error;
pub mod http;
mod interpretation;
mod service;
mod summary;

pub use config::{ConfigErr, ServiceConfig};
pub use error::{ApiErr, Result};
pub use interpretation::{ConfidenceLevel, interpret};
pub use service::{
    AdmissionService, BatchError, BatchResponse, HealthReport, LoginGrant, LoginRequest,
    Prediction, PredictionResponse, batch_students,
};
pub use summary::{BatchSummary, ChanceStats, round4};
