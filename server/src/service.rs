use auth::{AuthErr, CredentialErr, CredentialStore, Identity, TokenService};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use model::{Feature, InferenceEngine, ModelErr, ModelInfo, StudentProfile, validate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    ApiErr, Result, ServiceConfig,
    interpretation::{ConfidenceLevel, interpret},
    summary::{BatchSummary, round4},
};

const SERVICE_NAME: &str = "admission_prediction_api";
const BEARER: &str = "Bearer";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// The answer to a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginGrant {
    pub status: &'static str,
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
    pub user: Identity,
}

/// A single scored profile.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<usize>,
    /// Clamped chance rounded to 4 decimals.
    pub chance_of_admit: f64,
    pub confidence_level: ConfidenceLevel,
    pub interpretation: &'static str,
    pub input_data: StudentProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub prediction: Prediction,
    pub timestamp: DateTime<Utc>,
}

/// Why one element of a batch was not scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchError {
    pub student_id: usize,
    pub kind: &'static str,
    /// The offending field, for profile validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub status: &'static str,
    pub predictions: Vec<Prediction>,
    pub summary: BatchSummary,
    pub errors: Option<Vec<BatchError>>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    pub model_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_error: Option<String>,
}

/// Authenticates callers and scores student profiles.
///
/// Built once at startup and shared read-only between requests.
pub struct AdmissionService {
    credentials: CredentialStore,
    tokens: TokenService,
    engine: std::result::Result<InferenceEngine, String>,
}

impl AdmissionService {
    /// Creates a new `AdmissionService`.
    ///
    /// # Arguments
    /// * `credentials` - The accounts allowed to log in.
    /// * `tokens` - Issues and verifies session tokens.
    /// * `engine` - The loaded model, or the reason it could not be loaded.
    pub fn new(
        credentials: CredentialStore,
        tokens: TokenService,
        engine: std::result::Result<InferenceEngine, String>,
    ) -> Self {
        Self {
            credentials,
            tokens,
            engine,
        }
    }

    /// Builds the service described by `config`.
    ///
    /// A model that fails to load leaves the service degraded, it still
    /// answers health checks and logins.
    ///
    /// # Errors
    /// Returns a `CredentialErr` if the credential table or the signing key
    /// cannot be built.
    pub fn from_config(config: &ServiceConfig) -> std::result::Result<Self, CredentialErr> {
        let credentials = match &config.credentials_path {
            Some(path) => {
                let store = CredentialStore::from_path(path)?;
                info!(users = store.len(); "credentials loaded from {}", path.display());
                store
            }
            None => {
                warn!("CREDENTIALS_PATH is not set, using the built-in demo accounts");
                CredentialStore::with_defaults()?
            }
        };

        let tokens = TokenService::new(config.secret.as_bytes(), config.token_ttl())?;

        let engine = InferenceEngine::load(&config.model_path).map_err(|e: ModelErr| {
            error!(
                "failed to load model from {}: {e}, starting degraded",
                config.model_path.display()
            );
            e.to_string()
        });

        Ok(Self::new(credentials, tokens, engine))
    }

    pub fn model_loaded(&self) -> bool {
        self.engine.is_ok()
    }

    /// Exchanges a username and password for a session token.
    ///
    /// # Errors
    /// `BadRequest` if either is missing or empty, `InvalidCredentials` if
    /// the pair is not valid.
    pub fn login(&self, request: &LoginRequest) -> Result<LoginGrant> {
        let (Some(username), Some(password)) = (
            request.username.as_deref().filter(|s| !s.is_empty()),
            request.password.as_deref().filter(|s| !s.is_empty()),
        ) else {
            return Err(ApiErr::BadRequest("Username and password required".into()));
        };

        let identity = self
            .credentials
            .authenticate(username, password)
            .ok_or(AuthErr::InvalidCredentials)?;

        let issued = self.tokens.issue(&identity);
        info!("issued token for {username}");

        Ok(LoginGrant {
            status: "success",
            access_token: issued.token,
            token_type: "bearer",
            expires_in: self.tokens.ttl().num_seconds(),
            expires_at: issued.expires_at,
            user: identity,
        })
    }

    /// Verifies the value of an `Authorization` header.
    ///
    /// # Arguments
    /// * `header` - The header value, `None` if the request had none.
    ///
    /// # Returns
    /// The identity the bearer token was issued to.
    ///
    /// # Errors
    /// Returns the `AuthErr` explaining why the caller is not authenticated.
    pub fn authorize(&self, header: Option<&str>) -> Result<Identity> {
        let Some(header) = header.map(str::trim).filter(|h| !h.is_empty()) else {
            return Err(AuthErr::TokenMissing.into());
        };

        let token = match header.split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case(BEARER) => token,
            _ => return Err(AuthErr::TokenMalformed.into()),
        };

        self.tokens.verify(Some(token)).map_err(|e| {
            warn!("rejected request: {e}");
            ApiErr::from(e)
        })
    }

    /// Scores a single profile.
    ///
    /// `body` is either the profile itself or `{"student_data": {...}}`.
    ///
    /// # Errors
    /// `ModelUnavailable` when no model is loaded, a `Validation` error for a
    /// bad profile and `Internal` if inference fails.
    pub fn predict(&self, body: &Value) -> Result<PredictionResponse> {
        let engine = self.engine()?;
        let raw = body.get("student_data").unwrap_or(body);
        let prediction = score(engine, raw, None)?;

        Ok(PredictionResponse {
            status: "success",
            prediction,
            timestamp: Utc::now(),
        })
    }

    /// Scores every profile of a batch independently.
    ///
    /// Bad elements are reported in `errors` without affecting the others.
    /// Student ids are 1-based positions in `students`.
    ///
    /// # Errors
    /// `ModelUnavailable` when no model is loaded and `BadRequest` for an
    /// empty batch.
    pub fn predict_batch(&self, students: &[Value]) -> Result<BatchResponse> {
        let engine = self.engine()?;
        if students.is_empty() {
            return Err(ApiErr::BadRequest("Students data (list) required".into()));
        }

        let outcomes: Vec<_> = students
            .par_iter()
            .enumerate()
            .map(|(i, raw)| score(engine, raw, Some(i + 1)))
            .collect();

        let mut predictions = Vec::with_capacity(outcomes.len());
        let mut errors = Vec::new();

        for (i, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(prediction) => predictions.push(prediction),
                Err(e) => errors.push(BatchError {
                    student_id: i + 1,
                    kind: e.kind(),
                    field: match &e {
                        ApiErr::Validation(reason) => reason.field().map(Feature::name),
                        _ => None,
                    },
                    message: e.to_string(),
                }),
            }
        }

        let scored: Vec<_> = predictions
            .iter()
            .map(|p| (p.chance_of_admit, p.confidence_level))
            .collect();
        let summary = BatchSummary::new(students.len(), &scored);

        info!(
            total = students.len(),
            failed = errors.len();
            "batch scored"
        );

        Ok(BatchResponse {
            status: "success",
            predictions,
            summary,
            errors: (!errors.is_empty()).then_some(errors),
            timestamp: Utc::now(),
        })
    }

    pub fn health(&self) -> HealthReport {
        let (status, model, model_error) = match &self.engine {
            Ok(engine) => ("healthy", Some(engine.info().clone()), None),
            Err(reason) => ("degraded", None, Some(reason.clone())),
        };

        HealthReport {
            status,
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
            model_loaded: model.is_some(),
            model,
            model_error,
        }
    }

    fn engine(&self) -> Result<&InferenceEngine> {
        self.engine
            .as_ref()
            .map_err(|reason| ApiErr::ModelUnavailable(reason.clone()))
    }
}

/// Extracts the `students` list of a batch request body.
///
/// # Errors
/// Returns `BadRequest` if `students` is missing or not a list.
pub fn batch_students(body: &Value) -> Result<&[Value]> {
    body.get("students")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| ApiErr::BadRequest("Students data (list) required".into()))
}

fn score(engine: &InferenceEngine, raw: &Value, student_id: Option<usize>) -> Result<Prediction> {
    let profile = validate(raw)?;
    let chance = engine.predict(&profile).map_err(|e| {
        error!("inference failed: {e}");
        ApiErr::Internal(e.to_string())
    })?;

    let (confidence_level, interpretation) = interpret(chance);

    Ok(Prediction {
        student_id,
        chance_of_admit: round4(chance),
        confidence_level,
        interpretation,
        input_data: profile,
    })
}
