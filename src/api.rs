use std::sync::Arc;

use axum::{
    extract::{FromRequest, Path, Query, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::classifier::SpamClassifier;
use crate::config::AppConfig;
use crate::corpus::{Corpus, Label};
use crate::lexicon::{LexicalResource, Thesaurus};
use crate::metrics::Metrics;
use crate::paraphrase::ParaphraseGenerator;
use crate::rewriter::AdversarialRewriter;
use crate::store::{IdSequence, MessageStore};

#[derive(Clone)]
pub struct AppState {
    pub rewriter: Arc<AdversarialRewriter>,
    pub store: Arc<MessageStore>,
}

impl AppState {
    pub fn new(rewriter: AdversarialRewriter, store: MessageStore) -> Self {
        Self {
            rewriter: Arc::new(rewriter),
            store: Arc::new(store),
        }
    }

    /// Load corpus + thesaurus, train the classifier, start an empty store.
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let corpus = Corpus::load(&cfg.corpus_path)?;
        let classifier = SpamClassifier::with_alpha(&corpus, cfg.alpha)?;

        let thesaurus = match &cfg.thesaurus_path {
            Some(p) => Thesaurus::load(p)?,
            None => Thesaurus::builtin()?,
        };
        let lexicon: Arc<dyn LexicalResource> = Arc::new(thesaurus);

        let rewriter = AdversarialRewriter::new(
            Arc::new(classifier),
            ParaphraseGenerator::from_shared(lexicon),
        )
        .with_default_max_variants(cfg.default_max_variants);

        info!(
            target: "api",
            vocabulary = corpus.vocabulary().len(),
            rows = corpus.len(),
            "spam model ready"
        );
        Ok(Self::new(rewriter, MessageStore::new(IdSequence::new())))
    }
}

/// Build the whole service from config: state, routes and (optionally) `/metrics`.
pub fn app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let state = AppState::from_config(cfg)?;
    let mut router = router(state);
    if cfg.metrics {
        let metrics = Metrics::init()?;
        router = router.merge(metrics.router());
    }
    Ok(router)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/spam", post(create_spam))
        .route("/spam/{id}", get(get_spam))
        .route("/spam/{id}/ham", get(get_ham))
        .route("/ham/{id}", get(get_ham))
        .route("/classify", post(classify))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    MissingContent,
    SpamNotFound(String),
    HamNotFound(String),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingContent => (
                StatusCode::BAD_REQUEST,
                "Content field is not specified".to_string(),
            ),
            ApiError::SpamNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Spam {id} doesn't exist"))
            }
            ApiError::HamNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Ham {id} doesn't exist"))
            }
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}

#[derive(Deserialize)]
struct ContentReq {
    #[serde(default)]
    content: Option<String>,
}

/// `content` field from either a JSON or an urlencoded form body.
/// Any body that does not yield one is a missing-content error.
struct ContentBody(String);

impl<S> FromRequest<S> for ContentBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        let body = if is_form {
            Form::<ContentReq>::from_request(req, state)
                .await
                .map(|Form(b)| b)
                .ok()
        } else {
            Json::<ContentReq>::from_request(req, state)
                .await
                .map(|Json(b)| b)
                .ok()
        };

        body.and_then(|b| b.content)
            .map(ContentBody)
            .ok_or(ApiError::MissingContent)
    }
}

#[derive(Serialize)]
struct StoredMessage {
    id: String,
    content: String,
}

async fn create_spam(
    State(state): State<AppState>,
    ContentBody(content): ContentBody,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.store.add(content.clone());
    let location = format!("/spam/{id}");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(StoredMessage { id, content }),
    ))
}

async fn get_spam(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredMessage>, ApiError> {
    let content = state
        .store
        .get(&id)
        .ok_or_else(|| ApiError::SpamNotFound(id.clone()))?;
    Ok(Json(StoredMessage { id, content }))
}

#[derive(Deserialize)]
struct HamQuery {
    #[serde(default)]
    max_variants: Option<usize>,
}

#[derive(Serialize)]
struct HamResp {
    content: String,
    success: bool,
}

async fn get_ham(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<HamQuery>,
) -> Result<Json<HamResp>, ApiError> {
    let message = state
        .store
        .get(&id)
        .ok_or_else(|| ApiError::HamNotFound(id.clone()))?;
    let out = state.rewriter.rewrite(&message, q.max_variants);
    Ok(Json(HamResp {
        content: out.output,
        success: out.succeeded,
    }))
}

#[derive(Serialize)]
struct ClassifyResp {
    label: Label,
    log_likelihood_spam: f64,
    log_likelihood_ham: f64,
}

async fn classify(
    State(state): State<AppState>,
    ContentBody(content): ContentBody,
) -> Result<Json<ClassifyResp>, ApiError> {
    let c = state.rewriter.classify_text(&content);
    Ok(Json(ClassifyResp {
        label: c.label,
        log_likelihood_spam: c.log_likelihood_spam,
        log_likelihood_ham: c.log_likelihood_ham,
    }))
}
