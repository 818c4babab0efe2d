use axum::http::header;
use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::catalog::source::CatalogSource;
use crate::catalog::store::{Catalog, CatalogStore};
use crate::cli::datasets::dataset_summary;
use crate::cli::ServeArgs;
use crate::export::issue::IssueLinkBuilder;
use crate::export::schema::{build_schema_script, schema_filename};
use crate::navigation::{ColdStart, Locator, MemoryHistory, Navigator};
use crate::query::engine::{QueryEngine, SearchQuery};
use crate::utils::validation::validate_identifier;

/// Requests carry no bodies; anything larger is refused
pub const MAX_REQUEST_BODY_SIZE: usize = 64 * 1024;

/// Shared application state
pub struct AppState {
    pub store: CatalogStore,
    pub issue_links: IssueLinkBuilder,
    pub cold_start: ColdStart,
}

impl AppState {
    #[must_use]
    pub fn new(source: CatalogSource) -> Self {
        Self {
            store: CatalogStore::new(source),
            issue_links: IssueLinkBuilder::default(),
            cold_start: ColdStart::default(),
        }
    }

    #[must_use]
    pub fn with_issue_links(mut self, issue_links: IssueLinkBuilder) -> Self {
        self.issue_links = issue_links;
        self
    }

    #[must_use]
    pub fn with_cold_start(mut self, cold_start: ColdStart) -> Self {
        self.cold_start = cold_start;
        self
    }
}

/// Error body returned by every API endpoint
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Deserialize)]
struct SearchParams {
    /// Free-text query
    q: Option<String>,
    /// Exact topic facet
    topic: Option<String>,
}

#[derive(Deserialize)]
struct ResolveParams {
    /// Link fragment, with or without `#`
    locator: Option<String>,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None,
    }
}

fn not_found(kind: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(create_safe_error_response(
            "not_found",
            &format!("{kind} not found: {id}"),
            None,
        )),
    )
}

fn checked_identifier(id: &str) -> Result<&str, ApiError> {
    validate_identifier(id).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(create_safe_error_response("invalid_request", &e.to_string(), None)),
        )
    })
}

/// The shared catalog, or 503 while it cannot be loaded
async fn loaded_catalog(state: &AppState) -> Result<Arc<Catalog>, ApiError> {
    state.store.load().await.map_err(|e| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(create_safe_error_response(
                "catalog_unavailable",
                "Error loading catalog.",
                Some(&e.to_string()),
            )),
        )
    })
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the tokio runtime cannot be created or the server fails to start.
pub fn run(args: ServeArgs, state: AppState) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args, state).await })
}

/// Routes and security headers, without per-client rate limiting.
///
/// Rate limiting keys on the peer address, which only exists behind a real
/// listener; [`create_router`] adds it.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/catalog", get(catalog_handler))
        .route("/api/datasets", get(datasets_handler))
        .route("/api/datasets/{id}", get(dataset_handler))
        .route("/api/datasets/{id}/schema", get(schema_handler))
        .route("/api/attributes", get(attributes_handler))
        .route("/api/attributes/{key}", get(attribute_handler))
        .route("/api/resolve", get(resolve_handler))
        // Static file routes
        .route("/static/css/styles.css", get(styles_css_handler))
        .route("/static/js/main.js", get(main_js_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(30),
                ))
                .layer(ConcurrencyLimitLayer::new(100))
                .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_SIZE)),
        )
}

/// Create the application router with all routes and middleware configured.
///
/// # Errors
///
/// Returns an error if the rate limiter configuration is rejected.
pub fn create_router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10)
        .burst_size(50)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?;

    Ok(build_app(state).layer(GovernorLayer {
        config: Arc::new(governor_conf),
    }))
}

async fn run_server(args: ServeArgs, state: AppState) -> anyhow::Result<()> {
    let state = Arc::new(state);

    // Warm the cache; a failure is reported per request and retried on the next one
    if let Err(e) = state.store.load().await {
        tracing::warn!("Catalog not available yet: {e}");
    }

    let app = create_router(Arc::clone(&state))?;

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting geo-catalog web server at http://{addr}");

    if args.open {
        let _ = open::that(format!("http://{addr}"));
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Main page handler
async fn index_handler() -> Html<&'static str> {
    Html(include_str!("templates/index.html"))
}

/// Static CSS handler
async fn styles_css_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        include_str!("static/css/styles.css"),
    )
}

async fn main_js_handler() -> impl IntoResponse {
    (
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        include_str!("static/js/main.js"),
    )
}

/// Catalog overview: shape, counts, topics and the cold-start policy
async fn catalog_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let catalog = loaded_catalog(&state).await?;
    Ok(Json(serde_json::json!({
        "shape": catalog.shape(),
        "dataset_count": catalog.dataset_count(),
        "attribute_count": catalog.attribute_count(),
        "topics": catalog.topics(),
        "cold_start": state.cold_start,
    })))
}

async fn datasets_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let catalog = loaded_catalog(&state).await?;
    let query = SearchQuery::new(params.q.unwrap_or_default()).with_topic(params.topic);
    let datasets: Vec<serde_json::Value> = QueryEngine::new(&catalog)
        .datasets(&query)
        .into_iter()
        .map(|d| dataset_summary(&catalog, d))
        .collect();

    Ok(Json(serde_json::json!({
        "count": datasets.len(),
        "total": catalog.dataset_count(),
        "datasets": datasets,
    })))
}

async fn dataset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = checked_identifier(&id)?;
    let catalog = loaded_catalog(&state).await?;
    let dataset = catalog
        .dataset(id)
        .ok_or_else(|| not_found("Dataset", id))?;

    Ok(Json(serde_json::json!({
        "dataset": dataset,
        "glyph": dataset.geometry_type.glyph(),
        "attributes": catalog.attributes_for_dataset(dataset),
        "locator": Locator::dataset(id).encode(),
        "issue_link": state.issue_links.for_dataset(dataset),
        "schema_url": format!("/api/datasets/{}/schema", urlencoding::encode(id)),
    })))
}

/// ArcGIS schema script as a file download
async fn schema_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = checked_identifier(&id)?;
    let catalog = loaded_catalog(&state).await?;
    let dataset = catalog
        .dataset(id)
        .ok_or_else(|| not_found("Dataset", id))?;

    let script = build_schema_script(dataset, &catalog.attributes_for_dataset(dataset));
    let filename = schema_filename(dataset).unwrap_or_else(|e| {
        tracing::warn!("Falling back to a generic schema file name for {id}: {e}");
        "schema_arcpy.py".to_string()
    });

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "text/x-python; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        script,
    )
        .into_response())
}

async fn attributes_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let catalog = loaded_catalog(&state).await?;
    let query = SearchQuery::new(params.q.unwrap_or_default()).with_topic(params.topic);
    let attributes: Vec<serde_json::Value> = QueryEngine::new(&catalog)
        .attributes(&query)
        .into_iter()
        .map(|a| {
            serde_json::json!({
                "id": a.key_str(),
                "label": a.label,
                "type": a.attribute_type,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "count": attributes.len(),
        "total": catalog.attribute_count(),
        "attributes": attributes,
    })))
}

async fn attribute_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let key = checked_identifier(&key)?;
    let catalog = loaded_catalog(&state).await?;
    let attribute = catalog
        .attribute(key)
        .ok_or_else(|| not_found("Attribute", key))?;
    let datasets: Vec<serde_json::Value> = catalog
        .datasets_for_attribute(key)
        .into_iter()
        .map(|d| dataset_summary(&catalog, d))
        .collect();

    Ok(Json(serde_json::json!({
        "attribute": attribute,
        "datasets": datasets,
        "locator": Locator::attribute(key).encode(),
        "issue_link": state.issue_links.for_attribute(attribute),
    })))
}

/// Resolve a link as a cold page load would, applying the cold-start policy
async fn resolve_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResolveParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let catalog = loaded_catalog(&state).await?;
    let mut navigator = Navigator::new(MemoryHistory::with_initial(
        params.locator.unwrap_or_default(),
    ));
    let route = navigator.start(&catalog, state.cold_start);
    let focus = navigator.state();

    Ok(Json(serde_json::json!({
        "route": route.kind(),
        "locator": route.locator().map(Locator::encode),
        "view": focus.view,
        "dataset": focus.dataset,
        "attribute": focus.attribute,
        "not_found": route.not_found_message(),
    })))
}
