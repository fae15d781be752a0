use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{SystemTime, UNIX_EPOCH},
};

use crate::api::ApiPostView;
use post_kpi::draft::PostDraft;
use post_kpi::reconcile::parse_date;
use post_kpi::standards::table_to_named;
use post_kpi::store::{PostStore, PostUpdate, StandardsStore};
use post_kpi::summary::{summarize, PurposeFilter, Summary, SummaryFilter};
use post_kpi::{MetricsSnapshot, PerformanceStandard, Platform, Window};

type ApiError = (StatusCode, String);

#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostStore>,
    pub standards: Arc<StandardsStore>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub today: Option<String>,
    pub platform: Option<String>,
    pub month: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub overdue: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub window: Option<String>,
    pub purpose: Option<String>,
    pub platform: Option<String>,
    pub month: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/posts", get(list_posts).post(create_posts))
        .route("/api/posts/:id", put(update_post).delete(delete_post))
        .route("/api/posts/:id/metrics/:window", put(update_metrics))
        .route("/api/standards", get(list_standards))
        .route("/api/standards/:platform", put(put_standard).delete(delete_standard))
        .route("/api/summary", get(summary_handler))
        .with_state(state)
}

pub async fn serve(state: AppState, host: &str, port: u16) -> Result<(), String> {
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    tracing::info!(%addr, "serving post KPI api");
    axum::serve(tokio::net::TcpListener::bind(addr).await.map_err(|err| {
        format!("failed to bind server: {}", err)
    })?, app)
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ApiPostView>>, ApiError> {
    let today = resolve_today(query.today.as_deref())?;
    let platform = parse_optional(query.platform.as_deref(), Platform::from_str, "platform")?;
    let filter = SummaryFilter {
        platform,
        ..SummaryFilter::default()
    }
    .with_period(query.month.as_deref(), query.from.as_deref(), query.to.as_deref())
    .map_err(bad_request)?;
    let standards = state.standards.snapshot().await;

    let views = state
        .posts
        .list()
        .await
        .into_iter()
        .filter(|post| filter.matches(post))
        .map(|post| ApiPostView::build(post, &standards, today))
        .filter(|view| !query.overdue.unwrap_or(false) || view.alert.is_some())
        .collect();
    Ok(Json(views))
}

pub async fn create_posts(
    State(state): State<AppState>,
    Json(draft): Json<PostDraft>,
) -> Result<Json<Vec<ApiPostView>>, ApiError> {
    let today = local_today();
    let posts = draft
        .into_posts(today, generate_id_seed())
        .map_err(bad_request)?;
    let standards = state.standards.snapshot().await;

    let mut views = Vec::with_capacity(posts.len());
    for post in posts {
        let stored = state
            .posts
            .insert(post)
            .await
            .map_err(|err| (StatusCode::CONFLICT, err))?;
        views.push(ApiPostView::build(stored, &standards, today));
    }
    tracing::info!(count = views.len(), "created posts");
    Ok(Json(views))
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(update): Json<PostUpdate>,
) -> Result<Json<ApiPostView>, ApiError> {
    if state.posts.get(&post_id).await.is_none() {
        return Err((StatusCode::NOT_FOUND, format!("post not found: {}", post_id)));
    }
    let post = state
        .posts
        .update_fields(&post_id, update)
        .await
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err))?;
    let standards = state.standards.snapshot().await;
    Ok(Json(ApiPostView::build(post, &standards, local_today())))
}

pub async fn update_metrics(
    State(state): State<AppState>,
    Path((post_id, window)): Path<(String, String)>,
    Json(snapshot): Json<MetricsSnapshot>,
) -> Result<Json<ApiPostView>, ApiError> {
    let window = Window::from_str(&window)
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("invalid window: {}", window)))?;
    if state.posts.get(&post_id).await.is_none() {
        return Err((StatusCode::NOT_FOUND, format!("post not found: {}", post_id)));
    }
    let post = state
        .posts
        .update_metrics(&post_id, window, snapshot)
        .await
        .map_err(|err| (StatusCode::UNPROCESSABLE_ENTITY, err))?;
    let standards = state.standards.snapshot().await;
    Ok(Json(ApiPostView::build(post, &standards, local_today())))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = state
        .posts
        .delete(&post_id)
        .await
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err))?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("post not found: {}", post_id)))
    }
}

pub async fn list_standards(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, PerformanceStandard>> {
    let standards = state.standards.snapshot().await;
    Json(table_to_named(&standards))
}

pub async fn put_standard(
    State(state): State<AppState>,
    Path(platform): Path<String>,
    Json(standard): Json<PerformanceStandard>,
) -> Result<Json<PerformanceStandard>, ApiError> {
    let platform = Platform::from_str(&platform)
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("invalid platform: {}", platform)))?;
    state
        .standards
        .set(platform, standard.clone())
        .await
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err))?;
    Ok(Json(standard))
}

pub async fn delete_standard(
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Result<StatusCode, ApiError> {
    let platform = Platform::from_str(&platform)
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("invalid platform: {}", platform)))?;
    let removed = state
        .standards
        .remove(platform)
        .await
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err))?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((
            StatusCode::NOT_FOUND,
            format!("no standard configured for {}", platform.label()),
        ))
    }
}

pub async fn summary_handler(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<Summary>, ApiError> {
    let window = parse_optional(query.window.as_deref(), Window::from_str, "window")?
        .unwrap_or(Window::SevenDay);
    let purpose = parse_optional(query.purpose.as_deref(), PurposeFilter::from_str, "purpose")?
        .unwrap_or_default();
    let platform = parse_optional(query.platform.as_deref(), Platform::from_str, "platform")?;

    let filter = SummaryFilter {
        purpose,
        platform,
        ..SummaryFilter::default()
    }
    .with_period(query.month.as_deref(), query.from.as_deref(), query.to.as_deref())
    .map_err(bad_request)?;

    let posts = state.posts.list().await;
    Ok(Json(summarize(&posts, window, &filter)))
}

fn parse_optional<T>(
    value: Option<&str>,
    parse: fn(&str) -> Option<T>,
    field: &str,
) -> Result<Option<T>, ApiError> {
    match value.map(str::trim).filter(|raw| !raw.is_empty() && *raw != "all") {
        Some(raw) => parse(raw)
            .map(Some)
            .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("invalid {}: {}", field, raw))),
        None => Ok(None),
    }
}

fn bad_request(err: String) -> ApiError {
    (StatusCode::BAD_REQUEST, err)
}

fn resolve_today(value: Option<&str>) -> Result<NaiveDate, ApiError> {
    match value.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => parse_date(raw)
            .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("invalid date: {}", raw))),
        None => Ok(local_today()),
    }
}

pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn generate_id_seed() -> u128 {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed) as u128;
    now_ms() * 1000 + counter % 1000
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0)
}
