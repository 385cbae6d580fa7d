//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::{AppState, Profile};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use chrono::Utc;
use roadmap_core::{
    domain::{GenerateRoadmapRequest, ItemCategory, SavedRoadmap},
    ports::PortError,
    render::export_file_name,
    summary::RoadmapSummary,
    toggle::{toggle_day, toggle_item, DayPath},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        generate_roadmap_handler,
        list_roadmaps_handler,
        get_roadmap_handler,
        toggle_day_handler,
        toggle_item_handler,
        export_roadmap_handler,
    ),
    components(
        schemas(HealthResponse, GenerateRoadmapPayload, ToggleDayPayload, ToggleItemPayload)
    ),
    tags(
        (name = "Roadmap API", description = "Generate learning roadmaps and track their progress.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// The learner's input for a new roadmap.
#[derive(Deserialize, ToSchema)]
pub struct GenerateRoadmapPayload {
    pub topic: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub duration_weeks: Option<u32>,
    #[serde(default)]
    pub hours_per_week: Option<u32>,
    #[serde(default)]
    pub learner_background: Option<String>,
    #[serde(default)]
    pub target_goal: Option<String>,
}

impl GenerateRoadmapPayload {
    fn into_request(self) -> GenerateRoadmapRequest {
        let blank_to_none = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut request = GenerateRoadmapRequest::new(self.topic.trim());
        if let Some(level) = blank_to_none(self.level) {
            request.level = level;
        }
        if let Some(weeks) = self.duration_weeks {
            request.duration_weeks = weeks;
        }
        if let Some(hours) = self.hours_per_week {
            request.hours_per_week = hours;
        }
        request.learner_background = blank_to_none(self.learner_background);
        request.target_goal = blank_to_none(self.target_goal);
        request
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ToggleDayPayload {
    pub phase_id: String,
    pub week_number: u32,
    pub day_number: u32,
}

#[derive(Deserialize, ToSchema)]
pub struct ToggleItemPayload {
    pub phase_id: String,
    pub week_number: u32,
    pub day_number: u32,
    /// One of `learn_items`, `practice_items`, `project_items`, `reflection_items`.
    #[schema(value_type = String)]
    pub category: ItemCategory,
    pub item_index: usize,
}

//=========================================================================================
// Helpers
//=========================================================================================

type HandlerError = (StatusCode, String);

fn port_failure(context: &str, e: PortError) -> HandlerError {
    error!("{}: {:?}", context, e);
    match e {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, context.to_string()),
    }
}

fn roadmap_not_found(id: &str) -> HandlerError {
    (StatusCode::NOT_FOUND, format!("Roadmap {} not found", id))
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Generate a roadmap with the configured LLM and save it for the profile.
#[utoipa::path(
    post,
    path = "/roadmaps/generate",
    request_body = GenerateRoadmapPayload,
    responses(
        (status = 201, description = "Roadmap generated and saved; the body is the saved record"),
        (status = 400, description = "Missing topic or malformed x-user-id header"),
        (status = 502, description = "The generation provider failed or answered with invalid JSON"),
        (status = 503, description = "No generation provider is configured")
    ),
    params(
        ("x-user-id" = Option<uuid::Uuid>, Header, description = "The profile the roadmap belongs to.")
    )
)]
pub async fn generate_roadmap_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(profile): Extension<Profile>,
    Json(payload): Json<GenerateRoadmapPayload>,
) -> Result<impl IntoResponse, HandlerError> {
    if payload.topic.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Please enter a topic/skill for the roadmap.".to_string(),
        ));
    }
    let generator = app_state.generator.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Roadmap generation is not configured".to_string(),
        )
    })?;

    let request = payload.into_request();
    let roadmap = generator.generate(&request).await.map_err(|e| {
        error!("Roadmap generation failed: {:?}", e);
        (StatusCode::BAD_GATEWAY, e.to_string())
    })?;

    let saved = SavedRoadmap::new(roadmap, &request, Utc::now());
    app_state
        .library(&profile)
        .save_new(saved.clone())
        .await
        .map_err(|e| port_failure("Failed to save roadmap", e))?;

    info!(id = %saved.id, topic = %saved.topic, "Roadmap generated");
    Ok((StatusCode::CREATED, Json(saved)))
}

/// List the profile's saved roadmaps, most recent first.
#[utoipa::path(
    get,
    path = "/roadmaps",
    responses(
        (status = 200, description = "Roadmap summaries, most recent first"),
        (status = 400, description = "Malformed x-user-id header")
    ),
    params(
        ("x-user-id" = Option<uuid::Uuid>, Header, description = "The profile to list.")
    )
)]
pub async fn list_roadmaps_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(profile): Extension<Profile>,
) -> Result<Json<Vec<RoadmapSummary>>, HandlerError> {
    let records = app_state
        .library(&profile)
        .load_all()
        .await
        .map_err(|e| port_failure("Failed to load roadmaps", e))?;

    Ok(Json(records.iter().map(RoadmapSummary::from_saved).collect()))
}

/// Fetch one saved roadmap with its tree and rendered document.
#[utoipa::path(
    get,
    path = "/roadmaps/{id}",
    responses(
        (status = 200, description = "The saved roadmap"),
        (status = 404, description = "No roadmap with this id")
    ),
    params(
        ("id" = String, Path, description = "Roadmap id"),
        ("x-user-id" = Option<uuid::Uuid>, Header, description = "The profile the roadmap belongs to.")
    )
)]
pub async fn get_roadmap_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(profile): Extension<Profile>,
    Path(id): Path<String>,
) -> Result<Json<SavedRoadmap>, HandlerError> {
    app_state
        .library(&profile)
        .get(&id)
        .await
        .map_err(|e| port_failure("Failed to load roadmap", e))?
        .map(Json)
        .ok_or_else(|| roadmap_not_found(&id))
}

/// Flip a day's completion. Completing a day completes all of its items.
/// An unknown phase, week or day leaves the roadmap unchanged.
#[utoipa::path(
    post,
    path = "/roadmaps/{id}/days/toggle",
    request_body = ToggleDayPayload,
    responses(
        (status = 200, description = "The updated saved roadmap"),
        (status = 404, description = "No roadmap with this id")
    ),
    params(
        ("id" = String, Path, description = "Roadmap id"),
        ("x-user-id" = Option<uuid::Uuid>, Header, description = "The profile the roadmap belongs to.")
    )
)]
pub async fn toggle_day_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(profile): Extension<Profile>,
    Path(id): Path<String>,
    Json(payload): Json<ToggleDayPayload>,
) -> Result<Json<SavedRoadmap>, HandlerError> {
    let library = app_state.library(&profile);
    let record = library
        .get(&id)
        .await
        .map_err(|e| port_failure("Failed to load roadmap", e))?
        .ok_or_else(|| roadmap_not_found(&id))?;

    let path = DayPath::new(&payload.phase_id, payload.week_number, payload.day_number);
    let updated = toggle_day(&record.roadmap_json, &path);

    library
        .update_in_place(&id, updated)
        .await
        .map_err(|e| port_failure("Failed to update roadmap", e))?
        .map(Json)
        .ok_or_else(|| roadmap_not_found(&id))
}

/// Flip a single item. The day becomes complete once all of its items are.
#[utoipa::path(
    post,
    path = "/roadmaps/{id}/items/toggle",
    request_body = ToggleItemPayload,
    responses(
        (status = 200, description = "The updated saved roadmap"),
        (status = 404, description = "No roadmap with this id")
    ),
    params(
        ("id" = String, Path, description = "Roadmap id"),
        ("x-user-id" = Option<uuid::Uuid>, Header, description = "The profile the roadmap belongs to.")
    )
)]
pub async fn toggle_item_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(profile): Extension<Profile>,
    Path(id): Path<String>,
    Json(payload): Json<ToggleItemPayload>,
) -> Result<Json<SavedRoadmap>, HandlerError> {
    let library = app_state.library(&profile);
    let record = library
        .get(&id)
        .await
        .map_err(|e| port_failure("Failed to load roadmap", e))?
        .ok_or_else(|| roadmap_not_found(&id))?;

    let path = DayPath::new(&payload.phase_id, payload.week_number, payload.day_number);
    let updated = toggle_item(
        &record.roadmap_json,
        &path,
        payload.category,
        payload.item_index,
    );

    library
        .update_in_place(&id, updated)
        .await
        .map_err(|e| port_failure("Failed to update roadmap", e))?
        .map(Json)
        .ok_or_else(|| roadmap_not_found(&id))
}

/// Download the rendered progress document as a markdown file.
#[utoipa::path(
    get,
    path = "/roadmaps/{id}/export",
    responses(
        (status = 200, description = "Markdown document", body = String, content_type = "text/markdown"),
        (status = 404, description = "No roadmap with this id")
    ),
    params(
        ("id" = String, Path, description = "Roadmap id"),
        ("x-user-id" = Option<uuid::Uuid>, Header, description = "The profile the roadmap belongs to.")
    )
)]
pub async fn export_roadmap_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(profile): Extension<Profile>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let record = app_state
        .library(&profile)
        .get(&id)
        .await
        .map_err(|e| port_failure("Failed to load roadmap", e))?
        .ok_or_else(|| roadmap_not_found(&id))?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(&record.title).replace('"', "")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        record.markdown,
    ))
}
