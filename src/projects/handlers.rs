use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::MaybeAuthUser,
    error::ApiError,
    generation::snapshot::Snapshot,
    projects::{
        dto::{
            validate_code, CreateProjectRequest, GenerateRequest, GeneratedVersionView,
            Pagination, ProjectStatus, ProjectView, UpdateProjectRequest,
        },
        repo::{self, GeneratedVersion, Project},
    },
    state::AppState,
};

pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/project", post(create_project).get(list_projects))
        .route(
            "/project/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/project/:id/generated", post(generate_for_project))
}

fn version_view(v: GeneratedVersion) -> GeneratedVersionView {
    GeneratedVersionView {
        gid: v.gid,
        code: v.code,
        meta: v.meta,
        created_at: v.created_at,
    }
}

fn project_view(p: Project, versions: Vec<GeneratedVersion>) -> ProjectView {
    ProjectView {
        id: p.id,
        title: p.title,
        owner_id: p.owner_id,
        // Rows only ever hold the statuses written by the handlers below.
        status: ProjectStatus::parse(&p.status).unwrap_or(ProjectStatus::New),
        last_generated_at: p.last_generated_at,
        created_at: p.created_at,
        updated_at: p.updated_at,
        generated_versions: versions.into_iter().map(version_view).collect(),
    }
}

#[instrument(skip(state, caller, payload))]
pub async fn create_project(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let title: String = payload
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("Untitled Project")
        .chars()
        .take(200)
        .collect();
    let status = payload.status.unwrap_or(ProjectStatus::New);
    let owner_id = caller.map(|c| c.sub);

    let project = repo::create(&state.db, &title, owner_id, status.as_str()).await?;

    info!(project_id = %project.id, "project created");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": project.id,
            "project": project_view(project, Vec::new()),
        })),
    ))
}

#[instrument(skip(state))]
pub async fn list_projects(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (_, limit) = p.clamped();
    let projects = repo::list(&state.db, limit, p.offset()).await?;
    let views: Vec<ProjectView> = projects
        .into_iter()
        .map(|p| project_view(p, Vec::new()))
        .collect();
    Ok(Json(json!({ "projects": views })))
}

#[instrument(skip(state))]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let project = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".into()))?;
    let versions = repo::versions(&state.db, id).await?;
    Ok(Json(json!({ "project": project_view(project, versions) })))
}

#[instrument(skip(state, payload))]
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let title = payload.title.as_deref().map(str::trim);
    if title == Some("") {
        return Err(ApiError::InvalidInput("Title must not be empty".into()));
    }
    let status = payload.status.map(|s| s.as_str());

    let project = repo::update(&state.db, id, title, status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".into()))?;
    let versions = repo::versions(&state.db, id).await?;
    Ok(Json(json!({ "project": project_view(project, versions) })))
}

#[instrument(skip(state))]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !repo::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Project not found".into()));
    }
    info!(project_id = %id, "project deleted");
    Ok(Json(json!({ "ok": true })))
}

/// The generation request flow: validate the prompt, ask the adapter for
/// code (which never fails outright), append the result to the project's
/// history, and write a disk snapshot best-effort.
#[instrument(skip(state, payload))]
pub async fn generate_for_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let prompt = payload.prompt.trim().to_string();
    if prompt.is_empty() {
        return Err(ApiError::InvalidInput("Prompt is required".into()));
    }

    let outcome = state.generator.generate(&prompt).await;
    validate_code(&outcome.text).map_err(ApiError::InvalidInput)?;

    let meta = json!({
        "prompt": prompt,
        "usedFallback": outcome.used_fallback,
        "model": state.config.provider.model,
    });

    let version = repo::append_version(&state.db, id, &outcome.text, meta)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".into()))?;

    // Snapshot failure must not fail the request; the generated code is
    // the deliverable and it is already persisted above.
    let snapshot = Snapshot::new(&prompt, &outcome.text);
    if let Err(e) = state.snapshots.write(&snapshot).await {
        warn!(error = %e, snapshot_id = %snapshot.id, "snapshot write failed");
    }

    info!(project_id = %id, gid = %version.gid, used_fallback = outcome.used_fallback, "version appended");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "ok": true,
            "generated": version_view(version),
            "projectId": id,
        })),
    ))
}
