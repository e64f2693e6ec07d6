use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub owner_id: Option<Uuid>,
    pub status: String,
    pub last_generated_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GeneratedVersion {
    pub gid: Uuid,
    pub project_id: Uuid,
    pub code: String,
    pub meta: serde_json::Value,
    pub created_at: OffsetDateTime,
}

pub async fn create(
    db: &PgPool,
    title: &str,
    owner_id: Option<Uuid>,
    status: &str,
) -> anyhow::Result<Project> {
    let project = sqlx::query_as::<_, Project>(
        r#"
        INSERT INTO projects (title, owner_id, status)
        VALUES ($1, $2, $3)
        RETURNING id, title, owner_id, status, last_generated_at, created_at, updated_at
        "#,
    )
    .bind(title)
    .bind(owner_id)
    .bind(status)
    .fetch_one(db)
    .await?;
    Ok(project)
}

pub async fn list(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<Project>> {
    let rows = sqlx::query_as::<_, Project>(
        r#"
        SELECT id, title, owner_id, status, last_generated_at, created_at, updated_at
        FROM projects
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Project>> {
    let project = sqlx::query_as::<_, Project>(
        r#"
        SELECT id, title, owner_id, status, last_generated_at, created_at, updated_at
        FROM projects
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(project)
}

/// Version history for one project, most recent first.
pub async fn versions(db: &PgPool, project_id: Uuid) -> anyhow::Result<Vec<GeneratedVersion>> {
    let rows = sqlx::query_as::<_, GeneratedVersion>(
        r#"
        SELECT gid, project_id, code, meta, created_at
        FROM generated_versions
        WHERE project_id = $1
        ORDER BY created_at DESC, gid
        "#,
    )
    .bind(project_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Append one immutable version to a project's history. The version row is
/// a plain INSERT, so concurrent appends to the same project interleave
/// without losing entries; history is never rewritten in place.
/// Returns `None` when the project does not exist.
pub async fn append_version(
    db: &PgPool,
    project_id: Uuid,
    code: &str,
    meta: serde_json::Value,
) -> anyhow::Result<Option<GeneratedVersion>> {
    let mut tx = db.begin().await?;

    let touched = sqlx::query(
        r#"
        UPDATE projects
        SET last_generated_at = now(), updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(project_id)
    .execute(&mut *tx)
    .await?;

    if touched.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(None);
    }

    let version = sqlx::query_as::<_, GeneratedVersion>(
        r#"
        INSERT INTO generated_versions (gid, project_id, code, meta)
        VALUES ($1, $2, $3, $4)
        RETURNING gid, project_id, code, meta, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(project_id)
    .bind(code)
    .bind(meta)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(version))
}

/// Patch title and/or status, last-writer-wins. Returns `None` when absent.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    title: Option<&str>,
    status: Option<&str>,
) -> anyhow::Result<Option<Project>> {
    let project = sqlx::query_as::<_, Project>(
        r#"
        UPDATE projects
        SET title = COALESCE($2, title),
            status = COALESCE($3, status),
            updated_at = now()
        WHERE id = $1
        RETURNING id, title, owner_id, status, last_generated_at, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(status)
    .fetch_optional(db)
    .await?;
    Ok(project)
}

/// Delete a project and (via FK cascade) its version history.
pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
