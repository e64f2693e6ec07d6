use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Project lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    New,
    InProgress,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::New => "new",
            ProjectStatus::InProgress => "in-progress",
            ProjectStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(ProjectStatus::New),
            "in-progress" => Some(ProjectStatus::InProgress),
            "completed" => Some(ProjectStatus::Completed),
            _ => None,
        }
    }
}

/// Versions may not be empty and are bounded so a misbehaving provider
/// cannot write arbitrarily large rows.
pub const MAX_CODE_LEN: usize = 200_000;

pub fn validate_code(code: &str) -> Result<(), String> {
    if code.is_empty() {
        return Err("Code must not be empty".into());
    }
    if code.chars().count() > MAX_CODE_LEN {
        return Err("Code too large".into());
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub title: Option<String>,
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    20
}

impl Pagination {
    /// Clamp to page >= 1 and 1 <= limit <= 100.
    pub fn clamped(&self) -> (i64, i64) {
        let page = self.page.max(1);
        let limit = self.limit.clamp(1, 100);
        (page, limit)
    }

    pub fn offset(&self) -> i64 {
        let (page, limit) = self.clamped();
        // page and limit come straight from the query string; saturate
        // rather than overflow on absurd page numbers.
        (page - 1).saturating_mul(limit)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedVersionView {
    pub gid: Uuid,
    pub code: String,
    pub meta: serde_json::Value,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: Uuid,
    pub title: String,
    pub owner_id: Option<Uuid>,
    pub status: ProjectStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_generated_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub generated_versions: Vec<GeneratedVersionView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips() {
        for s in ["new", "in-progress", "completed"] {
            assert_eq!(ProjectStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(ProjectStatus::parse("done").is_none());
    }

    #[test]
    fn status_serde_uses_kebab_case() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        let back: ProjectStatus = serde_json::from_str("\"in-progress\"").unwrap();
        assert_eq!(back, ProjectStatus::InProgress);
    }

    #[test]
    fn code_validation_bounds() {
        assert!(validate_code("").is_err());
        assert!(validate_code("x").is_ok());
        let max = "a".repeat(MAX_CODE_LEN);
        assert!(validate_code(&max).is_ok());
        let over = "a".repeat(MAX_CODE_LEN + 1);
        assert!(validate_code(&over).is_err());
    }

    #[test]
    fn pagination_clamps() {
        let p = Pagination { page: 0, limit: 500 };
        assert_eq!(p.clamped(), (1, 100));
        assert_eq!(p.offset(), 0);

        let p = Pagination { page: 3, limit: 20 };
        assert_eq!(p.offset(), 40);
    }

    #[test]
    fn pagination_offset_saturates_on_huge_page() {
        let p = Pagination {
            page: i64::MAX,
            limit: 100,
        };
        assert_eq!(p.offset(), i64::MAX);

        let p = Pagination {
            page: i64::MIN,
            limit: 100,
        };
        assert_eq!(p.offset(), 0);
    }
}
