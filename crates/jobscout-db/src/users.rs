//! User directory and profile reads.
//!
//! Profile CRUD belongs to the user-profile collaborator; this module
//! only reads the summary shape the recommendation pipeline consumes.

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use jobscout_core::{ExperienceSummary, UserProfileSummary};

use crate::DbError;

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    job_title: Option<String>,
    location: Option<String>,
    bio: Option<String>,
    skills: Value,
    experiences: Value,
}

/// All known user ids, oldest account first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_user_ids(pool: &PgPool) -> Result<Vec<Uuid>, DbError> {
    let ids: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM users ORDER BY created_at")
        .fetch_all(pool)
        .await?;
    Ok(ids.into_iter().map(|(id,)| id).collect())
}

/// Load the profile summary for one user, or `None` if the user has no
/// profile row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or [`DbError::Payload`]
/// if the stored skills/experiences JSON is not the expected shape.
pub async fn get_user_profile(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<UserProfileSummary>, DbError> {
    let row: Option<ProfileRow> = sqlx::query_as(
        "SELECT job_title, location, bio, skills, experiences \
         FROM user_profiles WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.map(profile_from_row).transpose()
}

fn profile_from_row(row: ProfileRow) -> Result<UserProfileSummary, DbError> {
    let skills: Vec<String> = serde_json::from_value(row.skills)?;
    let experiences: Vec<ExperienceSummary> = serde_json::from_value(row.experiences)?;
    Ok(UserProfileSummary {
        job_title: row.job_title,
        skills,
        location: row.location,
        bio: row.bio,
        experiences,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_row_json_columns_deserialize() {
        let row = ProfileRow {
            job_title: Some("Backend Developer".to_string()),
            location: Some("Remote".to_string()),
            bio: None,
            skills: json!(["Node", "SQL"]),
            experiences: json!([{"title": "Engineer", "description": "Built services"}]),
        };

        let profile = profile_from_row(row).unwrap();

        assert_eq!(profile.skills, vec!["Node", "SQL"]);
        assert_eq!(profile.experiences.len(), 1);
        assert_eq!(
            profile.experiences[0].description.as_deref(),
            Some("Built services")
        );
    }

    #[test]
    fn malformed_skills_column_is_a_payload_error() {
        let row = ProfileRow {
            job_title: None,
            location: None,
            bio: None,
            skills: json!({"not": "a list"}),
            experiences: json!([]),
        };
        assert!(matches!(profile_from_row(row), Err(DbError::Payload(_))));
    }
}
