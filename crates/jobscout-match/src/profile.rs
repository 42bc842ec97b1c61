//! Profile-derived embedding text and search strategies.

use jobscout_core::UserProfileSummary;

/// How many leading skills are concatenated into the combined strategy.
const COMBINED_SKILLS: usize = 3;
/// How many leading skills get an individual strategy each.
const INDIVIDUAL_SKILLS: usize = 5;

/// One query the generator will run against the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStrategy {
    pub query: String,
    pub location: Option<String>,
}

/// Generic strategy bundles tried in order when every profile-driven
/// strategy comes back empty. The first bundle yielding any result wins.
pub(crate) const FALLBACK_BUNDLES: &[&[(&str, Option<&str>)]] = &[
    &[("developer", Some("Remote"))],
    &[("software engineer", None)],
    &[("full stack", None), ("web developer", None)],
    &[("backend", Some("Remote")), ("frontend", Some("Remote"))],
];

/// Embedding input text for a profile: job title, skills, bio, and the
/// most recent experience description. Present fields only, one per line.
#[must_use]
pub fn profile_embedding_text(profile: &UserProfileSummary) -> String {
    let mut lines = Vec::new();
    if let Some(title) = &profile.job_title {
        lines.push(title.clone());
    }
    if !profile.skills.is_empty() {
        lines.push(profile.skills.join(", "));
    }
    if let Some(bio) = &profile.bio {
        lines.push(bio.clone());
    }
    if let Some(description) = profile
        .experiences
        .first()
        .and_then(|exp| exp.description.as_ref())
    {
        lines.push(description.clone());
    }
    lines.join("\n")
}

/// Build the ordered list of profile-driven search strategies.
///
/// The primary strategy uses the explicit query (when given) or the
/// profile's job title; subsequent strategies combine the top skills and
/// then try the leading skills individually. All strategies share the
/// same location — explicit first, profile second. An empty profile with
/// no explicit query yields no strategies: the generator has nothing to
/// search.
#[must_use]
pub fn build_strategies(
    profile: &UserProfileSummary,
    explicit_query: Option<&str>,
    explicit_location: Option<&str>,
) -> Vec<SearchStrategy> {
    let location = explicit_location
        .map(ToOwned::to_owned)
        .or_else(|| profile.location.clone());

    let mut strategies = Vec::new();

    let primary = explicit_query
        .map(ToOwned::to_owned)
        .or_else(|| profile.job_title.clone())
        .filter(|q| !q.trim().is_empty());
    if let Some(query) = primary {
        strategies.push(SearchStrategy {
            query,
            location: location.clone(),
        });
    }

    let skills: Vec<&String> = profile
        .skills
        .iter()
        .filter(|s| !s.trim().is_empty())
        .collect();

    if skills.len() >= 2 {
        let combined = skills
            .iter()
            .take(COMBINED_SKILLS)
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        strategies.push(SearchStrategy {
            query: combined,
            location: location.clone(),
        });
    }

    for skill in skills.iter().take(INDIVIDUAL_SKILLS) {
        strategies.push(SearchStrategy {
            query: (*skill).clone(),
            location: location.clone(),
        });
    }

    strategies
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobscout_core::ExperienceSummary;

    fn profile() -> UserProfileSummary {
        UserProfileSummary {
            job_title: Some("Backend Developer".to_string()),
            skills: vec![
                "Node".to_string(),
                "SQL".to_string(),
                "Docker".to_string(),
                "AWS".to_string(),
            ],
            location: Some("Remote".to_string()),
            bio: Some("Five years building services.".to_string()),
            experiences: vec![ExperienceSummary {
                title: Some("Senior Engineer".to_string()),
                description: Some("Led the billing platform.".to_string()),
            }],
        }
    }

    #[test]
    fn embedding_text_uses_title_skills_bio_and_latest_experience() {
        let text = profile_embedding_text(&profile());
        assert_eq!(
            text,
            "Backend Developer\nNode, SQL, Docker, AWS\nFive years building services.\nLed the billing platform."
        );
    }

    #[test]
    fn primary_strategy_uses_profile_title_and_location() {
        let strategies = build_strategies(&profile(), None, None);
        assert_eq!(
            strategies[0],
            SearchStrategy {
                query: "Backend Developer".to_string(),
                location: Some("Remote".to_string()),
            }
        );
    }

    #[test]
    fn explicit_query_and_location_win_over_profile() {
        let strategies = build_strategies(&profile(), Some("Data Engineer"), Some("Berlin"));
        assert_eq!(strategies[0].query, "Data Engineer");
        assert_eq!(strategies[0].location.as_deref(), Some("Berlin"));
    }

    #[test]
    fn skill_strategies_follow_in_order() {
        let strategies = build_strategies(&profile(), None, None);
        let queries: Vec<&str> = strategies.iter().map(|s| s.query.as_str()).collect();
        assert_eq!(
            queries,
            vec![
                "Backend Developer",
                "Node SQL Docker",
                "Node",
                "SQL",
                "Docker",
                "AWS",
            ]
        );
    }

    #[test]
    fn empty_profile_without_query_yields_no_strategies() {
        let strategies = build_strategies(&UserProfileSummary::default(), None, None);
        assert!(strategies.is_empty());
    }

    #[test]
    fn single_skill_profile_skips_the_combined_strategy() {
        let profile = UserProfileSummary {
            skills: vec!["Rust".to_string()],
            ..UserProfileSummary::default()
        };
        let strategies = build_strategies(&profile, None, None);
        let queries: Vec<&str> = strategies.iter().map(|s| s.query.as_str()).collect();
        assert_eq!(queries, vec!["Rust"]);
    }
}
