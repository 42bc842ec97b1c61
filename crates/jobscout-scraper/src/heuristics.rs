//! Heuristic field derivation for scraped postings.
//!
//! Scraped boards expose neither skills nor contract type as structured
//! fields, so both are derived from the visible text.

/// Technology keyword vocabulary used for skill derivation.
const TECH_KEYWORDS: &[&str] = &[
    "JavaScript",
    "TypeScript",
    "Python",
    "Java",
    "Rust",
    "Go",
    "C++",
    "C#",
    "Ruby",
    "PHP",
    "Swift",
    "Kotlin",
    "React",
    "Angular",
    "Vue",
    "Node",
    "Express",
    "Django",
    "Flask",
    "Spring",
    "Rails",
    "SQL",
    "PostgreSQL",
    "MySQL",
    "MongoDB",
    "Redis",
    "GraphQL",
    "Docker",
    "Kubernetes",
    "Terraform",
    "AWS",
    "Azure",
    "GCP",
    "Linux",
    "Git",
    "CI/CD",
    "HTML",
    "CSS",
];

/// Derive skills by substring-matching the fixed technology vocabulary
/// against the posting text (case-insensitive). Vocabulary order is
/// preserved in the result.
#[must_use]
pub fn derive_skills(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TECH_KEYWORDS
        .iter()
        .filter(|keyword| lowered.contains(&keyword.to_lowercase()))
        .map(|keyword| (*keyword).to_string())
        .collect()
}

/// Derive a contract type from posting text by keyword match.
/// Defaults to `"Full-time"` when nothing more specific is mentioned.
#[must_use]
pub fn derive_contract_type(text: &str) -> String {
    let lowered = text.to_lowercase();
    if lowered.contains("part-time") || lowered.contains("part time") {
        "Part-time".to_string()
    } else if lowered.contains("internship") || lowered.contains("intern ") {
        "Internship".to_string()
    } else if lowered.contains("contract") || lowered.contains("freelance") {
        "Contract".to_string()
    } else {
        "Full-time".to_string()
    }
}
