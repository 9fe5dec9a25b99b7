use regex::Regex;

use crate::model::ExperienceLevel;

/// Priority order matters: the first level with a hit wins, so "senior lead"
/// resolves to Senior.
pub const DEFAULT_RULES: &[(ExperienceLevel, &[&str])] = &[
    (
        ExperienceLevel::Junior,
        &["junior", "entry level", "0-2 years", "1-2 years", "debutant"],
    ),
    (
        ExperienceLevel::MidLevel,
        &["mid-level", "mid level", "2-5 years", "3-5 years", "intermediate"],
    ),
    (
        ExperienceLevel::Senior,
        &["senior", r"5\+ years", "5+ years", "experienced", "expérimenté"],
    ),
    (
        ExperienceLevel::LeadPrincipal,
        &["lead", "principal", "staff", "architect", r"10\+ years"],
    ),
];

pub fn detect(rules: &[(ExperienceLevel, Vec<Regex>)], text: &str) -> ExperienceLevel {
    let lower = text.to_lowercase();
    rules
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|re| re.is_match(&lower)))
        .map(|(level, _)| *level)
        .unwrap_or(ExperienceLevel::Unspecified)
}
