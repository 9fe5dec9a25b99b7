//! Text → attribute extraction.
//!
//! Every extractor is total: unmatched or malformed input yields the
//! documented default (`Unspecified`, an empty stack, `None`). The keyword and
//! pattern lists live in a [`Vocabulary`] owned by the [`FieldExtractor`], so
//! tests and callers can substitute their own.

pub mod experience;
pub mod salary;
pub mod tech;
pub mod work_mode;

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::model::{ExperienceLevel, SalaryRange, TechStack, WorkMode};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid {kind} pattern {pattern:?}: {source}")]
    Pattern {
        kind: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Keyword and pattern lists driving the extractors.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub remote_keywords: Vec<String>,
    pub hybrid_keywords: Vec<String>,
    pub onsite_keywords: Vec<String>,
    /// Checked in order; the first level with any matching pattern wins.
    pub experience_rules: Vec<(ExperienceLevel, Vec<String>)>,
    pub technologies: Vec<String>,
    /// Each pattern must capture the lower bound in group 1 and the upper in group 2.
    pub salary_patterns: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            remote_keywords: strings(work_mode::REMOTE_KEYWORDS),
            hybrid_keywords: strings(work_mode::HYBRID_KEYWORDS),
            onsite_keywords: strings(work_mode::ONSITE_KEYWORDS),
            experience_rules: experience::DEFAULT_RULES
                .iter()
                .map(|(level, patterns)| (*level, strings(patterns)))
                .collect(),
            technologies: strings(tech::TECHNOLOGIES),
            salary_patterns: strings(salary::SALARY_PATTERNS),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Compiled form of a [`Vocabulary`].
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    work_modes: work_mode::WorkModeKeywords,
    experience: Vec<(ExperienceLevel, Vec<Regex>)>,
    technologies: Vec<(String, Regex)>,
    salary: Vec<Regex>,
}

impl FieldExtractor {
    pub fn new(vocabulary: Vocabulary) -> Result<Self, ExtractError> {
        let work_modes = work_mode::WorkModeKeywords::new(
            &vocabulary.remote_keywords,
            &vocabulary.hybrid_keywords,
            &vocabulary.onsite_keywords,
        );

        let experience = vocabulary
            .experience_rules
            .iter()
            .map(|(level, patterns)| {
                let compiled = patterns
                    .iter()
                    .map(|p| compile("experience", p, true))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((*level, compiled))
            })
            .collect::<Result<Vec<_>, ExtractError>>()?;

        let technologies = vocabulary
            .technologies
            .iter()
            .map(|name| Ok((name.clone(), compile("technology", &tech::word_pattern(name), false)?)))
            .collect::<Result<Vec<_>, ExtractError>>()?;

        let salary = vocabulary
            .salary_patterns
            .iter()
            .map(|p| compile("salary", p, false))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            work_modes,
            experience,
            technologies,
            salary,
        })
    }

    pub fn detect_work_mode(&self, text: &str) -> WorkMode {
        work_mode::detect(&self.work_modes, text)
    }

    pub fn extract_experience_level(&self, text: &str) -> ExperienceLevel {
        experience::detect(&self.experience, text)
    }

    pub fn extract_tech_stack(&self, text: &str) -> TechStack {
        tech::detect(&self.technologies, text)
    }

    pub fn extract_salary_range(&self, text: &str) -> Option<SalaryRange> {
        salary::parse(&self.salary, text)
    }

    /// Vocabulary spelling of `name`, compared case-insensitively.
    pub fn canonical_technology(&self, name: &str) -> Option<&str> {
        self.technologies()
            .find(|known| known.to_lowercase() == name.to_lowercase())
    }

    /// Technology names this extractor can recognize, in vocabulary order.
    pub fn technologies(&self) -> impl Iterator<Item = &str> {
        self.technologies.iter().map(|(name, _)| name.as_str())
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(Vocabulary::default()).expect("built-in vocabulary compiles")
    }
}

fn compile(
    kind: &'static str,
    pattern: &str,
    case_insensitive: bool,
) -> Result<Regex, ExtractError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| ExtractError::Pattern {
            kind,
            pattern: pattern.to_string(),
            source,
        })
}
