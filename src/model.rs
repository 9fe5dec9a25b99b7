use std::fmt;

use serde::{Deserialize, Serialize};

pub const UNSPECIFIED_LOCATION: &str = "Unspecified location";

/// French "unspecified" labels found in older datasets.
const LEGACY_UNSPECIFIED: &[&str] = &["non spécifié", "non spécifiée", "non specifie"];

/// Whether a stored location value stands for "no location".
pub fn is_unspecified_location(label: &str) -> bool {
    let lower = label.trim().to_lowercase();
    lower == UNSPECIFIED_LOCATION.to_lowercase() || LEGACY_UNSPECIFIED.contains(&lower.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorkMode {
    Remote,
    Hybrid,
    #[serde(rename = "On-site")]
    OnSite,
    Unspecified,
}

impl WorkMode {
    pub const ALL: [WorkMode; 4] = [
        WorkMode::Remote,
        WorkMode::Hybrid,
        WorkMode::OnSite,
        WorkMode::Unspecified,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WorkMode::Remote => "Remote",
            WorkMode::Hybrid => "Hybrid",
            WorkMode::OnSite => "On-site",
            WorkMode::Unspecified => "Unspecified",
        }
    }

    /// Parse a stored label. `None` means the label is not recognized.
    pub fn from_label(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        if LEGACY_UNSPECIFIED.contains(&lower.as_str()) {
            return Some(WorkMode::Unspecified);
        }
        match lower.as_str() {
            "remote" => Some(WorkMode::Remote),
            "hybrid" => Some(WorkMode::Hybrid),
            "on-site" | "onsite" | "on site" => Some(WorkMode::OnSite),
            "unspecified" => Some(WorkMode::Unspecified),
            _ => None,
        }
    }
}

impl fmt::Display for WorkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Junior,
    #[serde(rename = "Mid-level")]
    MidLevel,
    Senior,
    #[serde(rename = "Lead/Principal")]
    LeadPrincipal,
    Unspecified,
}

impl ExperienceLevel {
    /// Canonical display order, also the detection priority for the first four.
    pub const ORDER: [ExperienceLevel; 5] = [
        ExperienceLevel::Junior,
        ExperienceLevel::MidLevel,
        ExperienceLevel::Senior,
        ExperienceLevel::LeadPrincipal,
        ExperienceLevel::Unspecified,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ExperienceLevel::Junior => "Junior",
            ExperienceLevel::MidLevel => "Mid-level",
            ExperienceLevel::Senior => "Senior",
            ExperienceLevel::LeadPrincipal => "Lead/Principal",
            ExperienceLevel::Unspecified => "Unspecified",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        if LEGACY_UNSPECIFIED.contains(&lower.as_str()) {
            return Some(ExperienceLevel::Unspecified);
        }
        match lower.as_str() {
            "junior" => Some(ExperienceLevel::Junior),
            "mid-level" | "mid level" => Some(ExperienceLevel::MidLevel),
            "senior" => Some(ExperienceLevel::Senior),
            "lead/principal" | "lead" | "principal" => Some(ExperienceLevel::LeadPrincipal),
            "unspecified" => Some(ExperienceLevel::Unspecified),
            _ => None,
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Ordered set of technology names. Keeps first-insertion order so that
/// frequency ties resolve deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechStack(Vec<String>);

impl TechStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `tech` unless already present. Returns whether it was added.
    pub fn insert(&mut self, tech: impl Into<String>) -> bool {
        let tech = tech.into();
        if self.contains(&tech) {
            return false;
        }
        self.0.push(tech);
        true
    }

    pub fn contains(&self, tech: &str) -> bool {
        self.0.iter().any(|t| t == tech)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the comma-joined storage form: entries trimmed, empties dropped.
    pub fn parse_joined(s: &str) -> Self {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub fn joined(&self) -> String {
        self.0.join(", ")
    }
}

impl<S: Into<String>> FromIterator<S> for TechStack {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut stack = TechStack::new();
        for tech in iter {
            stack.insert(tech);
        }
        stack
    }
}

/// Salary bounds parsed from text, in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalaryRange {
    pub min: u64,
    pub max: u64,
}

/// One normalized posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_url: String,
    pub job_title: String,
    pub company_name: Option<String>,
    pub location: String,
    pub job_description: String,
    pub job_type: Option<String>,
    pub work_mode: WorkMode,
    pub experience_level: ExperienceLevel,
    pub tech_stack: TechStack,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub avg_salary: Option<f64>,
}

impl JobRecord {
    pub fn tech_count(&self) -> usize {
        self.tech_stack.len()
    }
}

/// Raw fields of one scraped posting, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPosting {
    pub job_url: String,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub job_description: Option<String>,
    /// Text of a dedicated salary block, if the page has one.
    pub salary_text: Option<String>,
}

/// One row of the flat tabular dataset, each cell as read (empty cells are `None`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetRow {
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub work_mode: Option<String>,
    pub experience_level: Option<String>,
    pub salary_min: Option<String>,
    pub salary_max: Option<String>,
    pub avg_salary: Option<String>,
    pub tech_stack: Option<String>,
    pub job_description: Option<String>,
    pub job_url: Option<String>,
    pub job_type: Option<String>,
}
