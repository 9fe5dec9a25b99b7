use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use serde::Serialize;

use crate::model::{ExperienceLevel, JobRecord, WorkMode};

/// Conjunction of optional predicates over `JobRecord`s.
///
/// Built once from the user's selections and never mutated; every `with_*`
/// call returns a new spec.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    query: Option<String>,
    work_mode: Option<WorkMode>,
    experience_level: Option<ExperienceLevel>,
    location: Option<String>,
    technologies: Vec<String>,
    tech_count: Option<RangeInclusive<usize>>,
    salary: Option<RangeInclusive<f64>>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring over title, company and description.
    /// A blank query adds no predicate.
    pub fn with_query(self, query: impl Into<String>) -> Self {
        let query = query.into().trim().to_lowercase();
        Self {
            query: (!query.is_empty()).then_some(query),
            ..self
        }
    }

    pub fn with_work_mode(self, mode: WorkMode) -> Self {
        Self {
            work_mode: Some(mode),
            ..self
        }
    }

    pub fn with_experience_level(self, level: ExperienceLevel) -> Self {
        Self {
            experience_level: Some(level),
            ..self
        }
    }

    pub fn with_location(self, location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..self
        }
    }

    /// Keep records mentioning any of `techs`. An empty selection adds no predicate.
    pub fn with_technologies<I, S>(self, techs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            technologies: techs.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn with_tech_count(self, range: RangeInclusive<usize>) -> Self {
        Self {
            tech_count: Some(range),
            ..self
        }
    }

    /// Records without a salary always pass this predicate.
    pub fn with_salary(self, range: RangeInclusive<f64>) -> Self {
        Self {
            salary: Some(range),
            ..self
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, record: &JobRecord) -> bool {
        if let Some(q) = &self.query {
            let hit = record.job_title.to_lowercase().contains(q)
                || record
                    .company_name
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(q))
                || record.job_description.to_lowercase().contains(q);
            if !hit {
                return false;
            }
        }
        if self.work_mode.is_some_and(|m| m != record.work_mode) {
            return false;
        }
        if self
            .experience_level
            .is_some_and(|l| l != record.experience_level)
        {
            return false;
        }
        if self
            .location
            .as_deref()
            .is_some_and(|l| l != record.location)
        {
            return false;
        }
        if !self.technologies.is_empty()
            && !self
                .technologies
                .iter()
                .any(|t| record.tech_stack.contains(t))
        {
            return false;
        }
        if let Some(range) = &self.tech_count {
            if !range.contains(&record.tech_count()) {
                return false;
            }
        }
        if let (Some(range), Some(salary)) = (&self.salary, record.avg_salary) {
            if !range.contains(&salary) {
                return false;
            }
        }
        true
    }

    /// Order-preserving selection of the matching records.
    pub fn apply(&self, records: &[JobRecord]) -> Vec<JobRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Choices a UI offers for building a [`FilterSpec`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub work_modes: Vec<String>,
    pub experience_levels: Vec<String>,
    pub locations: Vec<String>,
    pub technologies: Vec<String>,
    pub max_tech_count: usize,
    pub salary_range: Option<(f64, f64)>,
}

impl FilterOptions {
    pub fn from_records(records: &[JobRecord]) -> Self {
        let salary_range = records.iter().filter_map(|r| r.avg_salary).fold(
            None,
            |acc: Option<(f64, f64)>, s| match acc {
                Some((lo, hi)) => Some((lo.min(s), hi.max(s))),
                None => Some((s, s)),
            },
        );

        Self {
            work_modes: sorted_unique(records.iter().map(|r| r.work_mode.label())),
            experience_levels: sorted_unique(records.iter().map(|r| r.experience_level.label())),
            locations: sorted_unique(records.iter().map(|r| r.location.as_str())),
            technologies: sorted_unique(records.iter().flat_map(|r| r.tech_stack.iter())),
            max_tech_count: records.iter().map(JobRecord::tech_count).max().unwrap_or(0),
            salary_range,
        }
    }
}

fn sorted_unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TechStack;

    fn rec(url: &str, title: &str, techs: &[&str], salary: Option<f64>) -> JobRecord {
        JobRecord {
            job_url: url.into(),
            job_title: title.into(),
            company_name: Some("Initech".into()),
            location: "Berlin".into(),
            job_description: "Build things".into(),
            job_type: None,
            work_mode: WorkMode::Remote,
            experience_level: ExperienceLevel::Senior,
            tech_stack: techs.iter().copied().collect::<TechStack>(),
            salary_min: salary,
            salary_max: salary,
            avg_salary: salary,
        }
    }

    fn sample() -> Vec<JobRecord> {
        vec![
            rec("1", "Backend Engineer", &["Go", "Kafka"], Some(90_000.0)),
            rec("2", "Data Scientist", &["Python"], None),
            rec("3", "Frontend Engineer", &["React", "TypeScript", "AWS"], Some(60_000.0)),
        ]
    }

    fn urls(records: &[JobRecord]) -> Vec<&str> {
        records.iter().map(|r| r.job_url.as_str()).collect()
    }

    #[test]
    fn empty_spec_is_identity() {
        let records = sample();
        let spec = FilterSpec::new();
        assert!(spec.is_empty());
        assert_eq!(spec.apply(&records), records);
    }

    #[test]
    fn blank_query_is_no_predicate() {
        assert!(FilterSpec::new().with_query("   ").is_empty());
    }

    #[test]
    fn query_searches_title_company_description() {
        let records = sample();
        assert_eq!(urls(&FilterSpec::new().with_query("ENGINEER").apply(&records)), vec!["1", "3"]);
        assert_eq!(urls(&FilterSpec::new().with_query("initech").apply(&records)).len(), 3);
        assert_eq!(urls(&FilterSpec::new().with_query("build").apply(&records)).len(), 3);
        assert!(FilterSpec::new().with_query("cobol").apply(&records).is_empty());
    }

    #[test]
    fn salary_range_keeps_missing_salaries() {
        let records = sample();
        let out = FilterSpec::new()
            .with_salary(80_000.0..=100_000.0)
            .apply(&records);
        assert_eq!(urls(&out), vec!["1", "2"]);
        let out = FilterSpec::new().with_salary(0.0..=1.0).apply(&records);
        assert_eq!(urls(&out), vec!["2"]);
    }

    #[test]
    fn technologies_are_ored_dimensions_are_anded() {
        let records = sample();
        let spec = FilterSpec::new().with_technologies(["Python", "React"]);
        assert_eq!(urls(&spec.apply(&records)), vec!["2", "3"]);

        let spec = spec.with_tech_count(2..=5);
        assert_eq!(urls(&spec.apply(&records)), vec!["3"]);

        let spec = spec.with_work_mode(WorkMode::Hybrid);
        assert!(spec.apply(&records).is_empty());
    }

    #[test]
    fn categorical_equality() {
        let mut records = sample();
        records[1].location = "Lyon".into();
        records[2].experience_level = ExperienceLevel::Junior;
        assert_eq!(urls(&FilterSpec::new().with_location("Lyon").apply(&records)), vec!["2"]);
        assert_eq!(
            urls(&FilterSpec::new()
                .with_experience_level(ExperienceLevel::Senior)
                .apply(&records)),
            vec!["1", "2"]
        );
    }

    #[test]
    fn filtering_empty_collection() {
        let spec = FilterSpec::new().with_query("x").with_salary(1.0..=2.0);
        assert!(spec.apply(&[]).is_empty());
    }

    #[test]
    fn options_from_records() {
        let opts = FilterOptions::from_records(&sample());
        assert_eq!(opts.technologies, vec!["AWS", "Go", "Kafka", "Python", "React", "TypeScript"]);
        assert_eq!(opts.max_tech_count, 3);
        assert_eq!(opts.salary_range, Some((60_000.0, 90_000.0)));
        assert_eq!(opts.work_modes, vec!["Remote"]);
        assert_eq!(FilterOptions::from_records(&[]), FilterOptions::default());
    }
}
