//! Reducers over a record collection.
//!
//! All of them accept an empty slice and return an empty (or all-`None`)
//! result. Grouped outputs keep discovery order unless stated otherwise, and
//! every sort is stable so ties stay in first-encountered order.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{ExperienceLevel, JobRecord, WorkMode};
use crate::stats;

/// Categorical field of a record that can be grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dimension {
    WorkMode,
    ExperienceLevel,
    Location,
    Company,
    JobType,
}

impl Dimension {
    /// Value of this dimension for `record`; `None` when the field is absent.
    pub fn value<'r>(self, record: &'r JobRecord) -> Option<&'r str> {
        match self {
            Dimension::WorkMode => Some(record.work_mode.label()),
            Dimension::ExperienceLevel => Some(record.experience_level.label()),
            Dimension::Location => Some(record.location.as_str()),
            Dimension::Company => record.company_name.as_deref(),
            Dimension::JobType => record.job_type.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Count {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryGroup {
    pub value: String,
    pub samples: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechSalary {
    pub technology: String,
    pub mean_salary: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanySalary {
    pub company: String,
    pub mean_salary: f64,
    pub postings: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub count: usize,
    pub median_salary: Option<f64>,
    pub mean_salary: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub baseline: Snapshot,
    pub filtered: Snapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub total: usize,
    pub median_salary: Option<f64>,
    pub companies: usize,
    pub remote: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub tech_count: usize,
    pub avg_salary: f64,
    pub job_title: String,
    pub company_name: Option<String>,
}

/// Count per distinct value, most frequent first.
pub fn categorical_distribution(records: &[JobRecord], dimension: Dimension) -> Vec<Count> {
    most_common(tally(records.iter().filter_map(|r| dimension.value(r))), None)
}

/// Experience counts in canonical level order, levels absent from the data omitted.
pub fn experience_distribution(records: &[JobRecord]) -> Vec<Count> {
    ExperienceLevel::ORDER
        .iter()
        .map(|level| Count {
            value: level.label().to_string(),
            count: records
                .iter()
                .filter(|r| r.experience_level == *level)
                .count(),
        })
        .filter(|c| c.count > 0)
        .collect()
}

pub fn top_technologies(records: &[JobRecord], n: usize) -> Vec<Count> {
    most_common(
        tally(records.iter().flat_map(|r| r.tech_stack.iter())),
        Some(n),
    )
}

pub fn top_locations(records: &[JobRecord], n: usize) -> Vec<Count> {
    most_common(tally(records.iter().map(|r| r.location.as_str())), Some(n))
}

/// Raw salary samples per group, for records that have a salary.
///
/// Experience level groups come out in canonical level order.
pub fn salary_by_dimension(records: &[JobRecord], dimension: Dimension) -> Vec<SalaryGroup> {
    let mut groups: Vec<SalaryGroup> = group_samples(records, |r| dimension.value(r))
        .into_iter()
        .map(|(value, samples)| SalaryGroup {
            value: value.to_string(),
            samples,
        })
        .collect();

    if dimension == Dimension::ExperienceLevel {
        groups.sort_by_key(|g| {
            ExperienceLevel::from_label(&g.value)
                .and_then(|level| ExperienceLevel::ORDER.iter().position(|l| *l == level))
                .unwrap_or(ExperienceLevel::ORDER.len())
        });
    }
    groups
}

/// Mean salary per technology, keeping technologies seen in at least two
/// salaried records, highest mean first.
pub fn tech_salary_correlation(records: &[JobRecord], n: usize) -> Vec<TechSalary> {
    const MIN_SAMPLES: usize = 2;

    let mut out: Vec<TechSalary> = group_samples(records, |r| r.tech_stack.iter())
        .into_iter()
        .filter(|(_, samples)| samples.len() >= MIN_SAMPLES)
        .filter_map(|(tech, samples)| {
            Some(TechSalary {
                technology: tech.to_string(),
                mean_salary: stats::mean(&samples)?,
                samples: samples.len(),
            })
        })
        .collect();
    out.sort_by(|a, b| b.mean_salary.total_cmp(&a.mean_salary));
    out.truncate(n);
    out
}

pub fn top_companies_by_salary(records: &[JobRecord], n: usize) -> Vec<CompanySalary> {
    let mut out: Vec<CompanySalary> = group_samples(records, |r| r.company_name.as_deref())
        .into_iter()
        .filter_map(|(company, samples)| {
            Some(CompanySalary {
                company: company.to_string(),
                mean_salary: stats::mean(&samples)?,
                postings: samples.len(),
            })
        })
        .collect();
    out.sort_by(|a, b| b.mean_salary.total_cmp(&a.mean_salary));
    out.truncate(n);
    out
}

pub fn snapshot(records: &[JobRecord]) -> Snapshot {
    let salaries = salaries(records);
    Snapshot {
        count: records.len(),
        median_salary: stats::median(&salaries),
        mean_salary: stats::mean(&salaries),
    }
}

/// Counts and salary central tendency before and after filtering.
pub fn compare(baseline: &[JobRecord], filtered: &[JobRecord]) -> Comparison {
    Comparison {
        baseline: snapshot(baseline),
        filtered: snapshot(filtered),
    }
}

pub fn key_metrics(records: &[JobRecord]) -> KeyMetrics {
    let companies = tally(records.iter().filter_map(|r| r.company_name.as_deref())).len();
    KeyMetrics {
        total: records.len(),
        median_salary: stats::median(&salaries(records)),
        companies,
        remote: records
            .iter()
            .filter(|r| r.work_mode == WorkMode::Remote)
            .count(),
    }
}

/// Salaried records with at least one technology, as (tech count, salary) points.
pub fn salary_vs_tech_count(records: &[JobRecord]) -> Vec<ScatterPoint> {
    records
        .iter()
        .filter(|r| r.tech_count() > 0)
        .filter_map(|r| {
            Some(ScatterPoint {
                tech_count: r.tech_count(),
                avg_salary: r.avg_salary?,
                job_title: r.job_title.clone(),
                company_name: r.company_name.clone(),
            })
        })
        .collect()
}

pub fn salaries(records: &[JobRecord]) -> Vec<f64> {
    records.iter().filter_map(|r| r.avg_salary).collect()
}

/// Occurrence counts in first-seen order.
fn tally<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for v in values {
        match index.get(v) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(v, counts.len());
                counts.push((v, 1));
            }
        }
    }
    counts
}

fn most_common(mut counts: Vec<(&str, usize)>, n: Option<usize>) -> Vec<Count> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    if let Some(n) = n {
        counts.truncate(n);
    }
    counts
        .into_iter()
        .map(|(value, count)| Count {
            value: value.to_string(),
            count,
        })
        .collect()
}

/// Salary samples per key over salaried records, keys in first-seen order.
fn group_samples<'a, F, I>(records: &'a [JobRecord], keys: F) -> Vec<(&'a str, Vec<f64>)>
where
    F: Fn(&'a JobRecord) -> I,
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();
    for record in records {
        let Some(salary) = record.avg_salary else {
            continue;
        };
        for key in keys(record) {
            match index.get(key) {
                Some(&i) => groups[i].1.push(salary),
                None => {
                    index.insert(key, groups.len());
                    groups.push((key, vec![salary]));
                }
            }
        }
    }
    groups
}
