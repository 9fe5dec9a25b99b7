//! Turns raw postings (scraped) and dataset rows (loaded) into `JobRecord`s.
//!
//! Both paths go through a [`RecordDraft`], where absent categorical values are
//! still `None`. Defaults are applied only by [`RecordDraft::finish`].

use tracing::debug;

use crate::extract::FieldExtractor;
use crate::model::{
    is_unspecified_location, DatasetRow, ExperienceLevel, JobRecord, RawPosting, TechStack,
    WorkMode, UNSPECIFIED_LOCATION,
};

/// Stored descriptions are cut to this many characters.
pub const DESCRIPTION_LIMIT: usize = 5000;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub job_url: String,
    pub job_title: String,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub job_description: String,
    pub job_type: Option<String>,
    pub work_mode: Option<WorkMode>,
    pub experience_level: Option<ExperienceLevel>,
    pub tech_stack: TechStack,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
}

impl RecordDraft {
    pub fn finish(self) -> JobRecord {
        let (salary_min, salary_max) = match (self.salary_min, self.salary_max) {
            (Some(a), Some(b)) if a > b => (Some(b), Some(a)),
            bounds => bounds,
        };
        let avg_salary = match (salary_min, salary_max) {
            (Some(min), Some(max)) => Some((min + max) / 2.0),
            _ => None,
        };

        JobRecord {
            job_url: self.job_url,
            job_title: self.job_title,
            company_name: self.company_name,
            location: self
                .location
                .unwrap_or_else(|| UNSPECIFIED_LOCATION.to_string()),
            job_description: self.job_description,
            job_type: self.job_type,
            work_mode: self.work_mode.unwrap_or(WorkMode::Unspecified),
            experience_level: self
                .experience_level
                .unwrap_or(ExperienceLevel::Unspecified),
            tech_stack: self.tech_stack,
            salary_min,
            salary_max,
            avg_salary,
        }
    }
}

pub struct RecordBuilder<'a> {
    extractor: &'a FieldExtractor,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(extractor: &'a FieldExtractor) -> Self {
        Self { extractor }
    }

    /// Draft from scraped fields. Postings without a url or title are dropped.
    pub fn draft_posting(&self, raw: &RawPosting) -> Option<RecordDraft> {
        let job_url = non_empty(Some(raw.job_url.as_str()))?;
        let Some(job_title) = non_empty(raw.job_title.as_deref()) else {
            debug!(url = %raw.job_url, "posting has no title, skipping");
            return None;
        };
        let description = raw.job_description.as_deref().unwrap_or("");
        let fx = self.extractor;

        let salary = fx.extract_salary_range(description).or_else(|| {
            raw.salary_text
                .as_deref()
                .and_then(|t| fx.extract_salary_range(t))
        });

        Some(RecordDraft {
            job_url,
            job_title,
            company_name: non_empty(raw.company_name.as_deref()),
            location: non_empty(raw.location.as_deref()),
            job_description: truncate_chars(description, DESCRIPTION_LIMIT),
            job_type: non_empty(raw.job_type.as_deref()),
            work_mode: Some(fx.detect_work_mode(description)),
            experience_level: Some(fx.extract_experience_level(description)),
            tech_stack: fx.extract_tech_stack(description),
            salary_min: salary.map(|s| s.min as f64),
            salary_max: salary.map(|s| s.max as f64),
        })
    }

    /// Draft from a loaded dataset row. Categorical labels are parsed, not
    /// re-extracted; unrecognized labels count as absent and technologies
    /// outside the vocabulary are dropped.
    pub fn draft_row(&self, row: &DatasetRow) -> Option<RecordDraft> {
        let job_url = non_empty(row.job_url.as_deref())?;
        let job_title = non_empty(row.job_title.as_deref())?;

        let work_mode = row.work_mode.as_deref().and_then(|label| {
            let parsed = WorkMode::from_label(label);
            if parsed.is_none() {
                debug!(url = %job_url, label, "unknown work mode label");
            }
            parsed
        });
        let experience_level = row.experience_level.as_deref().and_then(|label| {
            let parsed = ExperienceLevel::from_label(label);
            if parsed.is_none() {
                debug!(url = %job_url, label, "unknown experience level label");
            }
            parsed
        });

        let location =
            non_empty(row.location.as_deref()).filter(|l| !is_unspecified_location(l));

        let mut tech_stack = TechStack::new();
        if let Some(joined) = row.tech_stack.as_deref() {
            for name in TechStack::parse_joined(joined).iter() {
                match self.extractor.canonical_technology(name) {
                    Some(known) => {
                        tech_stack.insert(known);
                    }
                    None => debug!(url = %job_url, name, "dropping unknown technology"),
                }
            }
        }

        Some(RecordDraft {
            job_title,
            company_name: non_empty(row.company_name.as_deref()),
            location,
            job_description: truncate_chars(
                row.job_description.as_deref().unwrap_or(""),
                DESCRIPTION_LIMIT,
            ),
            job_type: non_empty(row.job_type.as_deref()),
            work_mode,
            experience_level,
            tech_stack,
            salary_min: parse_salary(row.salary_min.as_deref()),
            salary_max: parse_salary(row.salary_max.as_deref()),
            job_url,
        })
    }

    pub fn build_posting(&self, raw: &RawPosting) -> Option<JobRecord> {
        self.draft_posting(raw).map(RecordDraft::finish)
    }

    pub fn build_row(&self, row: &DatasetRow) -> Option<JobRecord> {
        self.draft_row(row).map(RecordDraft::finish)
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Non-negative finite number, or absent.
fn parse_salary(s: Option<&str>) -> Option<f64> {
    let value: f64 = s?.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(description: &str) -> RawPosting {
        RawPosting {
            job_url: "https://aijobs.ai/job/1".into(),
            job_title: Some("Senior ML Engineer".into()),
            company_name: Some("Acme".into()),
            location: None,
            job_type: Some("Full Time".into()),
            job_description: Some(description.into()),
            salary_text: None,
        }
    }

    #[test]
    fn scraped_posting_gets_extracted_fields() {
        let fx = FieldExtractor::default();
        let rec = RecordBuilder::new(&fx)
            .build_posting(&posting("Senior role, fully remote. Python, AWS. $150-180k"))
            .unwrap();
        assert_eq!(rec.work_mode, WorkMode::Remote);
        assert_eq!(rec.experience_level, ExperienceLevel::Senior);
        assert_eq!(rec.tech_stack.iter().collect::<Vec<_>>(), vec!["Python", "AWS"]);
        assert_eq!(rec.salary_min, Some(150_000.0));
        assert_eq!(rec.salary_max, Some(180_000.0));
        assert_eq!(rec.avg_salary, Some(165_000.0));
        assert_eq!(rec.location, UNSPECIFIED_LOCATION);
        assert_eq!(rec.tech_count(), 2);
    }

    #[test]
    fn salary_falls_back_to_salary_block() {
        let fx = FieldExtractor::default();
        let mut raw = posting("No pay info in the body");
        raw.salary_text = Some("Salary $90k - $110k".into());
        let rec = RecordBuilder::new(&fx).build_posting(&raw).unwrap();
        assert_eq!(rec.avg_salary, Some(100_000.0));
    }

    #[test]
    fn untitled_posting_is_dropped() {
        let fx = FieldExtractor::default();
        let mut raw = posting("anything");
        raw.job_title = Some("   ".into());
        assert!(RecordBuilder::new(&fx).build_posting(&raw).is_none());
        raw.job_title = Some("Engineer".into());
        raw.job_url = String::new();
        assert!(RecordBuilder::new(&fx).build_posting(&raw).is_none());
    }

    #[test]
    fn description_is_truncated_but_fully_scanned() {
        let fx = FieldExtractor::default();
        let long = format!("{} Kafka", "é".repeat(DESCRIPTION_LIMIT + 10));
        let rec = RecordBuilder::new(&fx).build_posting(&posting(&long)).unwrap();
        assert_eq!(rec.job_description.chars().count(), DESCRIPTION_LIMIT);
        assert!(rec.tech_stack.contains("Kafka"));
    }

    #[test]
    fn row_absence_differs_from_explicit_unspecified() {
        let fx = FieldExtractor::default();
        let builder = RecordBuilder::new(&fx);
        let mut row = DatasetRow {
            job_title: Some("Dev".into()),
            job_url: Some("u1".into()),
            ..DatasetRow::default()
        };

        let draft = builder.draft_row(&row).unwrap();
        assert_eq!(draft.work_mode, None);
        assert_eq!(draft.location, None);

        row.work_mode = Some("Unspecified".into());
        let draft = builder.draft_row(&row).unwrap();
        assert_eq!(draft.work_mode, Some(WorkMode::Unspecified));

        let rec = draft.finish();
        assert_eq!(rec.work_mode, WorkMode::Unspecified);
        assert_eq!(rec.experience_level, ExperienceLevel::Unspecified);
        assert_eq!(rec.location, UNSPECIFIED_LOCATION);
    }

    #[test]
    fn row_numbers_and_tech_stack() {
        let fx = FieldExtractor::default();
        let row = DatasetRow {
            job_title: Some("Dev".into()),
            job_url: Some("u1".into()),
            work_mode: Some("Hybrid".into()),
            salary_min: Some("70000.0".into()),
            salary_max: Some("nan".into()),
            avg_salary: Some("0".into()),
            tech_stack: Some("Rust, Go, ".into()),
            ..DatasetRow::default()
        };
        let rec = RecordBuilder::new(&fx).build_row(&row).unwrap();
        assert_eq!(rec.work_mode, WorkMode::Hybrid);
        assert_eq!(rec.salary_min, Some(70_000.0));
        assert_eq!(rec.salary_max, None);
        assert_eq!(rec.avg_salary, None);
        assert_eq!(rec.tech_stack.joined(), "Rust, Go");
    }

    #[test]
    fn row_tech_stack_keeps_vocabulary_names_only() {
        let fx = FieldExtractor::default();
        let row = DatasetRow {
            job_title: Some("Dev".into()),
            job_url: Some("u1".into()),
            tech_stack: Some("Zig, python, COBOL, Python, Node.js".into()),
            ..DatasetRow::default()
        };
        let rec = RecordBuilder::new(&fx).build_row(&row).unwrap();
        assert_eq!(rec.tech_stack.iter().collect::<Vec<_>>(), vec!["Python", "Node.js"]);
    }

    #[test]
    fn legacy_location_label_is_unspecified() {
        let fx = FieldExtractor::default();
        let builder = RecordBuilder::new(&fx);
        for label in ["Non spécifiée", "non spécifié", "Unspecified location"] {
            let row = DatasetRow {
                job_title: Some("Dev".into()),
                job_url: Some("u1".into()),
                location: Some(label.into()),
                ..DatasetRow::default()
            };
            assert_eq!(builder.draft_row(&row).unwrap().location, None);
            assert_eq!(builder.build_row(&row).unwrap().location, UNSPECIFIED_LOCATION);
        }
    }

    #[test]
    fn row_job_type_is_kept() {
        let fx = FieldExtractor::default();
        let row = DatasetRow {
            job_title: Some("Dev".into()),
            job_url: Some("u1".into()),
            job_type: Some(" Contract ".into()),
            ..DatasetRow::default()
        };
        let rec = RecordBuilder::new(&fx).build_row(&row).unwrap();
        assert_eq!(rec.job_type.as_deref(), Some("Contract"));
    }

    #[test]
    fn negative_salary_is_absent() {
        assert_eq!(parse_salary(Some("-5")), None);
        assert_eq!(parse_salary(Some("")), None);
        assert_eq!(parse_salary(Some(" 42 ")), Some(42.0));
    }

    #[test]
    fn inverted_bounds_are_ordered() {
        let draft = RecordDraft {
            job_url: "u".into(),
            job_title: "t".into(),
            company_name: None,
            location: None,
            job_description: String::new(),
            job_type: None,
            work_mode: None,
            experience_level: None,
            tech_stack: TechStack::new(),
            salary_min: Some(100_000.0),
            salary_max: Some(80_000.0),
        };
        let rec = draft.finish();
        assert_eq!(rec.salary_min, Some(80_000.0));
        assert_eq!(rec.salary_max, Some(100_000.0));
        assert_eq!(rec.avg_salary, Some(90_000.0));
    }
}
