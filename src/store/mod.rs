//! The dataset CSV: header-addressed columns, one posting per row.

pub mod csv;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::model::{DatasetRow, JobRecord};
use crate::record::RecordBuilder;

/// Column order written by [`save_records`].
pub const COLUMNS: [&str; 12] = [
    "job_title",
    "company_name",
    "location",
    "work_mode",
    "experience_level",
    "salary_min",
    "salary_max",
    "avg_salary",
    "tech_stack",
    "job_description",
    "job_url",
    "job_type",
];

/// Older datasets stored the joined tech stack under this header.
const TECH_STACK_ALIAS: &str = "tech_stack_str";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("dataset is missing required column {0:?}")]
    MissingColumn(&'static str),
}

impl StoreError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Parse dataset text into rows. Columns are found by header name, so their
/// order and any extra columns do not matter.
pub fn parse_dataset(text: &str) -> Result<Vec<DatasetRow>, StoreError> {
    let mut rows = csv::parse_rows(text).into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };

    let index: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim(), i))
        .collect();
    for required in ["job_url", "job_title"] {
        if !index.contains_key(required) {
            return Err(StoreError::MissingColumn(required));
        }
    }
    let tech_column = index
        .get("tech_stack")
        .or_else(|| index.get(TECH_STACK_ALIAS))
        .copied();

    let col = |fields: &[String], name: &str| -> Option<String> {
        cell(fields, index.get(name).copied())
    };

    Ok(rows
        .map(|fields| DatasetRow {
            job_title: col(&fields, "job_title"),
            company_name: col(&fields, "company_name"),
            location: col(&fields, "location"),
            work_mode: col(&fields, "work_mode"),
            experience_level: col(&fields, "experience_level"),
            salary_min: col(&fields, "salary_min"),
            salary_max: col(&fields, "salary_max"),
            avg_salary: col(&fields, "avg_salary"),
            tech_stack: cell(&fields, tech_column),
            job_description: col(&fields, "job_description"),
            job_url: col(&fields, "job_url"),
            job_type: col(&fields, "job_type"),
        })
        .collect())
}

fn cell(fields: &[String], idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| fields.get(i))
        .filter(|v| !v.is_empty())
        .cloned()
}

/// Build records from dataset text. Rows without url or title are dropped;
/// for a repeated url the first row wins.
pub fn read_records(text: &str, builder: &RecordBuilder) -> Result<Vec<JobRecord>, StoreError> {
    let rows = parse_dataset(text)?;
    let total = rows.len();
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(total);

    for row in &rows {
        let Some(record) = builder.build_row(row) else {
            debug!(url = ?row.job_url, "dropping row without url or title");
            continue;
        };
        if !seen.insert(record.job_url.clone()) {
            debug!(url = %record.job_url, "duplicate url, keeping first");
            continue;
        }
        records.push(record);
    }

    if records.len() < total {
        info!("Kept {} of {} dataset rows", records.len(), total);
    }
    Ok(records)
}

pub fn load_records(path: &Path, builder: &RecordBuilder) -> Result<Vec<JobRecord>, StoreError> {
    let text = fs::read_to_string(path).map_err(StoreError::io(path))?;
    let records = read_records(&text, builder)?;
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Dataset text for `records`, header first, in [`COLUMNS`] order.
pub fn write_records(records: &[JobRecord]) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = csv::write_row(&mut buf, &COLUMNS);
    for record in records {
        let _ = csv::write_row(&mut buf, &to_fields(record));
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write `records` to `path`, creating parent directories as needed.
pub fn save_records(path: &Path, records: &[JobRecord]) -> Result<(), StoreError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(StoreError::io(dir))?;
    }
    fs::write(path, write_records(records)).map_err(StoreError::io(path))?;
    info!("Saved {} records to {}", records.len(), path.display());
    Ok(())
}

fn to_fields(r: &JobRecord) -> [String; 12] {
    let num = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    [
        r.job_title.clone(),
        r.company_name.clone().unwrap_or_default(),
        r.location.clone(),
        r.work_mode.label().to_string(),
        r.experience_level.label().to_string(),
        num(r.salary_min),
        num(r.salary_max),
        num(r.avg_salary),
        r.tech_stack.joined(),
        r.job_description.clone(),
        r.job_url.clone(),
        r.job_type.clone().unwrap_or_default(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::FieldExtractor;
    use crate::model::{ExperienceLevel, TechStack, WorkMode, UNSPECIFIED_LOCATION};

    fn record(url: &str) -> JobRecord {
        JobRecord {
            job_url: url.into(),
            job_title: "Data Engineer, Platform".into(),
            company_name: Some("Acme \"AI\"".into()),
            location: "Paris, France".into(),
            job_description: "Pipelines in Python.\nKafka, Spark.".into(),
            job_type: None,
            work_mode: WorkMode::OnSite,
            experience_level: ExperienceLevel::LeadPrincipal,
            tech_stack: ["Python", "Kafka"].into_iter().collect::<TechStack>(),
            salary_min: Some(60_000.0),
            salary_max: Some(80_000.0),
            avg_salary: Some(70_000.0),
        }
    }

    #[test]
    fn save_then_load_preserves_records() {
        let fx = FieldExtractor::default();
        let builder = RecordBuilder::new(&fx);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("jobs.csv");

        let mut second = record("https://jobs.example/2");
        second.company_name = None;
        second.salary_min = None;
        second.salary_max = None;
        second.avg_salary = None;
        second.tech_stack = TechStack::new();
        let mut first = record("https://jobs.example/1");
        first.job_type = Some("Full Time".into());
        let records = vec![first, second];

        save_records(&path, &records).unwrap();
        let loaded = load_records(&path, &builder).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn header_order_alias_and_legacy_labels() {
        let fx = FieldExtractor::default();
        let builder = RecordBuilder::new(&fx);
        let text = "\
job_url,extra,job_title,tech_stack_str,work_mode,experience_level,salary_min,salary_max,avg_salary,location
u1,x,ML Engineer,\"Python, PyTorch\",Non spécifié,Senior,90000.0,110000.0,1,
u2,x,,Go,Remote,Junior,,,,Lyon
u1,x,Duplicate,Go,Remote,Junior,,,,Lyon
u3,x,Analyst,,Hybrid,Wizard,nan,50000,,Lyon
";
        let records = read_records(text, &builder).unwrap();
        assert_eq!(records.len(), 2);

        let ml = &records[0];
        assert_eq!(ml.job_title, "ML Engineer");
        assert_eq!(ml.tech_stack.iter().collect::<Vec<_>>(), vec!["Python", "PyTorch"]);
        assert_eq!(ml.work_mode, WorkMode::Unspecified);
        assert_eq!(ml.location, UNSPECIFIED_LOCATION);
        // Stored average is ignored in favour of the bounds.
        assert_eq!(ml.avg_salary, Some(100_000.0));
        assert_eq!(ml.job_type, None);

        let analyst = &records[1];
        assert_eq!(analyst.experience_level, ExperienceLevel::Unspecified);
        assert_eq!(analyst.salary_min, None);
        assert_eq!(analyst.salary_max, Some(50_000.0));
        assert_eq!(analyst.avg_salary, None);
    }

    #[test]
    fn off_vocabulary_technologies_are_dropped_on_load() {
        let fx = FieldExtractor::default();
        let builder = RecordBuilder::new(&fx);
        let text = "job_url,job_title,tech_stack\nu1,Dev,\"Zig, COBOL, Python\"\n";
        let records = read_records(text, &builder).unwrap();
        assert_eq!(records[0].tech_stack.iter().collect::<Vec<_>>(), vec!["Python"]);
    }

    #[test]
    fn missing_required_column() {
        let err = parse_dataset("job_title,location\nA,B\n").unwrap_err();
        assert!(matches!(err, StoreError::MissingColumn("job_url")));
    }

    #[test]
    fn empty_file_has_no_rows() {
        assert!(parse_dataset("").unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let fx = FieldExtractor::default();
        let builder = RecordBuilder::new(&fx);
        let err = load_records(Path::new("/definitely/not/here.csv"), &builder).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn written_header_matches_columns() {
        let text = write_records(&[]);
        assert_eq!(text, format!("{}\n", COLUMNS.join(",")));
    }
}
