use std::path::Path;

use job_market::aggregate::{self, Dimension};
use job_market::extract::FieldExtractor;
use job_market::filter::{FilterOptions, FilterSpec};
use job_market::ingest::page;
use job_market::model::{ExperienceLevel, JobRecord, WorkMode};
use job_market::record::RecordBuilder;
use job_market::report::Report;
use job_market::store;

fn load_fixture() -> Vec<JobRecord> {
    let fx = FieldExtractor::default();
    let builder = RecordBuilder::new(&fx);
    store::load_records(Path::new("tests/fixtures/dataset.csv"), &builder).unwrap()
}

#[test]
fn loader_dedups_and_drops_untitled_rows() {
    let records = load_fixture();
    let urls: Vec<&str> = records.iter().map(|r| r.job_url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://aijobs.ai/job/1",
            "https://aijobs.ai/job/2",
            "https://aijobs.ai/job/3",
            "https://aijobs.ai/job/4",
            "https://aijobs.ai/job/5",
        ]
    );
    assert_eq!(records[1].job_title, "Data Engineer");
    assert_eq!(records[0].job_description, "Train and ship models.\nFully remote.");
    assert_eq!(records[3].job_description, "Own the \"core\" platform.");
    assert_eq!(records[4].work_mode, WorkMode::Unspecified);
    assert_eq!(records[4].experience_level, ExperienceLevel::Unspecified);
    assert!(records[4].tech_stack.is_empty());
}

#[test]
fn filter_then_aggregate() {
    let all = load_fixture();

    let remote = FilterSpec::new().with_work_mode(WorkMode::Remote).apply(&all);
    assert_eq!(remote.len(), 2);
    let cmp = aggregate::compare(&all, &remote);
    assert_eq!(cmp.baseline.count, 5);
    assert_eq!(cmp.baseline.median_salary, Some(170_000.0));
    assert_eq!(cmp.filtered.mean_salary, Some(195_000.0));

    let top = aggregate::top_technologies(&all, 2);
    assert_eq!(top[0].value, "AWS");
    assert_eq!(top[0].count, 3);
    assert_eq!(top[1].value, "Python");

    let techs = aggregate::tech_salary_correlation(&all, 10);
    let names: Vec<&str> = techs.iter().map(|t| t.technology.as_str()).collect();
    assert_eq!(names, vec!["AWS", "Python"]);
    assert_eq!(techs[0].mean_salary, 170_000.0);
    assert_eq!(techs[1].mean_salary, 145_000.0);

    let by_location = aggregate::categorical_distribution(&all, Dimension::Location);
    assert_eq!(by_location[0].value, "San Francisco, CA");
    assert_eq!(by_location[0].count, 2);
    assert_eq!(by_location[1].value, "New York, NY");
}

#[test]
fn salary_filter_keeps_unsalaried_postings() {
    let all = load_fixture();
    let out = FilterSpec::new()
        .with_salary(100_000.0..=150_000.0)
        .apply(&all);
    let urls: Vec<&str> = out.iter().map(|r| r.job_url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://aijobs.ai/job/2",
            "https://aijobs.ai/job/3",
            "https://aijobs.ai/job/5",
        ]
    );
}

#[test]
fn options_and_report() {
    let all = load_fixture();
    let opts = FilterOptions::from_records(&all);
    assert_eq!(opts.locations, vec!["New York, NY", "Remote", "San Francisco, CA"]);
    assert_eq!(opts.max_tech_count, 3);
    assert_eq!(opts.salary_range, Some((120_000.0, 220_000.0)));

    let selected = FilterSpec::new().with_query("acme").apply(&all);
    let md = Report::build(&all, &selected, 5).render_markdown();
    assert!(md.contains("- Total postings: 2\n"));
    assert!(md.contains("### All postings vs filtered"));
    assert!(md.contains("| Filtered | 2 | $195,000 | $195,000 |"));
}

#[test]
fn export_round_trip() {
    let all = load_fixture();
    let selected = FilterSpec::new().with_technologies(["AWS"]).apply(&all);
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("export.csv");
    store::save_records(&out, &selected).unwrap();

    let fx = FieldExtractor::default();
    let reloaded = store::load_records(&out, &RecordBuilder::new(&fx)).unwrap();
    assert_eq!(reloaded, selected);
}

#[test]
fn scraped_page_becomes_record() {
    let html = std::fs::read_to_string("tests/fixtures/job_detail.html").unwrap();
    let raw = page::parse_job_page("https://aijobs.ai/job/ml-engineer-1", &html);
    let fx = FieldExtractor::default();
    let record = RecordBuilder::new(&fx).build_posting(&raw).unwrap();

    assert_eq!(record.company_name.as_deref(), Some("Acme AI"));
    assert_eq!(record.job_type.as_deref(), Some("Full Time"));
    assert_eq!(record.work_mode, WorkMode::Hybrid);
    assert_eq!(record.experience_level, ExperienceLevel::Senior);
    assert_eq!(
        record.tech_stack.iter().collect::<Vec<_>>(),
        vec!["Python", "AWS", "PyTorch"]
    );
    // Salary comes from the salary block; the description has none.
    assert_eq!(record.salary_min, Some(150_000.0));
    assert_eq!(record.salary_max, Some(190_000.0));
    assert_eq!(record.avg_salary, Some(170_000.0));
}
