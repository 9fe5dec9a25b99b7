use std::cmp::Ordering;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use job_market::conf::Settings;
use job_market::extract::{FieldExtractor, Vocabulary};
use job_market::filter::{FilterOptions, FilterSpec};
use job_market::ingest::Fetcher;
use job_market::model::{ExperienceLevel, JobRecord, WorkMode};
use job_market::record::RecordBuilder;
use job_market::report::{money, money_or_na, Report};
use job_market::store;

#[derive(Parser)]
#[command(name = "job_market", about = "Job market dashboard for aijobs.ai postings")]
struct Cli {
    /// Dataset CSV (overrides the configured data_path)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape listing and detail pages into the dataset CSV
    Scrape {
        /// Listing pages to walk
        #[arg(long)]
        pages: Option<u32>,
        /// Stop after this many job urls
        #[arg(long)]
        max_jobs: Option<usize>,
        /// Location filter passed to the job board (e.g. "United States")
        #[arg(long)]
        location: Option<String>,
    },
    /// Metrics, distributions and salary breakdowns for the selection
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        /// Entries shown in each top-N section
        #[arg(long)]
        top: Option<usize>,
        /// Print JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// Postings table, best paid first
    List {
        #[command(flatten)]
        filters: FilterArgs,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Values available for each filter
    Options,
    /// Write the selected postings to a CSV file
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Search in title, company and description
    #[arg(short, long)]
    query: Option<String>,
    /// Remote, Hybrid, On-site or Unspecified
    #[arg(long, value_parser = parse_work_mode)]
    work_mode: Option<WorkMode>,
    /// Junior, Mid-level, Senior, Lead/Principal or Unspecified
    #[arg(long, value_parser = parse_experience)]
    experience: Option<ExperienceLevel>,
    #[arg(long)]
    location: Option<String>,
    /// Keep postings mentioning any of these (repeatable)
    #[arg(long = "tech")]
    techs: Vec<String>,
    #[arg(long)]
    min_techs: Option<usize>,
    #[arg(long)]
    max_techs: Option<usize>,
    #[arg(long)]
    min_salary: Option<f64>,
    #[arg(long)]
    max_salary: Option<f64>,
}

impl FilterArgs {
    fn to_spec(&self) -> FilterSpec {
        let mut spec = FilterSpec::new().with_technologies(self.techs.iter().cloned());
        if let Some(q) = &self.query {
            spec = spec.with_query(q.as_str());
        }
        if let Some(mode) = self.work_mode {
            spec = spec.with_work_mode(mode);
        }
        if let Some(level) = self.experience {
            spec = spec.with_experience_level(level);
        }
        if let Some(loc) = &self.location {
            spec = spec.with_location(loc.as_str());
        }
        if self.min_techs.is_some() || self.max_techs.is_some() {
            spec = spec.with_tech_count(
                self.min_techs.unwrap_or(0)..=self.max_techs.unwrap_or(usize::MAX),
            );
        }
        if self.min_salary.is_some() || self.max_salary.is_some() {
            spec = spec.with_salary(
                self.min_salary.unwrap_or(0.0)..=self.max_salary.unwrap_or(f64::INFINITY),
            );
        }
        spec
    }
}

fn parse_work_mode(s: &str) -> Result<WorkMode, String> {
    WorkMode::from_label(s).ok_or_else(|| format!("unknown work mode {:?}", s))
}

fn parse_experience(s: &str) -> Result<ExperienceLevel, String> {
    ExperienceLevel::from_label(s).ok_or_else(|| format!("unknown experience level {:?}", s))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load().context("loading settings")?;
    if let Some(path) = cli.data {
        settings.data_path = path;
    }
    let extractor =
        FieldExtractor::new(Vocabulary::default()).context("compiling extraction vocabulary")?;
    let builder = RecordBuilder::new(&extractor);

    let result = match cli.command {
        Commands::Scrape {
            pages,
            max_jobs,
            location,
        } => {
            let pages = pages.unwrap_or(settings.max_pages);
            let max_jobs = max_jobs.unwrap_or(settings.max_jobs);
            let location = location.unwrap_or_else(|| settings.location.clone());

            let fetcher = Fetcher::new(&settings)?;
            let urls = fetcher.collect_job_urls(&location, pages, max_jobs).await;
            if urls.is_empty() {
                println!("No job urls found on {} listing page(s).", pages);
                return Ok(());
            }
            println!("Fetching {} job pages...", urls.len());
            let postings = fetcher.fetch_postings(&urls).await;
            let records: Vec<JobRecord> = postings
                .iter()
                .filter_map(|p| builder.build_posting(p))
                .collect();
            info!(
                "Built {} records from {} pages",
                records.len(),
                postings.len()
            );
            store::save_records(&settings.data_path, &records)?;
            println!(
                "Saved {} postings to {}",
                records.len(),
                settings.data_path.display()
            );
            Ok(())
        }
        Commands::Report {
            filters,
            top,
            json,
        } => {
            let all = load(&settings, &builder)?;
            let selected = filters.to_spec().apply(&all);
            let report = Report::build(&all, &selected, top.unwrap_or(settings.top_n));
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render_markdown());
            }
            Ok(())
        }
        Commands::List { filters, limit } => {
            let all = load(&settings, &builder)?;
            let mut selected = filters.to_spec().apply(&all);
            if selected.is_empty() {
                println!("No postings match the current filters.");
                return Ok(());
            }
            selected.sort_by(by_salary_desc);
            print_table(&selected, limit);
            println!(
                "\n{} of {} postings | salary = midpoint of the posted range",
                selected.len(),
                all.len()
            );
            Ok(())
        }
        Commands::Options => {
            let all = load(&settings, &builder)?;
            print_options(&FilterOptions::from_records(&all));
            Ok(())
        }
        Commands::Export { filters, out } => {
            let all = load(&settings, &builder)?;
            let selected = filters.to_spec().apply(&all);
            store::save_records(&out, &selected)?;
            println!("Exported {} postings to {}", selected.len(), out.display());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn load(settings: &Settings, builder: &RecordBuilder) -> anyhow::Result<Vec<JobRecord>> {
    let path = &settings.data_path;
    store::load_records(path, builder).with_context(|| {
        format!(
            "reading dataset {} (run 'scrape' first?)",
            path.display()
        )
    })
}

/// Highest average salary first; postings without salary last.
fn by_salary_desc(a: &JobRecord, b: &JobRecord) -> Ordering {
    match (a.avg_salary, b.avg_salary) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn print_table(records: &[JobRecord], limit: usize) {
    println!(
        "{:>3} | {:<32} | {:<20} | {:<20} | {:<11} | {:<14} | {:>9} | {:<24}",
        "#", "Title", "Company", "Location", "Mode", "Level", "Salary", "Stack"
    );
    println!("{}", "-".repeat(160));

    for (i, r) in records.iter().take(limit).enumerate() {
        println!(
            "{:>3} | {:<32} | {:<20} | {:<20} | {:<11} | {:<14} | {:>9} | {:<24}",
            i + 1,
            truncate(&r.job_title, 32),
            truncate(r.company_name.as_deref().unwrap_or("-"), 20),
            truncate(&r.location, 20),
            r.work_mode,
            r.experience_level,
            money_or_na(r.avg_salary),
            truncate(&r.tech_stack.joined(), 24)
        );
    }

    if records.len() > limit {
        println!("... {} more (raise -n to see them)", records.len() - limit);
    }
}

fn print_options(opts: &FilterOptions) {
    println!("Work modes:        {}", opts.work_modes.join(", "));
    println!("Experience levels: {}", opts.experience_levels.join(", "));
    println!("Locations:         {}", opts.locations.len());
    for loc in &opts.locations {
        println!("  {}", loc);
    }
    println!("Technologies:      {}", opts.technologies.join(", "));
    println!("Tech count:        0..={}", opts.max_tech_count);
    match opts.salary_range {
        Some((lo, hi)) => println!("Salary:            {} - {}", money(lo), money(hi)),
        None => println!("Salary:            no salary data"),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let total = d.as_secs();
    let (h, m, s) = (total / 3600, total / 60 % 60, total % 60);
    match (h, m) {
        (0, 0) => format!("{:.1}s", d.as_secs_f64()),
        (0, _) => format!("{}m {:02}s", m, s),
        _ => format!("{}h {:02}m {:02}s", h, m, s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn duration_units() {
        assert_eq!(format_duration(Duration::from_millis(2_500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 05s");
        assert_eq!(format_duration(Duration::from_secs(3_723)), "1h 02m 03s");
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long job title", 8), "a lon...");
    }
}
