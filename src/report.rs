use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::{
    self, Comparison, CompanySalary, Count, Dimension, KeyMetrics, ScatterPoint, TechSalary,
};
use crate::model::JobRecord;
use crate::stats::{self, SalarySummary};

/// Salary distribution of one group (a work mode, an experience level).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub value: String,
    pub salary: SalarySummary,
}

/// Everything the dashboard shows for one filter selection.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub metrics: KeyMetrics,
    /// Present only when the filter changed the record set.
    pub comparison: Option<Comparison>,
    pub work_modes: Vec<Count>,
    pub experience_levels: Vec<Count>,
    pub top_technologies: Vec<Count>,
    pub salary_by_work_mode: Vec<GroupSummary>,
    pub salary_by_experience: Vec<GroupSummary>,
    pub top_locations: Vec<Count>,
    /// Companies with the most postings, salaried or not.
    pub companies: Vec<Count>,
    pub job_types: Vec<Count>,
    pub top_companies: Vec<CompanySalary>,
    pub tech_salaries: Vec<TechSalary>,
    pub salary_vs_tech_count: Vec<ScatterPoint>,
}

impl Report {
    pub fn build(all: &[JobRecord], filtered: &[JobRecord], top_n: usize) -> Self {
        Self {
            generated_at: Utc::now(),
            metrics: aggregate::key_metrics(filtered),
            comparison: (filtered.len() != all.len()).then(|| aggregate::compare(all, filtered)),
            work_modes: aggregate::categorical_distribution(filtered, Dimension::WorkMode),
            experience_levels: aggregate::experience_distribution(filtered),
            top_technologies: aggregate::top_technologies(filtered, top_n),
            salary_by_work_mode: summarize(filtered, Dimension::WorkMode),
            salary_by_experience: summarize(filtered, Dimension::ExperienceLevel),
            top_locations: aggregate::top_locations(filtered, top_n),
            companies: aggregate::categorical_distribution(filtered, Dimension::Company)
                .into_iter()
                .take(top_n)
                .collect(),
            job_types: aggregate::categorical_distribution(filtered, Dimension::JobType),
            top_companies: aggregate::top_companies_by_salary(filtered, top_n),
            tech_salaries: aggregate::tech_salary_correlation(filtered, top_n),
            salary_vs_tech_count: aggregate::salary_vs_tech_count(filtered),
        }
    }

    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("## Job Market Dashboard\n");
        out.push_str(&format!(
            "_Generated {}_\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        ));

        let m = &self.metrics;
        if m.total == 0 {
            out.push_str("No postings match the current filters.\n");
            return out;
        }
        out.push_str(&format!(
            "- Total postings: {}\n- Median salary: {}\n- Companies: {}\n- Remote postings: {} ({:.1}%)\n",
            m.total,
            money_or_na(m.median_salary),
            m.companies,
            m.remote,
            percent(m.remote, m.total)
        ));

        if let Some(c) = &self.comparison {
            out.push_str("\n### All postings vs filtered\n");
            out.push_str("| | Postings | Median salary | Mean salary |\n|---|---:|---:|---:|\n");
            for (label, s) in [("All", &c.baseline), ("Filtered", &c.filtered)] {
                out.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    label,
                    s.count,
                    money_or_na(s.median_salary),
                    money_or_na(s.mean_salary)
                ));
            }
        }

        out.push_str("\n### Work mode\n");
        push_counts(&mut out, &self.work_modes, m.total);

        out.push_str("\n### Experience level\n");
        push_counts(&mut out, &self.experience_levels, m.total);

        out.push_str("\n### Most requested technologies\n");
        push_counts(&mut out, &self.top_technologies, m.total);

        out.push_str("\n### Salary by work mode\n");
        push_summaries(&mut out, &self.salary_by_work_mode);

        out.push_str("\n### Salary by experience level\n");
        push_summaries(&mut out, &self.salary_by_experience);

        out.push_str("\n### Top locations\n");
        push_counts(&mut out, &self.top_locations, m.total);

        out.push_str("\n### Companies with most postings\n");
        push_counts(&mut out, &self.companies, m.total);

        if !self.job_types.is_empty() {
            out.push_str("\n### Job types\n");
            push_counts(&mut out, &self.job_types, m.total);
        }

        out.push_str("\n### Best-paying companies\n");
        if self.top_companies.is_empty() {
            out.push_str("- No salary data.\n");
        }
        for c in &self.top_companies {
            out.push_str(&format!(
                "- {}: {} ({} posting{})\n",
                c.company,
                money(c.mean_salary),
                c.postings,
                plural(c.postings)
            ));
        }

        out.push_str("\n### Best-paid technologies (2+ salaried postings)\n");
        if self.tech_salaries.is_empty() {
            out.push_str("- Not enough salary data.\n");
        }
        for t in &self.tech_salaries {
            out.push_str(&format!(
                "- {}: {} ({} posting{})\n",
                t.technology,
                money(t.mean_salary),
                t.samples,
                plural(t.samples)
            ));
        }

        out.push_str("\n### Salary by number of technologies\n");
        let by_count = mean_by_tech_count(&self.salary_vs_tech_count);
        if by_count.is_empty() {
            out.push_str("- No salaried postings with a known stack.\n");
        }
        for (count, mean, points) in by_count {
            out.push_str(&format!(
                "- {} tech{}: {} ({} posting{})\n",
                count,
                plural(count),
                money(mean),
                points,
                plural(points)
            ));
        }

        out
    }
}

fn summarize(records: &[JobRecord], dimension: Dimension) -> Vec<GroupSummary> {
    aggregate::salary_by_dimension(records, dimension)
        .into_iter()
        .filter_map(|g| {
            Some(GroupSummary {
                salary: SalarySummary::from_samples(&g.samples)?,
                value: g.value,
            })
        })
        .collect()
}

/// (tech count, mean salary, points), ascending by tech count.
fn mean_by_tech_count(points: &[ScatterPoint]) -> Vec<(usize, f64, usize)> {
    let max = points.iter().map(|p| p.tech_count).max().unwrap_or(0);
    (1..=max)
        .filter_map(|count| {
            let samples: Vec<f64> = points
                .iter()
                .filter(|p| p.tech_count == count)
                .map(|p| p.avg_salary)
                .collect();
            Some((count, stats::mean(&samples)?, samples.len()))
        })
        .collect()
}

fn push_counts(out: &mut String, counts: &[Count], total: usize) {
    if counts.is_empty() {
        out.push_str("- None.\n");
    }
    for c in counts {
        out.push_str(&format!(
            "- {}: {} ({:.1}%)\n",
            c.value,
            c.count,
            percent(c.count, total)
        ));
    }
}

fn push_summaries(out: &mut String, groups: &[GroupSummary]) {
    if groups.is_empty() {
        out.push_str("- No salary data.\n");
        return;
    }
    out.push_str("| Group | n | Min | Q1 | Median | Q3 | Max | Mean |\n");
    out.push_str("|---|---:|---:|---:|---:|---:|---:|---:|\n");
    for g in groups {
        let s = &g.salary;
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
            g.value,
            s.count,
            money(s.min),
            money(s.q1),
            money(s.median),
            money(s.q3),
            money(s.max),
            money(s.mean)
        ));
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Whole dollars with thousands separators: `$95,000`.
pub fn money(value: f64) -> String {
    let digits = (value.round() as u64).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${}", grouped)
}

pub fn money_or_na(value: Option<f64>) -> String {
    value.map(money).unwrap_or_else(|| "N/A".to_string())
}
