use regex::Regex;

use crate::model::SalaryRange;

/// Tried in order; the first pattern whose captures parse wins.
pub const SALARY_PATTERNS: &[&str] = &[
    r"\$?(\d+)[kK]?\s*-\s*\$?(\d+)[kK]?",
    r"€?(\d+)[,.]?\d*\s*-\s*€?(\d+)[,.]?\d*",
    r"(\d+)\s*to\s*(\d+)\s*k",
];

/// Values under this are read as thousands ("120" means 120k).
const SHORTHAND_LIMIT: u64 = 1000;

pub fn parse(patterns: &[Regex], text: &str) -> Option<SalaryRange> {
    patterns.iter().find_map(|re| {
        let caps = re.captures(text)?;
        let min = parse_amount(caps.get(1)?.as_str())?;
        let max = parse_amount(caps.get(2)?.as_str())?;
        Some(SalaryRange { min, max })
    })
}

fn parse_amount(raw: &str) -> Option<u64> {
    let value: u64 = raw.replace([',', '.'], "").parse().ok()?;
    if value < SHORTHAND_LIMIT {
        Some(value * 1000)
    } else {
        Some(value)
    }
}
