use crate::model::WorkMode;

pub const REMOTE_KEYWORDS: &[&str] = &[
    "remote",
    "télétravail",
    "work from home",
    "wfh",
    "fully remote",
    "100% remote",
];
pub const HYBRID_KEYWORDS: &[&str] = &["hybrid", "hybride", "partially remote", "flexible", "2-3 days"];
pub const ONSITE_KEYWORDS: &[&str] = &["on-site", "on site", "onsite", "office", "bureau", "présentiel"];

/// Lowercased keyword lists, one per category.
#[derive(Debug, Clone)]
pub struct WorkModeKeywords {
    remote: Vec<String>,
    hybrid: Vec<String>,
    onsite: Vec<String>,
}

impl WorkModeKeywords {
    pub fn new(remote: &[String], hybrid: &[String], onsite: &[String]) -> Self {
        let lower = |list: &[String]| -> Vec<String> { list.iter().map(|k| k.to_lowercase()).collect() };
        Self {
            remote: lower(remote),
            hybrid: lower(hybrid),
            onsite: lower(onsite),
        }
    }
}

/// Remote wins when it has hits and at least as many as hybrid; hybrid is
/// checked before on-site, so on-site hits never break a tie with hybrid.
pub fn detect(keywords: &WorkModeKeywords, text: &str) -> WorkMode {
    let lower = text.to_lowercase();
    let hits = |list: &[String]| list.iter().filter(|k| lower.contains(k.as_str())).count();

    let remote = hits(&keywords.remote);
    let hybrid = hits(&keywords.hybrid);
    let onsite = hits(&keywords.onsite);

    if remote > 0 && remote >= hybrid {
        WorkMode::Remote
    } else if hybrid > 0 {
        WorkMode::Hybrid
    } else if onsite > 0 {
        WorkMode::OnSite
    } else {
        WorkMode::Unspecified
    }
}

#[cfg(test)]
mod tests {
    use crate::extract::FieldExtractor;
    use crate::model::WorkMode;

    fn mode(text: &str) -> WorkMode {
        FieldExtractor::default().detect_work_mode(text)
    }

    #[test]
    fn remote_beats_office_mention() {
        assert_eq!(
            mode("This is a fully remote position, occasional office visits"),
            WorkMode::Remote
        );
    }

    #[test]
    fn hybrid_needs_more_hits_than_remote() {
        // "partially remote" also counts one remote hit: remote 1, hybrid 2.
        assert_eq!(mode("Hybrid role, partially remote"), WorkMode::Hybrid);
        // remote 1, hybrid 1: remote wins the tie.
        assert_eq!(mode("Remote or hybrid"), WorkMode::Remote);
    }

    #[test]
    fn onsite_only_when_nothing_else() {
        assert_eq!(mode("Work from our Paris office"), WorkMode::OnSite);
        assert_eq!(mode("Flexible hours, on-site team"), WorkMode::Hybrid);
    }

    #[test]
    fn case_insensitive_and_accented() {
        assert_eq!(mode("TÉLÉTRAVAIL possible"), WorkMode::Remote);
        assert_eq!(mode("100% REMOTE"), WorkMode::Remote);
    }

    #[test]
    fn no_keywords_is_unspecified() {
        assert_eq!(mode(""), WorkMode::Unspecified);
        assert_eq!(mode("We build compilers."), WorkMode::Unspecified);
    }
}
