use regex::Regex;

use crate::model::TechStack;

pub const TECHNOLOGIES: &[&str] = &[
    "Python",
    "JavaScript",
    "Java",
    "TypeScript",
    "Go",
    "Rust",
    "C++",
    "C#",
    "React",
    "Vue",
    "Angular",
    "Node.js",
    "Django",
    "Flask",
    "FastAPI",
    "AWS",
    "Azure",
    "GCP",
    "Docker",
    "Kubernetes",
    "Terraform",
    "PostgreSQL",
    "MongoDB",
    "MySQL",
    "Redis",
    "Elasticsearch",
    "Git",
    "CI/CD",
    "Jenkins",
    "GitHub Actions",
    "Machine Learning",
    "TensorFlow",
    "PyTorch",
    "Scikit-learn",
    "GraphQL",
    "REST API",
    "Microservices",
    "Kafka",
    "RabbitMQ",
];

/// Whole-word, case-insensitive pattern for a technology name.
///
/// Boundaries are "not a word character" rather than `\b`, so names that
/// start or end with punctuation (`C++`, `C#`) still match as whole words.
pub fn word_pattern(name: &str) -> String {
    format!(r"(?i)(?:^|[^\w]){}(?:$|[^\w])", regex::escape(&name.to_lowercase()))
}

pub fn detect(technologies: &[(String, Regex)], text: &str) -> TechStack {
    technologies
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(name, _)| name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::extract::FieldExtractor;

    fn techs(text: &str) -> Vec<String> {
        FieldExtractor::default()
            .extract_tech_stack(text)
            .iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn word_boundaries_exclude_substrings() {
        assert_eq!(techs("We use React and Go, not Javanese"), vec!["Go", "React"]);
    }

    #[test]
    fn java_and_javascript_are_distinct() {
        assert_eq!(techs("JavaScript only"), vec!["JavaScript"]);
        assert_eq!(techs("Java, JavaScript"), vec!["JavaScript", "Java"]);
    }

    #[test]
    fn punctuated_names() {
        assert_eq!(techs("Modern C++ and C# shop"), vec!["C++", "C#"]);
        assert_eq!(techs("node.js services, ci/cd pipelines"), vec!["Node.js", "CI/CD"]);
    }

    #[test]
    fn multi_word_names() {
        assert_eq!(
            techs("Experience with machine learning and GitHub Actions"),
            vec!["GitHub Actions", "Machine Learning"]
        );
    }

    #[test]
    fn git_does_not_match_github() {
        assert_eq!(techs("github.com profile"), Vec::<String>::new());
    }

    #[test]
    fn empty_text_is_empty_stack() {
        assert!(techs("").is_empty());
    }
}
