//! Curated vocabularies and weight tables used by the scorers.
//!
//! Every term is stored lower-case and matched as a substring of lower-cased
//! text. Bump [`LEXICON_VERSION`] whenever a table changes, since stored
//! scores are only comparable within one version.

use std::sync::LazyLock;

use regex::Regex;

/// Version of the tables below.
pub const LEXICON_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Blog depth
// ---------------------------------------------------------------------------

/// Vocabulary of hands-on ML engineering writing.
pub const BLOG_POSITIVE_TERMS: &[&str] = &[
    "model training",
    "neural network",
    "machine learning pipeline",
    "feature engineering",
    "hyperparameter tuning",
    "model evaluation",
    "data preprocessing",
    "algorithm optimization",
    "inference latency",
    "model deployment",
    "mlops",
    "model monitoring",
    "a/b testing",
    "gradient descent",
    "backpropagation",
    "transformer architecture",
];

/// Buzzwords typical of thin generative-AI integrations.
pub const BLOG_NEGATIVE_TERMS: &[&str] = &[
    "chatgpt integration",
    "openai api",
    "prompt engineering only",
    "ai-powered",
    "machine learning magic",
    "artificial intelligence revolution",
    "ai transformation",
];

/// Regex patterns signalling technical depth.
pub const TECHNICAL_DEPTH_PATTERNS: &[&str] = &[
    r"model\s+accuracy",
    r"precision\s+and\s+recall",
    r"training\s+loss",
    r"hyperparameter",
    r"feature\s+engineering",
    r"data\s+preprocessing",
    r"model\s+deployment",
    r"inference\s+latency",
];

/// Compiled [`TECHNICAL_DEPTH_PATTERNS`].
pub static TECHNICAL_DEPTH_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    TECHNICAL_DEPTH_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("valid technical depth pattern"))
        .collect()
});

/// Markers of code samples or links to source repositories.
pub const CODE_MARKERS: &[&str] = &["```", "<code>", "github.com", "gitlab.com"];

/// Homepage link href/text fragments that suggest an engineering blog.
pub const BLOG_LINK_KEYWORDS: &[&str] = &["blog", "engineering", "technical", "tech"];

/// Paths probed under a company website when looking for an engineering blog.
pub const BLOG_PATHS: &[&str] = &[
    "/blog",
    "/engineering",
    "/tech",
    "/blog/engineering",
    "/technical-blog",
    "/dev-blog",
    "/engineering-blog",
];

// ---------------------------------------------------------------------------
// Job mix
// ---------------------------------------------------------------------------

/// Job-title fragment → ML weight. Ordered; the first fragment found in a title wins.
pub const JOB_TITLE_WEIGHTS: &[(&str, f64)] = &[
    ("machine learning engineer", 3.0),
    ("ml engineer", 3.0),
    ("data scientist", 2.0),
    ("ai engineer", 2.5),
    ("research scientist", 3.0),
    ("mlops engineer", 2.5),
    ("ai product manager", 1.5),
    ("software engineer", 0.5),
];

/// Weight of the first matching entry in [`JOB_TITLE_WEIGHTS`], or 0.
pub fn job_title_weight(title: &str) -> f64 {
    let title = title.to_lowercase();
    JOB_TITLE_WEIGHTS
        .iter()
        .find(|(fragment, _)| title.contains(fragment))
        .map(|(_, weight)| *weight)
        .unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Technical footprint
// ---------------------------------------------------------------------------

/// Library and tooling names that mark a repository as ML-related.
pub const ML_REPO_INDICATORS: &[&str] = &[
    "pytorch",
    "tensorflow",
    "scikit-learn",
    "numpy",
    "pandas",
    "jupyter",
    "keras",
    "xgboost",
    "lightgbm",
    "transformers",
    "mlflow",
    "kubeflow",
    "airflow",
    "docker",
    "kubernetes",
];

/// Strong ML terms, weighted double in the per-repository score.
pub const ML_HIGH_VALUE_TERMS: &[&str] = &[
    "neural",
    "deep learning",
    "tensorflow",
    "pytorch",
    "machine learning",
    "artificial intelligence",
    "nlp",
    "computer vision",
    "reinforcement learning",
];

/// The primary ML-adjacent repository language.
pub const PRIMARY_ML_LANGUAGE: &str = "python";

/// Languages earning a smaller per-repository bonus.
pub const SECONDARY_ML_LANGUAGES: &[&str] = &["r", "julia", "scala"];

/// Organizations whose links on a company site say nothing about the company itself.
pub const VENDOR_ORGS: &[&str] = &["microsoft", "google", "facebook", "apple", "amazon"];

// ---------------------------------------------------------------------------
// Marketing specificity
// ---------------------------------------------------------------------------

/// Specific, falsifiable technical claims.
pub const SPECIFIC_CLAIMS: &[&str] = &[
    "accuracy",
    "precision",
    "recall",
    "f1 score",
    "training data",
    "model performance",
    "inference time",
    "custom model",
    "proprietary algorithm",
];

pub const VAGUE_CLAIMS: &[&str] = &[
    "ai-powered",
    "artificial intelligence",
    "machine learning magic",
    "smart technology",
    "intelligent system",
    "ai revolution",
];

/// Mentions of third-party hosted generative-AI products.
pub const GENAI_INTEGRATION_MARKERS: &[&str] = &["chatgpt", "openai api"];

// ---------------------------------------------------------------------------
// Relevance
// ---------------------------------------------------------------------------

pub const HEALTHCARE_TERMS: &[&str] = &[
    "health",
    "medical",
    "healthcare",
    "clinical",
    "patient",
    "hospital",
    "diagnosis",
    "treatment",
    "pharma",
    "biotech",
    "therapeutic",
    "drug",
    "medicine",
    "doctor",
    "physician",
];

/// Number of `terms` occurring in already lower-cased `text`.
pub fn count_terms(text: &str, terms: &[&str]) -> usize {
    terms.iter().filter(|term| text.contains(*term)).count()
}

/// Whether any of `terms` occurs in already lower-cased `text`.
pub fn contains_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| text.contains(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_tables() -> Vec<(&'static str, &'static [&'static str])> {
        vec![
            ("blog positive", BLOG_POSITIVE_TERMS),
            ("blog negative", BLOG_NEGATIVE_TERMS),
            ("code markers", CODE_MARKERS),
            ("blog link keywords", BLOG_LINK_KEYWORDS),
            ("ml indicators", ML_REPO_INDICATORS),
            ("ml high value", ML_HIGH_VALUE_TERMS),
            ("secondary languages", SECONDARY_ML_LANGUAGES),
            ("vendor orgs", VENDOR_ORGS),
            ("specific claims", SPECIFIC_CLAIMS),
            ("vague claims", VAGUE_CLAIMS),
            ("genai markers", GENAI_INTEGRATION_MARKERS),
            ("healthcare", HEALTHCARE_TERMS),
        ]
    }

    #[test]
    fn tables_are_lowercase_and_unique() {
        for (name, table) in all_tables() {
            let mut seen = std::collections::HashSet::new();
            for term in table {
                assert_eq!(*term, term.to_lowercase(), "{name}: {term} is not lower-case");
                assert!(seen.insert(*term), "{name}: duplicate term {term}");
            }
        }
        for (fragment, _) in JOB_TITLE_WEIGHTS {
            assert_eq!(*fragment, fragment.to_lowercase());
        }
    }

    #[test]
    fn technical_patterns_compile() {
        assert_eq!(TECHNICAL_DEPTH_REGEXES.len(), TECHNICAL_DEPTH_PATTERNS.len());
        assert!(TECHNICAL_DEPTH_REGEXES[2].is_match("our training   loss dropped"));
    }

    #[test]
    fn job_title_first_match_wins() {
        assert_eq!(job_title_weight("Senior Machine Learning Engineer"), 3.0);
        assert_eq!(job_title_weight("Staff Data Scientist"), 2.0);
        assert_eq!(job_title_weight("MLOps Engineer"), 2.5);
        assert_eq!(job_title_weight("Software Engineer II"), 0.5);
        assert_eq!(job_title_weight("Product Manager"), 0.0);
    }

    #[test]
    fn term_counting() {
        let text = "we track precision and recall on our custom model";
        assert_eq!(count_terms(text, SPECIFIC_CLAIMS), 3);
        assert!(!contains_any(text, GENAI_INTEGRATION_MARKERS));
    }
}
