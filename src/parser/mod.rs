/// Heuristic parsers for unstructured text.
///
/// - [`text`]: plain text out of PDF, DOCX or text files
/// - [`resume`]: contact details, skills and sections of a resume
/// - [`job`]: requirements/responsibilities/skills of a job description
/// - [`response`]: `##`-sectioned model completions into tailored resume data
pub mod job;
pub mod response;
pub mod resume;
pub mod text;

use std::sync::LazyLock;

use regex::Regex;

pub use job::{ParsedJob, parse_job};
pub use response::parse_llm_response;
pub use resume::{ResumeProfile, parse_resume};
pub use text::extract_text;

/// Keyword and display form for skill detection.
const SKILL_KEYWORDS: &[(&str, &str)] = &[
    ("python", "Python"),
    ("pytorch", "PyTorch"),
    ("tensorflow", "TensorFlow"),
    ("scikit", "scikit-learn"),
    ("ml", "ML"),
    ("machine learning", "Machine Learning"),
    ("deep learning", "Deep Learning"),
    ("ai", "AI"),
    ("nlp", "NLP"),
    ("computer vision", "Computer Vision"),
    ("react", "React"),
    ("node", "Node.js"),
    ("mongodb", "MongoDB"),
    ("sql", "SQL"),
    ("docker", "Docker"),
    ("kubernetes", "Kubernetes"),
    ("aws", "AWS"),
    ("gcp", "GCP"),
    ("fastapi", "FastAPI"),
    ("gensim", "Gensim"),
    ("transformers", "Transformers"),
    ("llm", "LLM"),
    ("langchain", "LangChain"),
    ("rust", "Rust"),
    ("java", "Java"),
    ("go", "Go"),
];

static SKILL_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    SKILL_KEYWORDS
        .iter()
        .map(|(kw, display)| {
            let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(kw))).unwrap();
            (re, *display)
        })
        .collect()
});

/// Known skills mentioned anywhere in `text`, in keyword-list order.
pub(crate) fn detect_skills(text: &str) -> Vec<String> {
    SKILL_PATTERNS
        .iter()
        .filter(|(re, _)| re.is_match(text))
        .map(|(_, display)| display.to_string())
        .collect()
}

/// Append `items` to `into`, skipping case-insensitive duplicates.
pub(crate) fn merge_unique(into: &mut Vec<String>, items: impl IntoIterator<Item = String>) {
    for item in items {
        if !into.iter().any(|s| s.eq_ignore_ascii_case(&item)) {
            into.push(item);
        }
    }
}

static HEADING_NOISE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[#*:_\s]+").unwrap());

/// Canonical form of a possible heading line: uppercase words separated by
/// single spaces with markdown and colons removed. `None` for long lines.
pub(crate) fn heading_key(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.len() > 48 {
        return None;
    }
    let key = HEADING_NOISE
        .replace_all(line, " ")
        .trim()
        .replace('’', "'")
        .to_uppercase();
    (!key.is_empty()).then_some(key)
}

/// Split text into `(section, lines)` runs. Lines before the first known
/// heading and under unknown headings are dropped; `classify` maps a heading
/// key to its section.
pub(crate) fn segment<K: Copy + PartialEq>(
    text: &str,
    classify: impl Fn(&str) -> Option<Option<K>>,
) -> Vec<(K, Vec<String>)> {
    let mut out: Vec<(K, Vec<String>)> = Vec::new();
    let mut current: Option<K> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        // Some(None) marks a known heading with no section of interest
        if let Some(section) = heading_key(line).and_then(|key| classify(&key)) {
            current = section;
            if let Some(k) = section {
                out.push((k, Vec::new()));
            }
            continue;
        }
        if current.is_some() {
            if let Some((_, lines)) = out.last_mut() {
                lines.push(line.to_string());
            }
        }
    }
    out
}

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-•*▪◦‣]|\d{1,2}[.)])\s*").unwrap());

pub(crate) fn strip_marker(line: &str) -> String {
    LIST_MARKER.replace(line.trim(), "").trim().to_string()
}
