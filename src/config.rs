/// Runtime configuration.
///
/// Values come from the process environment (optionally seeded from a `.env`
/// file by the binary). Unset variables take the defaults below; malformed
/// values are reported and replaced by the default.
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

// ── Default value functions ──────────────────────────────────────────

fn default_llama_server_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_llama_model_path() -> String {
    "./models/mistral-7b-instruct-v0.2.Q4_K_M.gguf".to_string()
}

fn default_llama_ctx() -> u32 {
    4096
}

fn default_llama_n_threads() -> u32 {
    6
}

fn default_llama_n_gpu_layers() -> u32 {
    20
}

fn default_llm_timeout_secs() -> u64 {
    300
}

fn default_resume_path() -> String {
    "./data/resume.pdf".to_string()
}

fn default_cover_letter_base_path() -> String {
    "./data/cover_letter_base.docx".to_string()
}

fn default_countries() -> Vec<String> {
    vec!["India".to_string()]
}

fn default_keywords() -> Vec<String> {
    vec!["machine learning".to_string(), "ml engineer".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_feeds_dir() -> String {
    "./data/feeds".to_string()
}

fn default_requests_per_min() -> u32 {
    16
}

fn default_db_path() -> String {
    "./agent.db".to_string()
}

fn default_output_dir() -> String {
    "./output/tailored".to_string()
}

/// Template used when `RESUME_TEMPLATE_PATH` is unset and this file exists.
pub const FALLBACK_TEMPLATE_PATH: &str = "./data/resume.docx";

/// Providers known to the pipeline, in search order.
/// Search order. Storage is first-writer-wins, so a listing seen on several
/// boards keeps the source of the earliest one here.
pub const PROVIDER_NAMES: [&str; 4] = ["indeed", "wellfound", "internshala", "linkedin"];

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmMode {
    #[default]
    Local,
    Mock,
}

impl FromStr for LlmMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(LlmMode::Local),
            "mock" => Ok(LlmMode::Mock),
            other => Err(format!("unknown LLM mode '{other}'")),
        }
    }
}

/// Per-provider switches: search it at all, and submit applications through it.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ProviderConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub apply: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            apply: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub linkedin: ProviderConfig,

    #[serde(default = "default_indeed")]
    pub indeed: ProviderConfig,

    #[serde(default)]
    pub wellfound: ProviderConfig,

    #[serde(default)]
    pub internshala: ProviderConfig,
}

fn default_indeed() -> ProviderConfig {
    ProviderConfig {
        enabled: true,
        apply: false,
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            linkedin: ProviderConfig::default(),
            indeed: default_indeed(),
            wellfound: ProviderConfig::default(),
            internshala: ProviderConfig::default(),
        }
    }
}

impl ProvidersConfig {
    pub fn get(&self, name: &str) -> Option<ProviderConfig> {
        match name {
            "linkedin" => Some(self.linkedin),
            "indeed" => Some(self.indeed),
            "wellfound" => Some(self.wellfound),
            "internshala" => Some(self.internshala),
            _ => None,
        }
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut ProviderConfig> {
        match name {
            "linkedin" => Some(&mut self.linkedin),
            "indeed" => Some(&mut self.indeed),
            "wellfound" => Some(&mut self.wellfound),
            "internshala" => Some(&mut self.internshala),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub llm_mode: LlmMode,

    #[serde(default = "default_llama_server_url")]
    pub llama_server_url: String,

    #[serde(default = "default_llama_model_path")]
    pub llama_model_path: String,

    #[serde(default = "default_llama_ctx")]
    pub llama_ctx: u32,

    #[serde(default = "default_llama_n_threads")]
    pub llama_n_threads: u32,

    #[serde(default = "default_llama_n_gpu_layers")]
    pub llama_n_gpu_layers: u32,

    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_secs: u64,

    #[serde(default = "default_resume_path")]
    pub resume_path: String,

    /// Empty means "use [`FALLBACK_TEMPLATE_PATH`] if it exists".
    #[serde(default)]
    pub resume_template_path: String,

    #[serde(default = "default_cover_letter_base_path")]
    pub cover_letter_base_path: String,

    #[serde(default = "default_countries")]
    pub countries: Vec<String>,

    #[serde(default)]
    pub cities: Vec<String>,

    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    #[serde(default = "default_true")]
    pub remote_ok: bool,

    #[serde(default = "default_true")]
    pub remote_global_ok: bool,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default = "default_feeds_dir")]
    pub feeds_dir: String,

    #[serde(default = "default_requests_per_min")]
    pub requests_per_min: u32,

    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_mode: LlmMode::default(),
            llama_server_url: default_llama_server_url(),
            llama_model_path: default_llama_model_path(),
            llama_ctx: default_llama_ctx(),
            llama_n_threads: default_llama_n_threads(),
            llama_n_gpu_layers: default_llama_n_gpu_layers(),
            llm_timeout_secs: default_llm_timeout_secs(),
            resume_path: default_resume_path(),
            resume_template_path: String::new(),
            cover_letter_base_path: default_cover_letter_base_path(),
            countries: default_countries(),
            cities: Vec::new(),
            keywords: default_keywords(),
            remote_ok: default_true(),
            remote_global_ok: default_true(),
            providers: ProvidersConfig::default(),
            feeds_dir: default_feeds_dir(),
            requests_per_min: default_requests_per_min(),
            db_path: default_db_path(),
            output_dir: default_output_dir(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Build from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());
        let mut cfg = Self::default();

        if let Some(v) = get("LLM_MODE") {
            cfg.llm_mode = parse_or("LLM_MODE", &v, cfg.llm_mode);
        }
        set_string(&mut cfg.llama_server_url, get("LLAMA_SERVER_URL"));
        set_string(&mut cfg.llama_model_path, get("LLAMA_MODEL_PATH"));
        set_parsed(&mut cfg.llama_ctx, "LLAMA_CTX", get("LLAMA_CTX"));
        set_parsed(&mut cfg.llama_n_threads, "LLAMA_N_THREADS", get("LLAMA_N_THREADS"));
        set_parsed(&mut cfg.llama_n_gpu_layers, "LLAMA_N_GPU_LAYERS", get("LLAMA_N_GPU_LAYERS"));
        set_parsed(&mut cfg.llm_timeout_secs, "LLM_TIMEOUT_SECS", get("LLM_TIMEOUT_SECS"));

        set_string(&mut cfg.resume_path, get("RESUME_PATH"));
        if let Some(v) = get("RESUME_TEMPLATE_PATH") {
            cfg.resume_template_path = v;
        }
        set_string(&mut cfg.cover_letter_base_path, get("COVER_LETTER_BASE_PATH"));

        if let Some(v) = get("COUNTRIES") {
            cfg.countries = split_list(&v);
        }
        if let Some(v) = get("CITIES") {
            cfg.cities = split_list(&v);
        }
        if let Some(v) = get("KEYWORDS") {
            cfg.keywords = split_list(&v);
        }
        set_bool(&mut cfg.remote_ok, "REMOTE_OK", get("REMOTE_OK"));
        set_bool(&mut cfg.remote_global_ok, "REMOTE_GLOBAL_OK", get("REMOTE_GLOBAL_OK"));

        for name in PROVIDER_NAMES {
            let upper = name.to_uppercase();
            let enable_key = format!("ENABLE_{upper}");
            // LinkedIn only applies through Easy Apply
            let apply_key = if name == "linkedin" {
                "APPLY_LINKEDIN_EASY_APPLY".to_string()
            } else {
                format!("APPLY_{upper}")
            };
            if let Some(p) = cfg.providers.get_mut(name) {
                set_bool(&mut p.enabled, &enable_key, get(&enable_key));
                set_bool(&mut p.apply, &apply_key, get(&apply_key));
            }
        }

        set_string(&mut cfg.feeds_dir, get("FEEDS_DIR"));
        set_parsed(&mut cfg.requests_per_min, "REQUESTS_PER_MIN", get("REQUESTS_PER_MIN"));
        set_string(&mut cfg.db_path, get("DB_PATH"));
        set_string(&mut cfg.output_dir, get("OUTPUT_DIR"));
        cfg
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.requests_per_min > 0, "REQUESTS_PER_MIN must be positive");
        anyhow::ensure!(self.llama_ctx > 0, "LLAMA_CTX must be positive");
        anyhow::ensure!(self.llm_timeout_secs > 0, "LLM_TIMEOUT_SECS must be positive");
        anyhow::ensure!(!self.keywords.is_empty(), "at least one keyword must be specified");
        anyhow::ensure!(!self.db_path.is_empty(), "DB_PATH must not be empty");
        anyhow::ensure!(!self.output_dir.is_empty(), "OUTPUT_DIR must not be empty");
        if self.countries.is_empty() && self.cities.is_empty() && !self.remote_ok && !self.remote_global_ok {
            warn!("No countries, cities or remote work accepted: every job will be filtered out");
        }
        Ok(())
    }

    /// DOCX template to mutate, if one is configured or present at the
    /// conventional location.
    pub fn template_path(&self) -> Option<PathBuf> {
        if !self.resume_template_path.is_empty() {
            return Some(PathBuf::from(&self.resume_template_path));
        }
        let fallback = Path::new(FALLBACK_TEMPLATE_PATH);
        fallback.exists().then(|| fallback.to_path_buf())
    }

    /// Locations handed to providers: cities when configured, else countries.
    pub fn search_locations(&self) -> Vec<String> {
        if self.cities.is_empty() {
            self.countries.clone()
        } else {
            self.cities.clone()
        }
    }
}

// ── Parsing helpers ──────────────────────────────────────────────────

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_or<T: FromStr>(key: &str, value: &str, default: T) -> T {
    match value.parse() {
        Ok(v) => v,
        Err(_) => {
            warn!("Invalid value for {key}: {value:?}, using default");
            default
        }
    }
}

fn set_string(slot: &mut String, value: Option<String>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        *slot = v;
    }
}

fn set_parsed<T: FromStr + Copy>(slot: &mut T, key: &str, value: Option<String>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        *slot = parse_or(key, &v, *slot);
    }
}

fn set_bool(slot: &mut bool, key: &str, value: Option<String>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        match parse_bool(&v) {
            Some(b) => *slot = b,
            None => warn!("Invalid boolean for {key}: {v:?}, using default"),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm_mode, LlmMode::Local);
        assert_eq!(config.llama_ctx, 4096);
        assert_eq!(config.countries, vec!["India"]);
        assert!(config.cities.is_empty());
        assert_eq!(config.keywords, vec!["machine learning", "ml engineer"]);
        assert_eq!(config.requests_per_min, 16);
        assert!(config.providers.linkedin.apply);
        assert!(!config.providers.indeed.apply);
        assert!(config.providers.indeed.enabled);
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = from_pairs(&[]);
        assert_eq!(config.db_path, Config::default().db_path);
        assert_eq!(config.providers, ProvidersConfig::default());
    }

    #[test]
    fn test_environment_overrides() {
        let config = from_pairs(&[
            ("LLM_MODE", "MOCK"),
            ("LLAMA_N_THREADS", "12"),
            ("CITIES", " Bangalore, Pune ,,"),
            ("COUNTRIES", ""),
            ("REMOTE_OK", "false"),
            ("ENABLE_WELLFOUND", "0"),
            ("APPLY_LINKEDIN_EASY_APPLY", "no"),
            ("APPLY_INDEED", "true"),
            ("REQUESTS_PER_MIN", "30"),
            ("DB_PATH", "/tmp/agent.db"),
        ]);
        assert_eq!(config.llm_mode, LlmMode::Mock);
        assert_eq!(config.llama_n_threads, 12);
        assert_eq!(config.cities, vec!["Bangalore", "Pune"]);
        assert!(config.countries.is_empty());
        assert!(!config.remote_ok);
        assert!(config.remote_global_ok);
        assert!(!config.providers.wellfound.enabled);
        assert!(!config.providers.linkedin.apply);
        assert!(config.providers.indeed.apply);
        assert_eq!(config.requests_per_min, 30);
        assert_eq!(config.db_path, "/tmp/agent.db");
        assert_eq!(config.search_locations(), vec!["Bangalore", "Pune"]);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let config = from_pairs(&[
            ("LLM_MODE", "openai"),
            ("LLAMA_CTX", "big"),
            ("REMOTE_OK", "maybe"),
        ]);
        assert_eq!(config.llm_mode, LlmMode::Local);
        assert_eq!(config.llama_ctx, 4096);
        assert!(config.remote_ok);
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());
        assert!(from_pairs(&[("REQUESTS_PER_MIN", "0")]).validate().is_err());
        assert!(from_pairs(&[("KEYWORDS", " , ")]).validate().is_err());
    }

    #[test]
    fn test_template_path() {
        let config = from_pairs(&[("RESUME_TEMPLATE_PATH", "/x/resume.docx")]);
        assert_eq!(config.template_path(), Some(PathBuf::from("/x/resume.docx")));
    }

    #[test]
    fn test_search_locations_default_to_countries() {
        assert_eq!(Config::default().search_locations(), vec!["India"]);
    }

    #[test]
    fn test_provider_lookup() {
        let providers = ProvidersConfig::default();
        assert_eq!(providers.get("indeed").map(|p| p.apply), Some(false));
        assert!(providers.get("monster").is_none());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = from_pairs(&[("LLM_MODE", "mock")]);
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains(r#""llm_mode": "mock""#));
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.llm_mode, LlmMode::Mock);
        assert_eq!(parsed.providers, config.providers);
    }
}
