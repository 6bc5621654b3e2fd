//! Configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (nested keys separated by `__`, e.g. `APP_CHUNKING__WINDOW=400`).
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::data_processor::ChunkingConfig;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    /// Extract the full typed settings; missing keys fall back to defaults.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))
    }

    fn validate(&self) -> anyhow::Result<()> {
        let settings = self.settings()?;
        settings.chunking.validate()?;
        if settings.retrieval.top_k == 0 {
            anyhow::bail!("retrieval.top_k must be at least 1");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalSettings,
    pub embedding: EmbeddingSettings,
    pub intents: IntentSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Directory holding the snippet documents.
    pub dir: String,
    /// File extension (without the dot) of documents to index.
    pub extension: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self { dir: "data/snippets".to_string(), extension: "md".to_string() }
    }
}

impl DataSettings {
    pub fn resolve_dir(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Local directory of a BERT sentence-embedding model.
    pub model_dir: Option<String>,
    /// Use the deterministic hashing embedder instead of a model.
    pub use_fake: bool,
    /// Dimension of the hashing embedder.
    pub fake_dim: usize,
    /// Token limit per text for the model embedder.
    pub max_len: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { model_dir: None, use_fake: false, fake_dim: 384, max_len: 256 }
    }
}

/// Keyword to preferred-source mapping used by the intent router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentSettings(pub BTreeMap<String, Vec<String>>);

impl Default for IntentSettings {
    fn default() -> Self {
        let pairs = [
            ("sleep", "sleep-hygiene.md"),
            ("exercise", "exercise-aerobic.md"),
            ("diet", "mind-diet.md"),
            ("nutrition", "mind-diet.md"),
            ("stress", "stress-management.md"),
            ("anxiety", "stress-management.md"),
            ("workout", "exercise-aerobic.md"),
            ("fitness", "exercise-aerobic.md"),
        ];
        Self(pairs.iter().map(|(k, v)| (k.to_string(), vec![v.to_string()])).collect())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
