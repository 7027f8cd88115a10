//! Game configuration loaded from YAML
//!
//! Every field has a default, so an empty file (or no file at all) gives a
//! working rule-based game with no models and no image generation.
//!
//! ```yaml
//! data_dir: /var/lib/aicooks
//! seed: 42
//! rules:
//!   incompatible_pairs: [[meat, vegetable]]
//!   intense_properties: [sweet, acidic, pungent]
//! models:
//!   timeout_seconds: 60
//!   text:
//!     program: ollama
//!     args: [run, llama3]
//!   image:
//!     program: sd-cli
//!     args: [--prompt, "{prompt}", --negative, "{negative_prompt}", --out, "{output}"]
//! ```

use crate::artifact::{ArtifactGenerator, CommandImageGenerator, NoArtifacts};
use crate::discovery::ValidationRules;
use crate::model::{CommandTextModel, TextModel};
use crate::random::{RandomSource, SeededRandom};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// An external command used as a generation collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Optional generation collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Text model used for validation, names and descriptions
    pub text: Option<CommandConfig>,
    /// Image command used for recipe and ingredient artifacts
    pub image: Option<CommandConfig>,
    /// Upper bound on a single generation call
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            text: None,
            image: None,
            timeout_seconds: 120,
        }
    }
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Directory holding `ingredients.json` and `recipes.json`
    pub data_dir: Option<PathBuf>,
    /// Where generated images are written (default `<data_dir>/images`)
    pub artifact_dir: Option<PathBuf>,
    /// Where pre-drawn placeholder images live (default `<data_dir>/images/placeholders`)
    pub placeholder_dir: Option<PathBuf>,
    /// Seed for the validator's random source; entropy when absent
    pub seed: Option<u64>,
    pub rules: ValidationRules,
    pub models: ModelConfig,
}

/// Default data directory (~/.local/share/aicooks)
pub fn default_data_dir() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("aicooks")
}

impl GameConfig {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn artifact_dir(&self) -> PathBuf {
        self.artifact_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join("images"))
    }

    pub fn placeholder_dir(&self) -> PathBuf {
        self.placeholder_dir
            .clone()
            .unwrap_or_else(|| self.artifact_dir().join("placeholders"))
    }

    /// Build the random source for validation
    pub fn random_source(&self) -> Box<dyn RandomSource> {
        match self.seed {
            Some(seed) => Box::new(SeededRandom::from_seed(seed)),
            None => Box::new(SeededRandom::from_entropy()),
        }
    }

    /// Build the text model, if one is configured
    pub fn text_model(&self) -> Option<Arc<dyn TextModel>> {
        self.models.text.as_ref().map(|cmd| {
            Arc::new(CommandTextModel::new(
                cmd.program.clone(),
                cmd.args.clone(),
                self.models.timeout(),
            )) as Arc<dyn TextModel>
        })
    }

    /// Build the artifact generator, falling back to `NoArtifacts`
    pub fn artifact_generator(&self) -> Arc<dyn ArtifactGenerator> {
        match &self.models.image {
            Some(cmd) => Arc::new(CommandImageGenerator::new(
                cmd.program.clone(),
                cmd.args.clone(),
                self.artifact_dir(),
                self.models.timeout(),
            )),
            None => Arc::new(NoArtifacts),
        }
    }
}
