//! Artifact generation: turning an image prompt into a stored image reference
//!
//! Implementations:
//! - `CommandImageGenerator`: runs a configured image command that writes a
//!   PNG into the artifact cache directory
//! - `NoArtifacts`: fallback when no generator is configured; never produces
//!   an artifact
//! - `MockArtifacts`: preconfigured results (testing)

use crate::model::{expand_args, run_command, ModelError};
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Qualifiers appended to every image prompt
pub const PHOTO_QUALIFIERS: &str =
    "food photography, professional lighting, high resolution, detailed texture";

/// Default negative prompt for food images
pub const DEFAULT_NEGATIVE_PROMPT: &str =
    "blurry, low quality, distorted, deformed, ugly, bad anatomy";

const ARTIFACT_SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ARTIFACT_SUFFIX_LEN: usize = 6;

/// Reference to a generated artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ArtifactRef {
    Path(PathBuf),
    Url(String),
}

/// Produces an image for a prompt.
///
/// `Ok(None)` means the generator ran but produced nothing usable. Errors are
/// reported to the caller, which treats them as "no artifact".
#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    async fn render(&self, prompt: &str) -> Result<Option<ArtifactRef>, ModelError>;
}

/// Artifact file stem: `{unix_seconds}_{6 random lowercase alphanumerics}`
fn artifact_stem() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ARTIFACT_SUFFIX_LEN)
        .map(|_| ARTIFACT_SUFFIX_CHARS[rng.gen_range(0..ARTIFACT_SUFFIX_CHARS.len())] as char)
        .collect();
    format!("{}_{}", chrono::Utc::now().timestamp(), suffix)
}

/// Image generator backed by an external command.
///
/// Arguments may reference `{prompt}`, `{negative_prompt}` and `{output}`.
/// The command is expected to write a PNG to `{output}`.
#[derive(Debug, Clone)]
pub struct CommandImageGenerator {
    program: String,
    args: Vec<String>,
    cache_dir: PathBuf,
    negative_prompt: String,
    timeout: Duration,
}

impl CommandImageGenerator {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        cache_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            cache_dir: cache_dir.into(),
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
            timeout,
        }
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = negative_prompt.into();
        self
    }
}

#[async_trait]
impl ArtifactGenerator for CommandImageGenerator {
    async fn render(&self, prompt: &str) -> Result<Option<ArtifactRef>, ModelError> {
        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| ModelError::Unavailable(format!("cannot create artifact cache: {}", e)))?;

        let output = self.cache_dir.join(format!("{}.png", artifact_stem()));
        let enhanced = format!("{}, {}", prompt, PHOTO_QUALIFIERS);
        let output_str = output.to_string_lossy();
        let args = expand_args(
            &self.args,
            &[
                ("prompt", enhanced.as_str()),
                ("negative_prompt", self.negative_prompt.as_str()),
                ("output", output_str.as_ref()),
            ],
        );

        run_command(&self.program, &args, None, self.timeout).await?;

        if tokio::fs::metadata(&output).await.is_ok() {
            tracing::debug!(path = %output.display(), "artifact written");
            Ok(Some(ArtifactRef::Path(output)))
        } else {
            tracing::warn!(program = %self.program, "image command succeeded but wrote no file");
            Ok(None)
        }
    }
}

/// Fallback generator that never produces an artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoArtifacts;

#[async_trait]
impl ArtifactGenerator for NoArtifacts {
    async fn render(&self, _prompt: &str) -> Result<Option<ArtifactRef>, ModelError> {
        Ok(None)
    }
}

/// Mock generator for testing.
pub struct MockArtifacts {
    result: Result<Option<ArtifactRef>, String>,
    calls: AtomicUsize,
}

impl MockArtifacts {
    /// Always return the given artifact.
    pub fn returning(artifact: ArtifactRef) -> Self {
        Self {
            result: Ok(Some(artifact)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Err(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of render requests received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtifactGenerator for MockArtifacts {
    async fn render(&self, _prompt: &str) -> Result<Option<ArtifactRef>, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.result {
            Ok(artifact) => Ok(artifact.clone()),
            Err(message) => Err(ModelError::InvocationFailed(message.clone())),
        }
    }
}
