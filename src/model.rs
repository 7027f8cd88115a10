//! Text model client: the optional language model behind validation and naming
//!
//! Defines the client trait and two implementations:
//! - `CommandTextModel`: runs a configured command (e.g. `ollama run <model>`)
//!   with the prompt on stdin and reads the answer from stdout (production)
//! - `MockTextModel`: returns preconfigured responses (testing)
//!
//! Whether a model is used at all is decided when the validator is built;
//! callers never probe for model support at runtime.

use async_trait::async_trait;
use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

/// Errors from generation collaborators (text models and artifact generators).
///
/// None of these abort a discovery: callers degrade to a template or to
/// "no artifact".
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("generator not available: {0}")]
    Unavailable(String),
    #[error("generation failed: {0}")]
    InvocationFailed(String),
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
}

/// Client trait for a prompt-in, text-out model.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &str;

    /// Complete a prompt.
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Substitute `{key}` placeholders in command arguments.
pub(crate) fn expand_args(args: &[String], vars: &[(&str, &str)]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            vars.iter().fold(arg.clone(), |acc, (key, value)| {
                acc.replace(&format!("{{{}}}", key), value)
            })
        })
        .collect()
}

/// Run a command to completion under a deadline, returning its stdout.
pub(crate) async fn run_command(
    program: &str,
    args: &[String],
    stdin: Option<&str>,
    limit: Duration,
) -> Result<String, ModelError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| ModelError::Unavailable(format!("failed to start {}: {}", program, e)))?;

    if let Some(input) = stdin {
        if let Some(mut pipe) = child.stdin.take() {
            pipe.write_all(input.as_bytes())
                .await
                .map_err(|e| ModelError::InvocationFailed(format!("failed to write prompt: {}", e)))?;
            // Dropping the pipe closes stdin so the command sees EOF
        }
    }

    let output = match timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(ModelError::InvocationFailed(format!(
                "failed to read output of {}: {}",
                program, e
            )))
        }
        Err(_) => return Err(ModelError::Timeout(limit)),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ModelError::InvocationFailed(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Text model backed by an external command.
///
/// The prompt is written to the command's stdin and also substituted for
/// `{prompt}` in its arguments.
#[derive(Debug, Clone)]
pub struct CommandTextModel {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandTextModel {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }
}

#[async_trait]
impl TextModel for CommandTextModel {
    fn name(&self) -> &str {
        &self.program
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let args = expand_args(&self.args, &[("prompt", prompt)]);
        let text = run_command(&self.program, &args, Some(prompt), self.timeout).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ModelError::InvocationFailed(format!(
                "{} returned no text",
                self.program
            )));
        }
        Ok(text.to_string())
    }
}

/// Mock model for testing: answers prompts by prefix.
pub struct MockTextModel {
    available: bool,
    responses: Vec<(String, Result<String, String>)>,
    calls: AtomicUsize,
}

impl MockTextModel {
    /// Create a mock model that answers registered prompts.
    pub fn available() -> Self {
        Self {
            available: true,
            responses: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock model that fails every call.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            responses: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer any prompt starting with `prefix`.
    pub fn with_response(mut self, prefix: impl Into<String>, text: impl Into<String>) -> Self {
        self.responses.push((prefix.into(), Ok(text.into())));
        self
    }

    /// Fail any prompt starting with `prefix`.
    pub fn with_failure(mut self, prefix: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses.push((prefix.into(), Err(message.into())));
        self
    }

    /// Number of prompts received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextModel for MockTextModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.available {
            return Err(ModelError::Unavailable(
                "mock model configured as unavailable".to_string(),
            ));
        }

        match self.responses.iter().find(|(prefix, _)| prompt.starts_with(prefix.as_str())) {
            Some((_, Ok(text))) => Ok(text.clone()),
            Some((_, Err(message))) => Err(ModelError::InvocationFailed(message.clone())),
            None => Err(ModelError::InvocationFailed(format!(
                "no mock response for prompt '{}'",
                prompt
            ))),
        }
    }
}
