//! Ollama CLI generator — runs `ollama run <model>` as a child process.
//!
//! The prompt is written to the child's stdin and the completion is read
//! from stdout. Every failure mode maps onto a [`GenerationError`] variant;
//! nothing here panics or returns sentinel strings.

use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use neuroqueue_core::error::GenerationError;
use neuroqueue_core::generation::{GenerationRequest, Generator};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use std::process::Stdio;
use tracing::{debug, warn};

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Generator backed by the local `ollama` executable.
pub struct OllamaCliGenerator {
    binary: String,
    model: String,
    timeout: Duration,
}

impl OllamaCliGenerator {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            binary: "ollama".into(),
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use a different executable (path or name on `PATH`).
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn spawn_error(&self, e: std::io::Error) -> GenerationError {
        if e.kind() == ErrorKind::NotFound {
            GenerationError::NotInstalled {
                binary: self.binary.clone(),
            }
        } else {
            GenerationError::Io(format!("failed to start '{}': {e}", self.binary))
        }
    }

    async fn run_child(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let mut child = Command::new(&self.binary)
            .args(["run", model])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // Feed stdin while draining stdout/stderr; a prompt larger than the
        // pipe buffer would otherwise block both sides.
        let stdin = child.stdin.take();
        let send_prompt = async move {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            match stdin.write_all(prompt.as_bytes()).await {
                Ok(()) => Ok(()),
                // The child may exit without reading its input; its exit
                // status is what gets reported.
                Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
                Err(e) => Err(GenerationError::Io(format!("failed to send prompt: {e}"))),
            }
        };

        let (sent, output) = tokio::join!(send_prompt, child.wait_with_output());
        sent?;
        let output =
            output.map_err(|e| GenerationError::Io(format!("failed to read output: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout).replace('\u{FFFD}', "");
        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(binary = %self.binary, model, exit_code = code, "Generation process failed");
            return Err(GenerationError::ExitStatus {
                code,
                stderr,
                stdout: stdout.trim().to_string(),
            });
        }

        Ok(stdout.trim().to_string())
    }
}

#[async_trait]
impl Generator for OllamaCliGenerator {
    fn name(&self) -> &str {
        "ollama-cli"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let model = request.model.as_deref().unwrap_or(&self.model);
        let timeout = request.timeout.unwrap_or(self.timeout);

        debug!(
            model,
            prompt_chars = request.prompt.len(),
            timeout_secs = timeout.as_secs(),
            "Invoking generation process"
        );

        match tokio::time::timeout(timeout, self.run_child(model, &request.prompt)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(model, timeout_secs = timeout.as_secs(), "Generation timed out");
                Err(GenerationError::Timeout {
                    secs: timeout.as_secs(),
                })
            }
        }
    }

    async fn health_check(&self) -> Result<bool, GenerationError> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();

        match tokio::time::timeout(Duration::from_secs(10), output).await {
            Ok(Ok(status)) => Ok(status.success()),
            Ok(Err(e)) => Err(self.spawn_error(e)),
            Err(_) => Err(GenerationError::Timeout { secs: 10 }),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Write an executable shell script standing in for `ollama`.
    fn fake_binary(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("fake-ollama");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn generator(path: &std::path::Path) -> OllamaCliGenerator {
        OllamaCliGenerator::new("test-model").with_binary(path.to_string_lossy())
    }

    #[tokio::test]
    async fn returns_trimmed_stdout() {
        let dir = TempDir::new().unwrap();
        let bin = fake_binary(&dir, "cat; echo");
        let out = generator(&bin)
            .generate(GenerationRequest::new("  hello model  "))
            .await
            .unwrap();
        assert_eq!(out, "hello model");
    }

    #[tokio::test]
    async fn large_prompt_streams_through_without_blocking() {
        let dir = TempDir::new().unwrap();
        let bin = fake_binary(&dir, "cat");
        let prompt = "q".repeat(512 * 1024);

        let out = generator(&bin)
            .with_timeout(Duration::from_secs(20))
            .generate(GenerationRequest::new(prompt.clone()))
            .await
            .unwrap();

        assert_eq!(out.len(), prompt.len());
    }

    #[tokio::test]
    async fn passes_model_argument() {
        let dir = TempDir::new().unwrap();
        let bin = fake_binary(&dir, r#"echo "$1 $2""#);
        let gen_default = generator(&bin);
        let out = gen_default.generate(GenerationRequest::new("x")).await.unwrap();
        assert_eq!(out, "run test-model");

        let out = gen_default
            .generate(GenerationRequest::new("x").with_model("other"))
            .await
            .unwrap();
        assert_eq!(out, "run other");
    }

    #[tokio::test]
    async fn nonzero_exit_maps_to_exit_status() {
        let dir = TempDir::new().unwrap();
        let bin = fake_binary(&dir, "echo 'model not pulled' >&2; exit 3");
        let err = generator(&bin)
            .generate(GenerationRequest::new("x"))
            .await
            .unwrap_err();
        match err {
            GenerationError::ExitStatus { code, stderr, .. } => {
                assert_eq!(code, 3);
                assert!(stderr.contains("model not pulled"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_process_times_out() {
        let dir = TempDir::new().unwrap();
        let bin = fake_binary(&dir, "sleep 5");
        let err = generator(&bin)
            .with_timeout(Duration::from_millis(200))
            .generate(GenerationRequest::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Timeout { .. }));
    }

    #[tokio::test]
    async fn missing_binary_reports_not_installed() {
        let err = OllamaCliGenerator::new("m")
            .with_binary("/nonexistent/neuroqueue-ollama")
            .generate(GenerationRequest::new("x"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GenerationError::NotInstalled {
                binary: "/nonexistent/neuroqueue-ollama".into()
            }
        );
    }

    #[tokio::test]
    async fn health_check_uses_version_flag() {
        let dir = TempDir::new().unwrap();
        let bin = fake_binary(&dir, r#"[ "$1" = "--version" ]"#);
        assert!(generator(&bin).health_check().await.unwrap());
    }
}
