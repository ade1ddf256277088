use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::error::{ManagerError, Result};
use crate::models::RuntimeConfig;

/// Exit status and captured output of one container runtime invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }

    /// Text to surface to the caller when the command failed.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.status_code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Starts and stops the containers defined in a site directory.
pub trait ContainerRuntime: Send + Sync {
    /// Build and start every service, with `site_dir` as working directory.
    fn up(&self, site_dir: &Path) -> impl Future<Output = Result<CommandOutput>> + Send;

    /// Stop every service and remove its volumes.
    fn down(&self, site_dir: &Path) -> impl Future<Output = Result<CommandOutput>> + Send;
}

/// Runs the configured compose command lines as child processes.
#[derive(Debug, Clone)]
pub struct ComposeRuntime {
    program: String,
    up_args: Vec<String>,
    down_args: Vec<String>,
    up_timeout: Duration,
    down_timeout: Duration,
}

impl ComposeRuntime {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            program: config.program.clone(),
            up_args: config.up_args.clone(),
            down_args: config.down_args.clone(),
            up_timeout: config.up_timeout(),
            down_timeout: config.down_timeout(),
        }
    }

    pub fn with_timeouts(mut self, up: Duration, down: Duration) -> Self {
        self.up_timeout = up;
        self.down_timeout = down;
        self
    }

    async fn run(
        &self,
        operation: &str,
        args: &[String],
        working_directory: &Path,
        timeout: Duration,
    ) -> Result<CommandOutput> {
        tracing::debug!(
            program = %self.program,
            args = ?args,
            cwd = %working_directory.display(),
            "running container runtime"
        );

        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(working_directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ManagerError::RuntimeUnavailable(format!("failed to run {}: {e}", self.program))
            })?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    read_all("stdout", &mut stdout_handle),
                    read_all("stderr", &mut stderr_handle),
                );
                status
                    .map(|status| CommandOutput {
                        status_code: status.code(),
                        stdout,
                        stderr,
                    })
                    .map_err(|e| {
                        ManagerError::RuntimeUnavailable(format!("waiting for {}: {e}", self.program))
                    })
            } => result,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                tracing::warn!(operation, seconds = timeout.as_secs(), "container runtime timed out");
                Err(ManagerError::RuntimeTimeout {
                    operation: operation.to_string(),
                    seconds: timeout.as_secs(),
                })
            }
        }
    }
}

/// Drain one output pipe. A read error keeps whatever arrived before it.
async fn read_all<R: tokio::io::AsyncRead + Unpin>(
    stream: &'static str,
    handle: &mut Option<R>,
) -> String {
    let mut buf = Vec::new();
    if let Some(h) = handle.as_mut() {
        if let Err(e) = h.read_to_end(&mut buf).await {
            tracing::debug!(stream, error = %e, "runtime output read failed");
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

impl ContainerRuntime for ComposeRuntime {
    async fn up(&self, site_dir: &Path) -> Result<CommandOutput> {
        self.run("up", &self.up_args, site_dir, self.up_timeout)
            .await
    }

    async fn down(&self, site_dir: &Path) -> Result<CommandOutput> {
        self.run("down", &self.down_args, site_dir, self.down_timeout)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    struct ClosedPipe;

    impl tokio::io::AsyncRead for ClosedPipe {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "pipe closed",
            )))
        }
    }

    #[tokio::test]
    async fn read_all_tolerates_pipe_errors() {
        let mut broken = Some(ClosedPipe);
        assert_eq!(read_all("stderr", &mut broken).await, "");

        let mut missing: Option<ClosedPipe> = None;
        assert_eq!(read_all("stdout", &mut missing).await, "");

        let mut ok = Some(&b"service started\n"[..]);
        assert_eq!(read_all("stdout", &mut ok).await, "service started\n");
    }

    #[test]
    fn diagnostic_prefers_stderr() {
        let output = CommandOutput {
            status_code: Some(1),
            stdout: "building\n".into(),
            stderr: "  port is already allocated\n".into(),
        };
        assert!(!output.success());
        assert_eq!(output.diagnostic(), "port is already allocated");

        let output = CommandOutput {
            status_code: Some(2),
            stdout: String::new(),
            stderr: String::new(),
        };
        assert_eq!(output.diagnostic(), "exit code 2");
    }

    #[test]
    fn default_config_runs_docker_compose() {
        let runtime = ComposeRuntime::new(&RuntimeConfig::default());
        assert_eq!(runtime.program, "docker");
        assert_eq!(runtime.up_args, vec!["compose", "up", "-d", "--build"]);
        assert_eq!(runtime.down_args, vec!["compose", "down", "-v"]);
        assert_eq!(runtime.up_timeout, Duration::from_secs(600));
    }

    #[cfg(unix)]
    fn shell_runtime(up_script: &str, down_script: &str) -> ComposeRuntime {
        ComposeRuntime::new(&RuntimeConfig {
            program: "sh".into(),
            up_args: vec!["-c".into(), up_script.into()],
            down_args: vec!["-c".into(), down_script.into()],
            up_timeout_secs: 5,
            down_timeout_secs: 5,
        })
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_exit_code_and_output() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = shell_runtime("echo started; echo warning >&2", "echo broken >&2; exit 3");

        let up = runtime.up(dir.path()).await.unwrap();
        assert!(up.success());
        assert_eq!(up.stdout.trim(), "started");
        assert_eq!(up.stderr.trim(), "warning");

        let down = runtime.down(dir.path()).await.unwrap();
        assert_eq!(down.status_code, Some(3));
        assert_eq!(down.diagnostic(), "broken");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_inside_site_directory() {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("blog.example.com");
        std::fs::create_dir_all(&site).unwrap();
        let runtime = shell_runtime("pwd", "true");

        let output = runtime.up(&site).await.unwrap();
        assert!(output.stdout.trim().ends_with("blog.example.com"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_runtime_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = shell_runtime("sleep 10", "true")
            .with_timeouts(Duration::from_millis(200), Duration::from_secs(5));

        let err = runtime.up(dir.path()).await.unwrap_err();
        assert!(matches!(err, ManagerError::RuntimeTimeout { ref operation, .. } if operation == "up"));
        assert_eq!(err.reason(), "runtime_timeout");
    }

    #[tokio::test]
    async fn missing_program_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = ComposeRuntime::new(&RuntimeConfig {
            program: "definitely-not-a-container-runtime".into(),
            ..RuntimeConfig::default()
        });
        let err = runtime.up(dir.path()).await.unwrap_err();
        assert!(matches!(err, ManagerError::RuntimeUnavailable(_)));
    }
}
