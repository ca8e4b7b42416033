//! Per-invocation container sandbox.
//!
//! Every invocation gets a fresh container: no network, capped memory and
//! CPU, read-only root, the wrapped source staged through a private host
//! temp dir mounted read-only, and a small tmpfs for scratch. Containers are
//! never reused and are killed and discarded on timeout or cancellation.

use std::process::Stdio;
use std::time::{Duration, Instant};

use praxis_types::ErrorCode;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use uuid::Uuid;

use crate::languages::LanguageSpec;

/// Captured outcome of one sandbox invocation.
#[derive(Debug, Clone)]
pub(crate) struct SandboxOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub timed_out: bool,
    pub duration: Duration,
}

/// Infrastructure failures. Messages are caller-safe: no host paths, no
/// container identifiers.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("failed to stage source for execution")]
    Stage(#[source] std::io::Error),
    #[error("sandbox runtime is unavailable")]
    Spawn(#[source] std::io::Error),
    #[error("failed to capture sandbox output")]
    Capture,
    #[error("sandbox wait failed")]
    Wait(#[source] std::io::Error),
}

impl SandboxError {
    /// The caller-facing error kind for this failure.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            SandboxError::Spawn(_) => ErrorCode::ServiceUnavailable,
            SandboxError::Stage(_) | SandboxError::Capture | SandboxError::Wait(_) => {
                ErrorCode::ExecutionFailed
            }
        }
    }
}

/// Handle to the container runtime CLI.
#[derive(Debug, Clone)]
pub(crate) struct DockerRuntime {
    binary: String,
}

impl DockerRuntime {
    pub(crate) fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// True when the runtime daemon answers a version query.
    pub(crate) async fn ping(&self) -> bool {
        Command::new(&self.binary)
            .args(["version", "--format", "{{.Server.Version}}"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Pull an image into the local cache. Returns false on failure; callers
    /// log and continue, since the image may already be present.
    pub(crate) async fn pull(&self, image: &str) -> bool {
        Command::new(&self.binary)
            .args(["pull", image])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Run wrapped source in a fresh container with a hard wall-clock
    /// ceiling. On timeout the container is killed and discarded; the future
    /// being dropped has the same effect via the child guard.
    pub(crate) async fn run(
        &self,
        spec: &LanguageSpec,
        source: &str,
        timeout: Duration,
    ) -> Result<SandboxOutput, SandboxError> {
        let staging = tempfile::tempdir().map_err(SandboxError::Stage)?;
        let source_path = staging.path().join(spec.source_file);
        tokio::fs::write(&source_path, source)
            .await
            .map_err(SandboxError::Stage)?;

        let name = format!("praxis-{}", Uuid::new_v4());
        let mut command = Command::new(&self.binary);
        command
            .arg("run")
            .arg("--rm")
            .args(["--name", &name])
            .args(["--network", "none"])
            .args(["--memory", spec.memory_limit])
            .args(["--cpus", spec.cpus])
            .arg("--read-only")
            .args(["--tmpfs", "/tmp:rw,size=50m,mode=1777"])
            .arg("-v")
            .arg(format!("{}:/sandbox:ro", staging.path().display()))
            .args(["-w", "/sandbox"]);
        for entry in spec.env {
            command.args(["-e", entry]);
        }
        command.arg(spec.image);
        command.args(spec.command);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(unix)]
        set_new_session(&mut command);

        let started = Instant::now();
        let child = command.spawn().map_err(SandboxError::Spawn)?;
        let mut guard = ChildGuard::new(child);

        let stdout = guard
            .child_mut()
            .stdout
            .take()
            .ok_or(SandboxError::Capture)?;
        let stderr = guard
            .child_mut()
            .stderr
            .take()
            .ok_or(SandboxError::Capture)?;
        let stdout_task = tokio::spawn(read_lossy(stdout));
        let stderr_task = tokio::spawn(read_lossy(stderr));

        match tokio::time::timeout(timeout, guard.child_mut().wait()).await {
            Ok(Ok(status)) => {
                guard.disarm();
                let stdout = stdout_task.await.unwrap_or_default();
                let stderr = stderr_task.await.unwrap_or_default();
                Ok(SandboxOutput {
                    stdout,
                    stderr,
                    exit_code: status.code().unwrap_or(-1),
                    timed_out: false,
                    duration: started.elapsed(),
                })
            }
            Ok(Err(e)) => Err(SandboxError::Wait(e)),
            Err(_elapsed) => {
                // Kill the client process group, then the named container:
                // the daemon keeps a container alive past its client.
                drop(guard);
                stdout_task.abort();
                stderr_task.abort();
                self.kill_container(&name).await;
                Ok(SandboxOutput {
                    stdout: String::new(),
                    stderr: String::new(),
                    exit_code: -1,
                    timed_out: true,
                    duration: started.elapsed(),
                })
            }
        }
    }

    async fn kill_container(&self, name: &str) {
        let _ = Command::new(&self.binary)
            .args(["kill", name])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
    }
}

async fn read_lossy<R>(mut reader: R) -> String
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    let mut buf = Vec::new();
    let _ = reader.read_to_end(&mut buf).await;
    String::from_utf8_lossy(&buf).into_owned()
}

/// RAII guard that kills the child (and its process group on Unix) on drop.
///
/// Wraps a spawned child immediately after `spawn()` so cleanup happens even
/// when the owning future is cancelled. `disarm()` after a normal exit
/// prevents the kill.
struct ChildGuard {
    child: Option<tokio::process::Child>,
}

impl ChildGuard {
    fn new(child: tokio::process::Child) -> Self {
        Self { child: Some(child) }
    }

    fn child_mut(&mut self) -> &mut tokio::process::Child {
        self.child.as_mut().expect("child present")
    }

    fn disarm(&mut self) {
        self.child = None;
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        let Some(child) = self.child.as_mut() else {
            return;
        };
        #[cfg(unix)]
        {
            if let Some(pid) = child.id() {
                unsafe {
                    if libc::killpg(pid as i32, libc::SIGKILL) == -1 {
                        let _ = child.start_kill();
                    }
                }
            }
            let _ = child.try_wait();
        }
        #[cfg(not(unix))]
        {
            let _ = child.start_kill();
            let _ = child.try_wait();
        }
    }
}

/// Put the child in its own session so the whole process group can be killed
/// from `ChildGuard::drop`.
#[cfg(unix)]
fn set_new_session(command: &mut Command) {
    use std::os::unix::process::CommandExt;

    unsafe {
        command.as_std_mut().pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(std::io::Error::last_os_error());
            }
            // Linux-only: kill the runtime client if the server itself dies
            // (crash, OOM-kill). The daemon-side container can still outlive
            // both; the named `docker kill` covers that path.
            #[cfg(target_os = "linux")]
            unsafe {
                if libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGKILL) == -1 {
                    return Err(std::io::Error::last_os_error());
                }
            }
            Ok(())
        });
    }
}
