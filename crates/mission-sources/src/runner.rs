use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SourceError};

/// Longest stderr excerpt kept in an error.
const MAX_STDERR_CHARS: usize = 500;

/// A fixed binary plus its argument vector. Never passed through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Run `spec` to completion and return its stdout.
///
/// The child is killed if it outlives `timeout`.
pub async fn run(spec: &CommandSpec, timeout: Duration) -> Result<Vec<u8>> {
    debug!(program = %spec.program, args = ?spec.args, "running external command");

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(result) => result.map_err(|e| SourceError::Spawn {
            program: spec.program.clone(),
            reason: e.to_string(),
        })?,
        // Dropping the output future drops the child, which kills it.
        Err(_) => {
            return Err(SourceError::Timeout {
                program: spec.program.clone(),
                ms: timeout.as_millis() as u64,
            })
        }
    };

    if !output.status.success() {
        let stderr: String = String::from_utf8_lossy(&output.stderr)
            .trim()
            .chars()
            .take(MAX_STDERR_CHARS)
            .collect();
        return Err(SourceError::NonZeroExit {
            program: spec.program.clone(),
            code: output.status.code(),
            stderr,
        });
    }

    Ok(output.stdout)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh").arg("-c").arg(script)
    }

    #[tokio::test]
    async fn returns_stdout() {
        let out = run(&sh("printf '[1,2]'"), Duration::from_secs(5)).await.unwrap();
        assert_eq!(out, b"[1,2]");
    }

    #[tokio::test]
    async fn args_are_not_shell_interpreted() {
        let spec = CommandSpec::new("printf").arg("%s").arg("$(echo hi); ls");
        let out = run(&spec, Duration::from_secs(5)).await.unwrap();
        assert_eq!(out, b"$(echo hi); ls");
    }

    #[tokio::test]
    async fn env_is_passed() {
        let spec = sh("printf \"$GOG_ACCOUNT\"").env("GOG_ACCOUNT", "me@example.com");
        let out = run(&spec, Duration::from_secs(5)).await.unwrap();
        assert_eq!(out, b"me@example.com");
    }

    #[tokio::test]
    async fn nonzero_exit_carries_stderr() {
        let err = run(&sh("echo boom >&2; exit 3"), Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            SourceError::NonZeroExit { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let err = run(&CommandSpec::new("definitely-not-a-real-binary-xyz"), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Spawn { .. }));
    }

    #[tokio::test]
    async fn slow_child_times_out() {
        let started = std::time::Instant::now();
        let err = run(&sh("sleep 5"), Duration::from_millis(200)).await.unwrap_err();
        assert!(matches!(err, SourceError::Timeout { ms: 200, .. }));
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
