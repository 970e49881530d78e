//! Native toolchain validation
//!
//! The compiler is used purely as a syntactic gate: the engine never runs
//! the produced binary. Source and output artifacts get UUID-scoped names
//! under the system temp directory and are removed on every exit path.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ValidatorConfig;
use crate::error::EngineError;

/// Seam between the session façade and the native toolchain.
pub trait Validate {
    /// `Ok(())` when the source is acceptable; `EngineError::Compilation`
    /// with the combined diagnostics otherwise.
    fn validate(&self, source: &str) -> Result<(), EngineError>;
}

/// Accepts everything. Used by tests and by callers that already validated.
pub struct NoValidation;

impl Validate for NoValidation {
    fn validate(&self, _source: &str) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Invokes the configured C++ compiler with a wall-clock budget.
pub struct ToolchainValidator {
    config: ValidatorConfig,
}

impl ToolchainValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        ToolchainValidator { config }
    }
}

impl Validate for ToolchainValidator {
    fn validate(&self, source: &str) -> Result<(), EngineError> {
        let tag = Uuid::new_v4();
        let dir = std::env::temp_dir();
        let src_path = dir.join(format!("steptrace-{}.cpp", tag));
        let out_path = dir.join(format!("steptrace-{}.bin", tag));
        let _artifacts = Artifacts {
            paths: vec![src_path.clone(), out_path.clone()],
        };

        fs::write(&src_path, source)
            .map_err(|e| EngineError::Internal(format!("failed to write source: {}", e)))?;

        let mut command = Command::new(&self.config.compiler);
        command
            .args(&self.config.args)
            .arg(&src_path)
            .arg("-o")
            .arg(&out_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        debug!(compiler = %self.config.compiler, src = %src_path.display(), "validating");

        let mut child = command.spawn().map_err(|e| {
            EngineError::Internal(format!(
                "failed to launch compiler '{}': {}",
                self.config.compiler, e
            ))
        })?;

        let status = match wait_with_deadline(&mut child, self.config.timeout) {
            Some(status) => status,
            None => {
                warn!(timeout = ?self.config.timeout, "compilation timed out");
                let _ = child.kill();
                let _ = child.wait();
                return Err(EngineError::Compilation {
                    details: format!(
                        "compilation timed out after {} seconds",
                        self.config.timeout.as_secs()
                    ),
                });
            }
        };

        if status.success() {
            return Ok(());
        }

        let mut details = String::new();
        if let Some(mut stdout) = child.stdout.take() {
            let _ = stdout.read_to_string(&mut details);
        }
        if let Some(mut stderr) = child.stderr.take() {
            let _ = stderr.read_to_string(&mut details);
        }
        if details.trim().is_empty() {
            details = format!("compiler exited with {}", status);
        }
        Err(EngineError::Compilation { details })
    }
}

/// Poll the child until it exits or the deadline passes.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Option<std::process::ExitStatus> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    return None;
                }
                thread::sleep(Duration::from_millis(25));
            }
            Err(_) => return None,
        }
    }
}

/// Removes the temp artifacts on drop, on every exit path.
struct Artifacts {
    paths: Vec<PathBuf>,
}

impl Drop for Artifacts {
    fn drop(&mut self) {
        for path in &self.paths {
            let _ = fs::remove_file(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub(script: &str, timeout: Duration) -> ToolchainValidator {
        ToolchainValidator::new(ValidatorConfig {
            compiler: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            timeout,
        })
    }

    #[test]
    fn test_success_path() {
        let validator = stub("exit 0", Duration::from_secs(5));
        assert!(validator.validate("int main(){}").is_ok());
    }

    #[test]
    fn test_failure_carries_diagnostics() {
        let validator = stub("echo 'expected expression' >&2; exit 1", Duration::from_secs(5));
        let err = validator.validate("int main(){ int x = ; }").unwrap_err();
        match err {
            EngineError::Compilation { details } => {
                assert!(details.contains("expected expression"));
            }
            other => panic!("expected Compilation, got {:?}", other),
        }
    }

    #[test]
    fn test_timeout_is_a_compilation_error() {
        let validator = stub("sleep 5", Duration::from_millis(100));
        let err = validator.validate("int main(){}").unwrap_err();
        match err {
            EngineError::Compilation { details } => assert!(details.contains("timed out")),
            other => panic!("expected Compilation, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_compiler_is_internal() {
        let validator = ToolchainValidator::new(ValidatorConfig {
            compiler: "steptrace-no-such-compiler".to_string(),
            args: vec![],
            timeout: Duration::from_secs(1),
        });
        assert!(matches!(
            validator.validate("int main(){}"),
            Err(EngineError::Internal(_))
        ));
    }

    #[test]
    fn test_artifact_guard_removes_files() {
        let path = std::env::temp_dir().join(format!("steptrace-guard-{}.tmp", Uuid::new_v4()));
        fs::write(&path, "x").unwrap();
        assert!(path.exists());
        drop(Artifacts {
            paths: vec![path.clone()],
        });
        assert!(!path.exists());
    }
}
