//! `nvidia-smi` process runner
//!
//! Spawns the query tool with captured output and kills it once the
//! configured timeout elapses.

use crate::error::SmiError;
use crate::smi::traits::DriverQuery;

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is polled for exit
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Default query program
pub const DEFAULT_PROGRAM: &str = "nvidia-smi";

/// Driver query backed by the `nvidia-smi` command
#[derive(Debug, Clone)]
pub struct NvidiaSmi {
    program: String,
    timeout: Duration,
}

impl NvidiaSmi {
    /// Create a runner for `program` with the given timeout
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Build the argument list for a field query
    pub fn query_args(fields: &[&str]) -> Vec<String> {
        vec![
            format!("--query-gpu={}", fields.join(",")),
            "--format=csv,noheader".to_string(),
        ]
    }

    fn spawn(&self, args: &[String]) -> Result<Child, SmiError> {
        Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))
    }

    fn spawn_error(&self, source: io::Error) -> SmiError {
        match source.kind() {
            io::ErrorKind::NotFound => SmiError::NotFound(self.program.clone()),
            _ => SmiError::Spawn {
                program: self.program.clone(),
                source,
            },
        }
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus, SmiError> {
        let deadline = Instant::now() + self.timeout;

        loop {
            if let Some(status) = child.try_wait().map_err(|e| self.spawn_error(e))? {
                return Ok(status);
            }

            if Instant::now() >= deadline {
                log::warn!("{} timed out after {:?}, killing it", self.program, self.timeout);
                // The child may already have exited between try_wait and here
                let _ = child.kill();
                let _ = child.wait();
                return Err(SmiError::Timeout {
                    program: self.program.clone(),
                    timeout: self.timeout,
                });
            }

            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Default for NvidiaSmi {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, Duration::from_secs(5))
    }
}

impl DriverQuery for NvidiaSmi {
    fn query(&self, fields: &[&str]) -> Result<String, SmiError> {
        let args = Self::query_args(fields);
        log::debug!("Running {} {}", self.program, args.join(" "));

        let mut child = self.spawn(&args)?;
        let stdout = read_in_background(child.stdout.take());
        let stderr = read_in_background(child.stderr.take());

        let status = self.wait(&mut child)?;
        let stdout = stdout.recv_timeout(self.timeout).unwrap_or_default();
        let stderr = stderr.recv_timeout(self.timeout).unwrap_or_default();

        if !status.success() {
            return Err(SmiError::Failed {
                program: self.program.clone(),
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(stdout)
    }
}

/// Drain a pipe on a helper thread so a chatty child never blocks on a full buffer
fn read_in_background<R: Read + Send + 'static>(pipe: Option<R>) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(e) = pipe.read_to_end(&mut buf) {
                log::debug!("Failed to read child output: {}", e);
            }
        }
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_args() {
        let args = NvidiaSmi::query_args(&["index", "name"]);
        assert_eq!(args, vec!["--query-gpu=index,name", "--format=csv,noheader"]);
    }

    #[test]
    fn test_missing_program() {
        let smi = NvidiaSmi::new("gpucheck-no-such-program", Duration::from_secs(1));
        let result = smi.query(&["index"]);
        assert!(matches!(result, Err(SmiError::NotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_stdout() {
        // `echo` prints its arguments, standing in for the query tool
        let smi = NvidiaSmi::new("echo", Duration::from_secs(5));
        let output = smi.query(&["index", "name"]).unwrap();
        assert_eq!(output.trim(), "--query-gpu=index,name --format=csv,noheader");
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit() {
        let smi = NvidiaSmi::new("false", Duration::from_secs(5));
        let result = smi.query(&["index"]);
        assert!(matches!(result, Err(SmiError::Failed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        // `sleep` rejects the query flags, so use a script that outlives the timeout
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow-smi");
        std::fs::write(&script, "#!/bin/sh\nsleep 5\n").unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let smi = NvidiaSmi::new(script.to_string_lossy(), Duration::from_millis(200));
        let start = Instant::now();
        let result = smi.query(&["index"]);
        assert!(matches!(result, Err(SmiError::Timeout { .. })));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    #[ignore = "Requires NVIDIA GPU"]
    fn test_real_query() {
        let smi = NvidiaSmi::default();
        assert!(smi.query(&["index", "name"]).is_ok());
    }
}
