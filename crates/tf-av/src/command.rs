//! Builder for executing external tool commands with timeout support.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;

use tf_core::ConversionError;

/// Default command timeout: 2 minutes.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// The spawned process is killed if the returned future is dropped, which is
/// how both timeouts and run cancellation terminate a running conversion.
///
/// # Example
///
/// ```no_run
/// use tf_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> Result<(), tf_core::ConversionError> {
/// let output = ToolCommand::new(PathBuf::from("ffmpeg"))
///     .arg("-ss").arg("1")
///     .arg("-i").arg("/albums/beach/clip.mp4")
///     .arg("-frames:v").arg("1")
///     .arg("/thumbnails/beach_thumb.webp")
///     .execute()
///     .await?;
/// println!("{}", output.stderr);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = d;
        self
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - [`ConversionError::ToolNotFound`] if the program does not exist.
    /// - [`ConversionError::Spawn`] if spawning fails for any other reason.
    /// - [`ConversionError::TimedOut`] if the deadline passes; the process is
    ///   killed.
    /// - [`ConversionError::Exit`] if the process exits with a non-zero status
    ///   (carries stderr).
    pub async fn execute(&self) -> Result<ToolOutput, ConversionError> {
        let program_name = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(tool = %program_name, args = ?self.args, "spawning");

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConversionError::ToolNotFound {
                    tool: program_name.clone(),
                }
            } else {
                ConversionError::Spawn {
                    tool: program_name.clone(),
                    source: e,
                }
            }
        })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let result = tokio::time::timeout(self.timeout, child.wait_with_output()).await;

        match result {
            Ok(Ok(output)) => {
                let tool_output = ToolOutput {
                    status: output.status,
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                };

                if !output.status.success() {
                    return Err(ConversionError::Exit {
                        tool: program_name,
                        code: output.status.code(),
                        stderr: tool_output.stderr.trim().to_string(),
                    });
                }

                Ok(tool_output)
            }
            Ok(Err(e)) => Err(ConversionError::Spawn {
                tool: program_name,
                source: e,
            }),
            Err(_elapsed) => Err(ConversionError::TimedOut {
                tool: program_name,
                timeout: self.timeout,
            }),
        }
    }
}
