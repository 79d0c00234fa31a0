//! ffprobe process wrapper -- spawn, parse JSON output, enforce timeouts.

use super::{MediaInfo, Probe, ProbeError, StreamInfo};
use serde::Deserialize;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Parsed `ffprobe -show_streams` JSON (subset of fields we care about).
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Probe backed by the `ffprobe` binary from FFmpeg.
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    program: PathBuf,
    timeout: Duration,
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl FfprobeProbe {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }
}

impl FfprobeProbe {
    /// Spawn ffprobe and collect its output. Waiting for exit and draining
    /// both pipes share one deadline, so a descendant that keeps a pipe open
    /// cannot hold the call past the timeout.
    async fn run(&self, path: &Path) -> Result<Output, ProbeError> {
        let spawned = Command::new(&self.program)
            .args(["-v", "quiet", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(program = %self.program.display(), "Probe binary not found");
                return Err(ProbeError::Unavailable {
                    tool: self.tool_name(),
                });
            }
            Err(e) => return Err(ProbeError::Io(e)),
        };

        let outcome = tokio::time::timeout(self.timeout, collect_output(&mut child)).await;
        match outcome {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => {
                warn!(path = %path.display(), error = %e, "Probe I/O failed, killing child");
                reap(&mut child).await;
                Err(ProbeError::Io(e))
            }
            Err(_) => {
                warn!(
                    path = %path.display(),
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Probe timed out, killing child"
                );
                reap(&mut child).await;
                Err(ProbeError::Timeout {
                    tool: self.tool_name(),
                    timeout: self.timeout,
                })
            }
        }
    }
}

impl Probe for FfprobeProbe {
    fn probe(&self, path: &Path) -> Result<MediaInfo, ProbeError> {
        debug!(program = %self.program.display(), path = %path.display(), "Probing media");
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let output = runtime.block_on(self.run(path))?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                tool: self.tool_name(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse ffprobe JSON output into stream metadata.
pub fn parse_output(json_str: &str) -> Result<MediaInfo, ProbeError> {
    let output: FfprobeOutput =
        serde_json::from_str(json_str).map_err(|e| ProbeError::Malformed(e.to_string()))?;

    Ok(MediaInfo {
        streams: output
            .streams
            .into_iter()
            .map(|s| StreamInfo {
                codec_type: s.codec_type.unwrap_or_default(),
                codec_name: s.codec_name,
                width: s.width,
                height: s.height,
            })
            .collect(),
    })
}

/// Wait for exit while draining stdout and stderr concurrently.
async fn collect_output(child: &mut Child) -> io::Result<Output> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (status, stdout, stderr) =
        tokio::try_join!(child.wait(), read_pipe(stdout), read_pipe(stderr))?;
    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Kill the child if it is still running and wait for it, leaving no zombie.
async fn reap(child: &mut Child) {
    if let Err(e) = child.kill().await {
        debug!(error = %e, "Child already exited");
    }
}
