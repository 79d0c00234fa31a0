//! Media introspection used by the video and resolution validators.

pub mod ffprobe;

pub use ffprobe::FfprobeProbe;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probing tool is not installed. Callers skip the check.
    #[error("{tool} not found - is it installed?")]
    Unavailable { tool: String },

    #[error("{tool} timed out after {}s", .timeout.as_secs())]
    Timeout { tool: String, timeout: Duration },

    #[error("{tool} exited with code {code}: {stderr}")]
    Failed {
        tool: String,
        code: i32,
        stderr: String,
    },

    #[error("could not parse probe output: {0}")]
    Malformed(String),

    #[error("probe I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One stream reported by a probe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// `video`, `audio`, `subtitle`, ...
    pub codec_type: String,
    pub codec_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl StreamInfo {
    pub fn video(codec: &str, width: u32, height: u32) -> Self {
        Self {
            codec_type: "video".to_string(),
            codec_name: Some(codec.to_string()),
            width: Some(width),
            height: Some(height),
        }
    }

    pub fn audio(codec: &str) -> Self {
        Self {
            codec_type: "audio".to_string(),
            codec_name: Some(codec.to_string()),
            width: None,
            height: None,
        }
    }

    pub fn is_video(&self) -> bool {
        self.codec_type.eq_ignore_ascii_case("video")
    }
}

/// Stream metadata for one media file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub streams: Vec<StreamInfo>,
}

impl MediaInfo {
    pub fn first_video_stream(&self) -> Option<&StreamInfo> {
        self.streams.iter().find(|s| s.is_video())
    }
}

/// Capability for inspecting media files.
///
/// The runner is handed one of these so tests can swap the ffprobe
/// subprocess for a deterministic fake.
pub trait Probe: Send + Sync {
    fn probe(&self, path: &Path) -> Result<MediaInfo, ProbeError>;
}
