//! Probe-backed checks on the first video stream of a media file.

use crate::model::{Status, TestResult};
use crate::probe::{Probe, ProbeError, StreamInfo};
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const VIDEO_CODEC: &str = "Video Codec Check";
pub const RESOLUTION: &str = "Resolution Check";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VideoCodecParams {
    pub path: PathBuf,
    #[serde(default)]
    pub expected_codec: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolutionParams {
    pub path: PathBuf,
    #[serde(default)]
    pub expected_width: Option<u32>,
    #[serde(default)]
    pub expected_height: Option<u32>,
}

/// Probe `path` and return its first video stream, or the terminal result
/// explaining why there is none.
fn first_video_stream(
    probe: &dyn Probe,
    path: &Path,
    name: &str,
    check: &str,
    started: Instant,
) -> Result<StreamInfo, TestResult> {
    let info = match probe.probe(path) {
        Ok(info) => info,
        Err(ProbeError::Unavailable { tool }) => {
            return Err(TestResult::since(
                name,
                Status::Skipped,
                started,
                format!("{tool} not found - skipping {check} check"),
            )
            .with_details(json!({ "tool": tool })));
        }
        Err(e) => return Err(TestResult::error(name, started, e.to_string())),
    };

    match info.first_video_stream() {
        Some(stream) => Ok(stream.clone()),
        None => Err(TestResult::since(
            name,
            Status::Failed,
            started,
            "No video stream found",
        )
        .with_details(json!({ "streams": info.streams.len() }))),
    }
}

/// Pass when the first video stream uses `expected_codec` (case-insensitive).
/// Without an expectation, pass and report the detected codec.
pub fn video_codec(params: &VideoCodecParams, probe: &dyn Probe) -> TestResult {
    let started = Instant::now();
    let stream = match first_video_stream(probe, &params.path, VIDEO_CODEC, "codec", started) {
        Ok(stream) => stream,
        Err(result) => return result,
    };

    let codec = stream.codec_name.as_deref().unwrap_or("unknown");
    match &params.expected_codec {
        Some(expected) => {
            let matches = codec.eq_ignore_ascii_case(expected);
            TestResult::since(
                VIDEO_CODEC,
                if matches { Status::Passed } else { Status::Failed },
                started,
                format!("Codec: {codec} (expected: {expected})"),
            )
            .with_details(json!({ "codec": codec, "expected": expected }))
        }
        None => TestResult::since(
            VIDEO_CODEC,
            Status::Passed,
            started,
            format!("Codec detected: {codec}"),
        )
        .with_details(json!({ "codec": codec })),
    }
}

/// Pass when the first video stream matches every supplied dimension.
pub fn resolution(params: &ResolutionParams, probe: &dyn Probe) -> TestResult {
    let started = Instant::now();
    let stream = match first_video_stream(probe, &params.path, RESOLUTION, "resolution", started)
    {
        Ok(stream) => stream,
        Err(result) => return result,
    };

    let width_ok = params.expected_width.map_or(true, |w| stream.width == Some(w));
    let height_ok = params.expected_height.map_or(true, |h| stream.height == Some(h));
    let dim = |v: Option<u32>| v.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string());

    TestResult::since(
        RESOLUTION,
        if width_ok && height_ok {
            Status::Passed
        } else {
            Status::Failed
        },
        started,
        format!("Resolution: {}x{}", dim(stream.width), dim(stream.height)),
    )
    .with_details(json!({
        "width": stream.width,
        "height": stream.height,
        "expected_width": params.expected_width,
        "expected_height": params.expected_height,
    }))
}
