//! Validator set: stateless checks that turn declaration params into results.
//!
//! Every validator returns exactly one [`TestResult`] and never lets an error
//! or panic escape:
//! - assertion evaluated and false: `Failed`
//! - assertion could not be evaluated (bad params, I/O fault, probe failure
//!   or timeout, panic): `Error`
//! - required external tool missing: `Skipped`
//!
//! Validators do not log and hold no state between calls.

pub mod checksum;
pub mod file;
pub mod media;
pub mod schema;

pub use checksum::{checksum, ChecksumParams, HashAlgorithm};
pub use file::{file_exists, file_format, file_size, FileFormatParams, FileSizeParams, PathParams};
pub use media::{resolution, video_codec, ResolutionParams, VideoCodecParams};
pub use schema::{json_schema, JsonSchemaParams};

use crate::model::{Status, TestResult};
use crate::probe::Probe;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Closed set of validator kinds a declaration can name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatorKind {
    FileExists,
    FileFormat,
    FileSize,
    JsonSchema,
    Checksum,
    VideoCodec,
    Resolution,
    /// A discriminator no validator answers to.
    Unknown(String),
}

impl ValidatorKind {
    /// Every known kind, in documentation order.
    pub const KNOWN: [ValidatorKind; 7] = [
        ValidatorKind::FileExists,
        ValidatorKind::FileFormat,
        ValidatorKind::FileSize,
        ValidatorKind::JsonSchema,
        ValidatorKind::Checksum,
        ValidatorKind::VideoCodec,
        ValidatorKind::Resolution,
    ];

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "file_exists" => ValidatorKind::FileExists,
            "file_format" => ValidatorKind::FileFormat,
            "file_size" => ValidatorKind::FileSize,
            "json_schema" => ValidatorKind::JsonSchema,
            "checksum" => ValidatorKind::Checksum,
            "video_codec" => ValidatorKind::VideoCodec,
            "resolution" => ValidatorKind::Resolution,
            other => ValidatorKind::Unknown(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            ValidatorKind::FileExists => "file_exists",
            ValidatorKind::FileFormat => "file_format",
            ValidatorKind::FileSize => "file_size",
            ValidatorKind::JsonSchema => "json_schema",
            ValidatorKind::Checksum => "checksum",
            ValidatorKind::VideoCodec => "video_codec",
            ValidatorKind::Resolution => "resolution",
            ValidatorKind::Unknown(tag) => tag,
        }
    }

    /// Name used for results produced outside a suite.
    pub fn default_name(&self) -> &'static str {
        match self {
            ValidatorKind::FileExists => file::FILE_EXISTS,
            ValidatorKind::FileFormat => file::FILE_FORMAT,
            ValidatorKind::FileSize => file::FILE_SIZE,
            ValidatorKind::JsonSchema => schema::JSON_SCHEMA,
            ValidatorKind::Checksum => checksum::CHECKSUM,
            ValidatorKind::VideoCodec => media::VIDEO_CODEC,
            ValidatorKind::Resolution => media::RESOLUTION,
            ValidatorKind::Unknown(_) => "Unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ValidatorKind::Unknown(_))
    }

    /// Decode `params` for this kind and run the validator.
    ///
    /// Param decoding failures and panics inside the validator come back as
    /// `Error` results.
    pub fn evaluate(&self, params: &Map<String, Value>, probe: &dyn Probe) -> TestResult {
        let started = Instant::now();
        match panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(params, probe))) {
            Ok(result) => result,
            Err(payload) => TestResult::error(
                self.default_name(),
                started,
                format!("{} validator panicked: {}", self.tag(), panic_message(&*payload)),
            ),
        }
    }

    fn dispatch(&self, params: &Map<String, Value>, probe: &dyn Probe) -> TestResult {
        let started = Instant::now();
        let outcome = match self {
            ValidatorKind::FileExists => {
                self.decode::<PathParams>(params).map(|p| file_exists(&p))
            }
            ValidatorKind::FileFormat => {
                self.decode::<FileFormatParams>(params).map(|p| file_format(&p))
            }
            ValidatorKind::FileSize => {
                self.decode::<FileSizeParams>(params).map(|p| file_size(&p))
            }
            ValidatorKind::JsonSchema => {
                self.decode::<JsonSchemaParams>(params).map(|p| json_schema(&p))
            }
            ValidatorKind::Checksum => {
                self.decode::<ChecksumParams>(params).map(|p| checksum(&p))
            }
            ValidatorKind::VideoCodec => {
                self.decode::<VideoCodecParams>(params).map(|p| video_codec(&p, probe))
            }
            ValidatorKind::Resolution => {
                self.decode::<ResolutionParams>(params).map(|p| resolution(&p, probe))
            }
            ValidatorKind::Unknown(tag) => {
                let shown = if tag.is_empty() { "(none)" } else { tag.as_str() };
                return TestResult::new(
                    self.default_name(),
                    Status::Error,
                    0.0,
                    format!("Unknown test type: {shown}"),
                )
                .with_details(json!({ "type": tag }));
            }
        };

        outcome.unwrap_or_else(|reason| {
            TestResult::error(self.default_name(), started, reason)
                .with_details(json!({ "type": self.tag() }))
        })
    }

    fn decode<T: DeserializeOwned>(&self, params: &Map<String, Value>) -> Result<T, String> {
        serde_json::from_value(Value::Object(params.clone()))
            .map_err(|e| format!("Invalid params for {}: {}", self.tag(), e))
    }
}

impl From<&str> for ValidatorKind {
    fn from(tag: &str) -> Self {
        ValidatorKind::from_tag(tag)
    }
}

impl std::fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{MediaInfo, ProbeError};
    use std::path::Path;

    struct NoProbe;

    impl Probe for NoProbe {
        fn probe(&self, _path: &Path) -> Result<MediaInfo, ProbeError> {
            Err(ProbeError::Unavailable {
                tool: "ffprobe".to_string(),
            })
        }
    }

    struct PanickingProbe;

    impl Probe for PanickingProbe {
        fn probe(&self, _path: &Path) -> Result<MediaInfo, ProbeError> {
            panic!("probe exploded")
        }
    }

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_tags_round_trip() {
        for kind in ValidatorKind::KNOWN.iter() {
            assert_eq!(&ValidatorKind::from_tag(kind.tag()), kind);
            assert!(kind.is_known());
        }
        let unknown = ValidatorKind::from("nonexistent");
        assert_eq!(unknown, ValidatorKind::Unknown("nonexistent".to_string()));
        assert_eq!(unknown.tag(), "nonexistent");
    }

    #[test]
    fn test_unknown_kind_is_error_with_zero_duration() {
        let result = ValidatorKind::from_tag("nonexistent").evaluate(&Map::new(), &NoProbe);
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.duration, 0.0);
        assert!(result.message.contains("nonexistent"));
    }

    #[test]
    fn test_missing_param_is_error() {
        let result = ValidatorKind::FileSize.evaluate(&params(json!({"min_bytes": 1})), &NoProbe);
        assert_eq!(result.status, Status::Error);
        assert!(result.message.contains("file_size"));
        assert!(result.message.contains("path"));
    }

    #[test]
    fn test_ill_typed_param_is_error() {
        let result = ValidatorKind::FileSize
            .evaluate(&params(json!({"path": "/tmp", "min_bytes": "ten"})), &NoProbe);
        assert_eq!(result.status, Status::Error);
    }

    #[test]
    fn test_misspelled_param_is_error() {
        let result = ValidatorKind::FileExists
            .evaluate(&params(json!({"path": "/tmp", "pth": "/tmp"})), &NoProbe);
        assert_eq!(result.status, Status::Error);
        assert!(result.message.contains("pth"));
    }

    #[test]
    fn test_panicking_validator_is_contained() {
        let result = ValidatorKind::VideoCodec
            .evaluate(&params(json!({"path": "clip.mp4"})), &PanickingProbe);
        assert_eq!(result.status, Status::Error);
        assert!(result.message.contains("probe exploded"));
    }

    #[test]
    fn test_dispatch_reaches_validator() {
        let dir = tempfile::tempdir().unwrap();
        let result = ValidatorKind::FileExists.evaluate(
            &params(json!({"path": dir.path().to_string_lossy()})),
            &NoProbe,
        );
        assert_eq!(result.status, Status::Passed);
        assert_eq!(result.name, "File Exists Check");
    }
}
