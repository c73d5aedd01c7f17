//! Processing request definitions
//!
//! Describes which transformation the server should apply to an uploaded file.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{ProcessingError, Result};

/// Action codes as sent on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ActionCode {
    Compress = 1,
    Resolution = 2,
    AspectRatio = 3,
    AudioExtract = 4,
    ClipToFormat = 5,
}

/// A validated transformation request
///
/// Only the constructors can build one, and each checks its arguments so
/// an invalid variant never reaches the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingParams(Params);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Params {
    Compress,
    Resolution { resolution: String },
    AspectRatio { aspect_ratio: String },
    AudioExtract,
    ClipToFormat {
        start_seconds: u64,
        end_seconds: u64,
        extension: String,
    },
}

impl ProcessingParams {
    pub fn compress() -> Self {
        Self(Params::Compress)
    }

    pub fn resolution(resolution: impl Into<String>) -> Result<Self> {
        Self(Params::Resolution {
            resolution: resolution.into(),
        })
        .validated()
    }

    pub fn aspect_ratio(aspect_ratio: impl Into<String>) -> Result<Self> {
        Self(Params::AspectRatio {
            aspect_ratio: aspect_ratio.into(),
        })
        .validated()
    }

    pub fn audio_extract() -> Self {
        Self(Params::AudioExtract)
    }

    /// Cut `[start_seconds, end_seconds)` and re-encode as `extension`
    pub fn clip_to_format(
        start_seconds: u64,
        end_seconds: u64,
        extension: impl Into<String>,
    ) -> Result<Self> {
        let extension = extension.into().trim_start_matches('.').to_string();
        Self(Params::ClipToFormat {
            start_seconds,
            end_seconds,
            extension,
        })
        .validated()
    }

    /// Get the action code
    pub fn action_code(&self) -> ActionCode {
        match self.0 {
            Params::Compress => ActionCode::Compress,
            Params::Resolution { .. } => ActionCode::Resolution,
            Params::AspectRatio { .. } => ActionCode::AspectRatio,
            Params::AudioExtract => ActionCode::AudioExtract,
            Params::ClipToFormat { .. } => ActionCode::ClipToFormat,
        }
    }

    /// Short label used when deriving output file names
    pub fn label(&self) -> &'static str {
        match self.0 {
            Params::Compress => "compressed",
            Params::Resolution { .. } => "resized",
            Params::AspectRatio { .. } => "reframed",
            Params::AudioExtract => "audio",
            Params::ClipToFormat { .. } => "clip",
        }
    }

    fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        match &self.0 {
            Params::Compress | Params::AudioExtract => Ok(()),
            Params::Resolution { resolution } => required("resolution", resolution),
            Params::AspectRatio { aspect_ratio } => required("aspect ratio", aspect_ratio),
            Params::ClipToFormat {
                start_seconds,
                end_seconds,
                extension,
            } => {
                if start_seconds >= end_seconds {
                    return Err(ProcessingError::InvalidRequest(format!(
                        "clip start ({}s) must be before end ({}s)",
                        start_seconds, end_seconds
                    )));
                }
                required("extension", extension)
            }
        }
    }
}

fn required(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ProcessingError::InvalidRequest(format!("{} is required", name)));
    }
    Ok(())
}

/// JSON shape of the params segment
#[derive(Serialize)]
struct WireParams<'a> {
    action: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    startseconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    endseconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extension: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_file_name: Option<&'a str>,
}

/// A single user-initiated conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingRequest {
    source_path: PathBuf,
    params: ProcessingParams,
    output_file_name: Option<String>,
}

impl ProcessingRequest {
    pub fn new(source_path: impl Into<PathBuf>, params: ProcessingParams) -> Self {
        Self {
            source_path: source_path.into(),
            params,
            output_file_name: None,
        }
    }

    /// Attach an explicit output file name (without extension)
    pub fn with_output_file_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.output_file_name = if name.trim().is_empty() {
            None
        } else {
            Some(name)
        };
        self
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn params(&self) -> &ProcessingParams {
        &self.params
    }

    pub fn output_file_name(&self) -> Option<&str> {
        self.output_file_name.as_deref()
    }

    /// Lower-cased extension of the source file, without the dot
    ///
    /// Empty when the path has no extension.
    pub fn media_type(&self) -> String {
        self.source_path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    /// Serialize the params segment as compact JSON
    ///
    /// Params are re-checked here, so nothing invalid is ever encoded.
    pub fn params_json(&self) -> Result<Vec<u8>> {
        self.params.validate()?;

        let mut wire = WireParams {
            action: self.params.action_code() as u8,
            resolution: None,
            aspect_ratio: None,
            startseconds: None,
            endseconds: None,
            extension: None,
            output_file_name: self.output_file_name.as_deref(),
        };

        match &self.params.0 {
            Params::Compress | Params::AudioExtract => {}
            Params::Resolution { resolution } => wire.resolution = Some(resolution.as_str()),
            Params::AspectRatio { aspect_ratio } => wire.aspect_ratio = Some(aspect_ratio.as_str()),
            Params::ClipToFormat {
                start_seconds,
                end_seconds,
                extension,
            } => {
                wire.startseconds = Some(*start_seconds);
                wire.endseconds = Some(*end_seconds);
                wire.extension = Some(extension.as_str());
            }
        }

        serde_json::to_vec(&wire)
            .map_err(|e| ProcessingError::InvalidRequest(format!("cannot encode params: {}", e)))
    }

    /// Name for the processed file (without extension)
    pub fn result_file_name(&self) -> String {
        if let Some(name) = &self.output_file_name {
            return name.clone();
        }
        let stem = file_stem(&self.source_path);
        format!("{}_{}", stem, self.params.label())
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(request: &ProcessingRequest) -> String {
        String::from_utf8(request.params_json().unwrap()).unwrap()
    }

    #[test]
    fn test_compress_json() {
        let request = ProcessingRequest::new("clip.mp4", ProcessingParams::compress());
        assert_eq!(json(&request), r#"{"action":1}"#);
    }

    #[test]
    fn test_resolution_json() {
        let request =
            ProcessingRequest::new("clip.mp4", ProcessingParams::resolution("720p").unwrap());
        assert_eq!(json(&request), r#"{"action":2,"resolution":"720p"}"#);
    }

    #[test]
    fn test_aspect_ratio_json() {
        let request =
            ProcessingRequest::new("clip.mp4", ProcessingParams::aspect_ratio("16:9").unwrap());
        assert_eq!(json(&request), r#"{"action":3,"aspect_ratio":"16:9"}"#);
    }

    #[test]
    fn test_clip_json_with_output_name() {
        let request = ProcessingRequest::new(
            "clip.mp4",
            ProcessingParams::clip_to_format(3, 9, ".gif").unwrap(),
        )
        .with_output_file_name("highlight");

        assert_eq!(
            json(&request),
            r#"{"action":5,"startseconds":3,"endseconds":9,"extension":"gif","output_file_name":"highlight"}"#
        );
    }

    #[test]
    fn test_clip_requires_start_before_end() {
        assert!(matches!(
            ProcessingParams::clip_to_format(9, 9, "gif"),
            Err(ProcessingError::InvalidRequest(_))
        ));
        assert!(matches!(
            ProcessingParams::clip_to_format(10, 2, "gif"),
            Err(ProcessingError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_empty_fields_rejected() {
        assert!(ProcessingParams::resolution("").is_err());
        assert!(ProcessingParams::aspect_ratio("   ").is_err());
        assert!(ProcessingParams::clip_to_format(0, 1, "").is_err());
        assert!(ProcessingParams::clip_to_format(0, 1, ".").is_err());
    }

    #[test]
    fn test_invalid_params_never_encoded() {
        let params = ProcessingParams(Params::ClipToFormat {
            start_seconds: 9,
            end_seconds: 2,
            extension: String::new(),
        });
        let request = ProcessingRequest::new("clip.mp4", params);
        assert!(matches!(
            request.params_json(),
            Err(ProcessingError::InvalidRequest(_))
        ));

        let params = ProcessingParams(Params::Resolution {
            resolution: " ".to_string(),
        });
        let request = ProcessingRequest::new("clip.mp4", params);
        assert!(request.params_json().is_err());
    }

    #[test]
    fn test_media_type_lowercased() {
        let request = ProcessingRequest::new("/videos/Holiday.MP4", ProcessingParams::compress());
        assert_eq!(request.media_type(), "mp4");

        let request = ProcessingRequest::new("/videos/noext", ProcessingParams::compress());
        assert_eq!(request.media_type(), "");
    }

    #[test]
    fn test_result_file_name() {
        let request = ProcessingRequest::new("/videos/clip.mp4", ProcessingParams::audio_extract());
        assert_eq!(request.result_file_name(), "clip_audio");

        let request = request.with_output_file_name("soundtrack");
        assert_eq!(request.result_file_name(), "soundtrack");
    }
}
