//! The per-action submission request and its closed-enum preferences.

use crate::error::StudyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who the generated material is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// No prior knowledge of the subject. (default)
    #[default]
    Novice,
    /// Has the basics; skip the introductions.
    Intermediate,
}

impl Audience {
    /// Wire value sent in the `audience` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Novice => "novice",
            Audience::Intermediate => "intermediate",
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Audience {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "novice" => Ok(Audience::Novice),
            "intermediate" => Ok(Audience::Intermediate),
            other => Err(StudyError::InvalidChoice {
                field: "audience",
                value: other.to_string(),
                expected: "novice, intermediate",
            }),
        }
    }
}

/// What the learner wants the material for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    /// Conceptual understanding. (default)
    #[default]
    Understanding,
    /// Exam preparation: more questions, harder ones.
    Exam,
}

impl Purpose {
    /// Wire value sent in the `purpose` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Understanding => "understanding",
            Purpose::Exam => "exam",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "understanding" => Ok(Purpose::Understanding),
            "exam" => Ok(Purpose::Exam),
            other => Err(StudyError::InvalidChoice {
                field: "purpose",
                value: other.to_string(),
                expected: "understanding, exam",
            }),
        }
    }
}

/// Backend processing pipeline selector, sent as the optional `mode` field.
///
/// The backend treats a missing field as [`ProcessingMode::Auto`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    #[default]
    Auto,
    /// Send the raw file straight to the generative model.
    GeminiOnly,
    /// OCR/layout extraction first, then generation over the extracted text.
    DocaiThenGemini,
}

impl ProcessingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMode::Auto => "auto",
            ProcessingMode::GeminiOnly => "gemini_only",
            ProcessingMode::DocaiThenGemini => "docai_then_gemini",
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessingMode {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ProcessingMode::Auto),
            "gemini_only" => Ok(ProcessingMode::GeminiOnly),
            "docai_then_gemini" => Ok(ProcessingMode::DocaiThenGemini),
            other => Err(StudyError::InvalidChoice {
                field: "mode",
                value: other.to_string(),
                expected: "auto, gemini_only, docai_then_gemini",
            }),
        }
    }
}

/// One user action: a file plus the two learning preferences.
///
/// Built fresh for every submit and dropped after the round trip. An empty
/// `file_bytes` is representable (the "no file chosen" state); the
/// orchestrator treats it as a no-op rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub file_bytes: Vec<u8>,
    pub file_name: String,
    pub audience: Audience,
    pub purpose: Purpose,
}

impl SubmissionRequest {
    pub fn new(
        file_bytes: impl Into<Vec<u8>>,
        file_name: impl Into<String>,
        audience: Audience,
        purpose: Purpose,
    ) -> Self {
        Self {
            file_bytes: file_bytes.into(),
            file_name: file_name.into(),
            audience,
            purpose,
        }
    }

    /// `false` when no file content was chosen.
    pub fn has_file(&self) -> bool {
        !self.file_bytes.is_empty()
    }

    /// MIME type inferred from the file extension.
    pub fn content_type(&self) -> &'static str {
        let ext = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => "application/pdf",
            "ppt" => "application/vnd.ms-powerpoint",
            "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            _ => "application/octet-stream",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values() {
        assert_eq!(Audience::Novice.as_str(), "novice");
        assert_eq!(Audience::Intermediate.to_string(), "intermediate");
        assert_eq!(Purpose::Understanding.as_str(), "understanding");
        assert_eq!(Purpose::Exam.to_string(), "exam");
        assert_eq!(ProcessingMode::DocaiThenGemini.as_str(), "docai_then_gemini");
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(" Novice ".parse::<Audience>().unwrap(), Audience::Novice);
        assert_eq!("EXAM".parse::<Purpose>().unwrap(), Purpose::Exam);
        assert_eq!(
            "gemini_only".parse::<ProcessingMode>().unwrap(),
            ProcessingMode::GeminiOnly
        );
    }

    #[test]
    fn free_text_is_rejected() {
        let err = "expert".parse::<Audience>().unwrap_err();
        assert!(err.to_string().contains("novice, intermediate"));
        assert!("cramming".parse::<Purpose>().is_err());
        assert!("fast".parse::<ProcessingMode>().is_err());
    }

    #[test]
    fn serde_uses_wire_values() {
        let json = serde_json::to_string(&Purpose::Exam).unwrap();
        assert_eq!(json, "\"exam\"");
        let mode: ProcessingMode = serde_json::from_str("\"docai_then_gemini\"").unwrap();
        assert_eq!(mode, ProcessingMode::DocaiThenGemini);
    }

    #[test]
    fn content_type_from_extension() {
        let req = |name: &str| SubmissionRequest::new(vec![1], name, Audience::Novice, Purpose::Exam);
        assert_eq!(req("week1.PDF").content_type(), "application/pdf");
        assert_eq!(req("deck.ppt").content_type(), "application/vnd.ms-powerpoint");
        assert!(req("deck.pptx").content_type().contains("presentationml"));
        assert_eq!(req("notes").content_type(), "application/octet-stream");
    }

    #[test]
    fn empty_request_has_no_file() {
        let req = SubmissionRequest::new(Vec::new(), "", Audience::default(), Purpose::default());
        assert!(!req.has_file());
    }
}
