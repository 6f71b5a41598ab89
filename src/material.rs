//! Canonical, shape-independent study material.
//!
//! Whatever shape the backend answered in, consumers only ever see a
//! [`StudyMaterial`]. `terms` and `questions` are plain `Vec`s so there is
//! nothing to null-check; everything else that can legitimately be missing is
//! an `Option`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which path produced a [`StudyMaterial`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Normalised from a backend payload. (default)
    #[default]
    Backend,
    /// Synthesised locally from a fallback text excerpt.
    Offline,
}

/// The normalised result of one submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyMaterial {
    pub summary: Option<Summary>,
    pub terms: Vec<Term>,
    pub questions: Vec<Question>,
    /// Diagnostic per-category counts as reported by the producer. Never
    /// used to validate or truncate `terms`/`questions`.
    pub counts: BTreeMap<String, i64>,
    pub meta: Option<DocumentMeta>,
    pub origin: Origin,
}

impl StudyMaterial {
    /// `true` when there is nothing to show at all.
    pub fn is_empty(&self) -> bool {
        self.summary.as_ref().is_none_or(Summary::is_empty)
            && self.terms.is_empty()
            && self.questions.is_empty()
    }
}

/// High-level summary plus optional per-section bullets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub high_level: String,
    pub sections: Vec<Section>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.high_level.trim().is_empty() && self.sections.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub bullets: Vec<String>,
}

/// A glossary entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub term: String,
    pub definition: Option<String>,
    pub importance: Option<String>,
}

impl Term {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Default::default()
        }
    }
}

/// Question type. Open-ended: unknown types are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionKind {
    Multiple,
    Essay,
    Short,
    Other(String),
}

impl QuestionKind {
    pub fn as_str(&self) -> &str {
        match self {
            QuestionKind::Multiple => "multiple",
            QuestionKind::Essay => "essay",
            QuestionKind::Short => "short",
            QuestionKind::Other(s) => s,
        }
    }
}

impl From<&str> for QuestionKind {
    fn from(s: &str) -> Self {
        match s {
            "multiple" => QuestionKind::Multiple,
            "essay" => QuestionKind::Essay,
            "short" => QuestionKind::Short,
            other => QuestionKind::Other(other.to_string()),
        }
    }
}

impl From<String> for QuestionKind {
    fn from(s: String) -> Self {
        QuestionKind::from(s.as_str())
    }
}

impl From<QuestionKind> for String {
    fn from(kind: QuestionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A practice question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "type")]
    pub kind: Option<QuestionKind>,
    pub stem: String,
    pub choices: Option<Vec<String>>,
    pub answer: Option<String>,
    pub rationale: Option<String>,
    pub difficulty: Option<String>,
}

impl Question {
    pub fn new(stem: impl Into<String>) -> Self {
        Self {
            stem: stem.into(),
            ..Default::default()
        }
    }
}

/// Document facts the backend reports alongside the generated material.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub page_count: Option<u64>,
    pub low_text_pages: Vec<u64>,
    pub tables_total: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_material_is_empty() {
        let m = StudyMaterial::default();
        assert!(m.is_empty());
        assert_eq!(m.origin, Origin::Backend);
    }

    #[test]
    fn blank_summary_counts_as_empty() {
        let m = StudyMaterial {
            summary: Some(Summary {
                high_level: "   ".into(),
                sections: vec![],
            }),
            ..Default::default()
        };
        assert!(m.is_empty());
    }

    #[test]
    fn question_kind_round_trips_unknown_types() {
        assert_eq!(QuestionKind::from("essay"), QuestionKind::Essay);
        let k = QuestionKind::from("true_false");
        assert_eq!(k.as_str(), "true_false");
        let json = serde_json::to_string(&k).unwrap();
        assert_eq!(json, "\"true_false\"");
    }

    #[test]
    fn question_serialises_kind_as_type() {
        let q = Question {
            kind: Some(QuestionKind::Short),
            ..Question::new("Define entropy")
        };
        let v = serde_json::to_value(&q).unwrap();
        assert_eq!(v["type"], "short");
        assert_eq!(v["stem"], "Define entropy");
    }
}
