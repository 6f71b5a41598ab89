//! Response normalisation: any backend payload → [`StudyMaterial`].
//!
//! ## Shapes seen in the wild
//!
//! ```text
//! flat    { meta, summary, terms, glossary, questions, counts }
//! nested  { meta, result: { summary, glossary, questions } }
//! ```
//!
//! In the nested shape only `result` is read: a top-level `meta` next to
//! `result` is dropped, so that a payload and its `result` normalise alike.
//!
//! The shape is decided exactly once, by [`PayloadShape::detect`], and every
//! field is then read from the effective object. Nothing here can fail: a
//! field that is missing or of the wrong JSON type becomes an empty value,
//! because a partial result is still worth showing.
//!
//! ## Precedence
//!
//! `terms` wins over `glossary` whenever `terms` is an array, even an empty
//! one. `glossary` is consulted only when `terms` is absent or not an array.

use crate::material::{DocumentMeta, Question, QuestionKind, Section, StudyMaterial, Summary, Term};
use crate::pipeline::upload::RawPayload;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Which of the known payload layouts a response uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadShape<'a> {
    /// `{ result: { … } }` — the fields live under `result`.
    Nested(&'a Map<String, Value>),
    /// The fields live at the top level.
    Flat(&'a Map<String, Value>),
    /// Not an object at all (`null`, array, scalar).
    Opaque,
}

impl<'a> PayloadShape<'a> {
    fn detect(payload: &'a Value) -> Self {
        let Value::Object(outer) = payload else {
            return PayloadShape::Opaque;
        };
        let mut fields = outer;
        let mut nested = false;
        // Unwrap every `result` level so that a payload and its `result`
        // always normalise to the same material.
        while let Some(Value::Object(inner)) = fields.get("result") {
            fields = inner;
            nested = true;
        }
        if nested {
            PayloadShape::Nested(fields)
        } else {
            PayloadShape::Flat(fields)
        }
    }

    fn fields(self) -> Option<&'a Map<String, Value>> {
        match self {
            PayloadShape::Nested(m) | PayloadShape::Flat(m) => Some(m),
            PayloadShape::Opaque => None,
        }
    }
}

/// Normalise a backend payload.
pub fn normalize(payload: &RawPayload) -> StudyMaterial {
    normalize_value(payload.as_value())
}

/// Normalise a bare JSON value.
pub fn normalize_value(payload: &Value) -> StudyMaterial {
    let shape = PayloadShape::detect(payload);
    let Some(fields) = shape.fields() else {
        debug!("Payload is not an object; normalising to empty material");
        return StudyMaterial::default();
    };
    debug!(
        "Normalising {} payload",
        if matches!(shape, PayloadShape::Nested(_)) { "nested" } else { "flat" }
    );

    let material = StudyMaterial {
        summary: fields.get("summary").and_then(summary_from),
        terms: term_items(fields).iter().filter_map(term_from).collect(),
        questions: array(fields.get("questions"))
            .iter()
            .filter_map(question_from)
            .collect(),
        counts: counts_from(fields.get("counts")),
        meta: fields.get("meta").and_then(meta_from),
        ..Default::default()
    };

    log_count_mismatch(&material);
    material
}

// ── Field readers ────────────────────────────────────────────────────────

/// The raw glossary list, honouring `terms` over `glossary`.
fn term_items(fields: &Map<String, Value>) -> &[Value] {
    match fields.get("terms") {
        Some(Value::Array(items)) => items,
        _ => array(fields.get("glossary")),
    }
}

fn array(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

/// A single displayable value. Arrays, objects and `null` are not.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(scalar_text)
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    match value {
        Some(Value::Array(items)) => Some(items.iter().filter_map(scalar_text).collect()),
        _ => None,
    }
}

fn summary_from(value: &Value) -> Option<Summary> {
    match value {
        Value::Object(map) => Some(Summary {
            high_level: text_field(map, "high_level").unwrap_or_default(),
            sections: array(map.get("sections"))
                .iter()
                .filter_map(section_from)
                .collect(),
        }),
        Value::Null | Value::Array(_) => None,
        // Older backends answered with a plain string.
        other => scalar_text(other).map(|high_level| Summary {
            high_level,
            sections: Vec::new(),
        }),
    }
}

fn section_from(value: &Value) -> Option<Section> {
    match value {
        Value::Object(map) => Some(Section {
            title: text_field(map, "title").unwrap_or_default(),
            bullets: string_list(map.get("bullets")).unwrap_or_default(),
        }),
        Value::String(title) => Some(Section {
            title: title.clone(),
            bullets: Vec::new(),
        }),
        _ => None,
    }
}

fn term_from(value: &Value) -> Option<Term> {
    match value {
        Value::Object(map) => Some(Term {
            term: text_field(map, "term").unwrap_or_default(),
            definition: text_field(map, "definition"),
            importance: text_field(map, "importance"),
        }),
        other => scalar_text(other).map(Term::new),
    }
}

fn question_from(value: &Value) -> Option<Question> {
    match value {
        Value::Object(map) => Some(Question {
            kind: text_field(map, "type")
                .filter(|t| !t.is_empty())
                .map(QuestionKind::from),
            // Older quiz payloads use `question`/`options`.
            stem: text_field(map, "stem")
                .or_else(|| text_field(map, "question"))
                .unwrap_or_default(),
            choices: string_list(map.get("choices")).or_else(|| string_list(map.get("options"))),
            answer: text_field(map, "answer"),
            rationale: text_field(map, "rationale"),
            difficulty: text_field(map, "difficulty"),
        }),
        other => scalar_text(other).map(Question::new),
    }
}

fn counts_from(value: Option<&Value>) -> BTreeMap<String, i64> {
    let Some(Value::Object(map)) = value else {
        return BTreeMap::new();
    };
    map.iter()
        .filter_map(|(k, v)| v.as_i64().map(|n| (k.clone(), n)))
        .collect()
}

fn meta_from(value: &Value) -> Option<DocumentMeta> {
    let Value::Object(map) = value else {
        return None;
    };
    Some(DocumentMeta {
        page_count: map.get("pageCount").and_then(Value::as_u64),
        low_text_pages: array(map.get("lowTextPages"))
            .iter()
            .filter_map(Value::as_u64)
            .collect(),
        tables_total: map.get("tablesTotal").and_then(Value::as_u64),
    })
}

/// Declared `counts` entries that disagree with what the payload carried,
/// as `(key, declared, actual)`.
fn count_mismatches(material: &StudyMaterial) -> Vec<(&'static str, i64, usize)> {
    let sections = material.summary.as_ref().map_or(0, |s| s.sections.len());
    [
        ("terms", material.terms.len()),
        ("questions", material.questions.len()),
        ("summarySections", sections),
    ]
    .into_iter()
    .filter_map(|(key, actual)| {
        let declared = *material.counts.get(key)?;
        (declared != actual as i64).then_some((key, declared, actual))
    })
    .collect()
}

fn log_count_mismatch(material: &StudyMaterial) {
    for (key, declared, actual) in count_mismatches(material) {
        debug!("counts.{key} = {declared} but payload carried {actual}");
    }
}
