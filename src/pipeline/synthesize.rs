//! Offline synthesis: fallback excerpt → [`StudyMaterial`].
//!
//! Used only when the caller explicitly chooses offline mode. The default
//! [`ExcerptSynthesizer`] is rule-based and cheap, and produces the same
//! three parts a backend answer carries:
//!
//! 1. **Summary**: the first paragraph becomes the high-level summary; the
//!    next few paragraphs become sections whose bullets are the paragraph's
//!    sentences or bullet items.
//! 2. **Glossary**: the first distinct words of the summary (stop words
//!    removed), each defined by the first excerpt sentence that mentions it.
//! 3. **Questions**: short-answer prompts cycling through the glossary, with
//!    difficulty graded by the request's [`Purpose`].
//!
//! Callers with a local model can plug in their own [`SummarySynthesizer`].
//!
//! ## Rule Order
//!
//! Line endings are normalised before paragraph splitting so that CRLF files
//! split on the same blank lines as LF files. The glossary is drawn from the
//! finished summary, and the questions from the finished glossary.

use crate::material::{Origin, Question, QuestionKind, Section, StudyMaterial, Summary, Term};
use crate::pipeline::extract::ExtractionResult;
use crate::request::{Purpose, SubmissionRequest};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Characters taken from the excerpt when it has no paragraph breaks.
const HIGH_LEVEL_FALLBACK_CHARS: usize = 600;
/// Upper bound on the high-level summary.
const HIGH_LEVEL_MAX_CHARS: usize = 1200;
/// Paragraphs after the first that become sections.
const MAX_SECTIONS: usize = 3;
const MAX_BULLETS: usize = 4;

const MAX_TERMS: usize = 12;
/// Leading terms marked [`IMPORTANCE_KEY`].
const KEY_TERMS: usize = 4;
const DEFINITION_MAX_CHARS: usize = 160;
/// A summary shorter than this is too thin to mine; the excerpt is used.
const GLOSSARY_SOURCE_MIN_CHARS: usize = 50;
const GLOSSARY_SOURCE_MAX_CHARS: usize = 4000;
const QUESTION_COUNT: usize = 10;

// Wording and importance labels match what the backend itself produces.
const IMPORTANCE_KEY: &str = "매우 중요";
const IMPORTANCE_NORMAL: &str = "중요";
const DEFAULT_DEFINITION: &str = "강의 맥락의 핵심 용어입니다.";
const PLACEHOLDER_TERM: &str = "핵심";
const PLACEHOLDER_DEFINITION: &str = "강의 핵심 개념.";
const QUESTION_STEM_PREFIX: &str = "다음 용어를 설명하시오:";
const DEFAULT_ANSWER: &str = "핵심 정의를 서술하시오.";
const QUESTION_RATIONALE: &str = "강의 요약과 용어 정리에 근거함.";

const STOP_WORDS: &[&str] = &[
    "그리고", "그러나", "또는", "이다", "있는", "하는", "에서", "으로", "the", "and", "for",
    "with", "that", "this",
];

/// Turns a fallback excerpt into study material.
///
/// `request` is the submission the excerpt was extracted from; implementations
/// may use its file name and learning preferences.
pub trait SummarySynthesizer: Send + Sync {
    fn synthesize(&self, excerpt: &ExtractionResult, request: &SubmissionRequest) -> StudyMaterial;
}

/// Rule-based default synthesizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcerptSynthesizer;

impl SummarySynthesizer for ExcerptSynthesizer {
    fn synthesize(&self, excerpt: &ExtractionResult, request: &SubmissionRequest) -> StudyMaterial {
        let mut counts = BTreeMap::new();
        counts.insert("excerptChars".to_string(), excerpt.text.len() as i64);

        let text = normalise_line_endings(&excerpt.text);
        if text.trim().is_empty() {
            counts.insert("summarySections".to_string(), 0);
            return StudyMaterial {
                counts,
                origin: Origin::Offline,
                ..Default::default()
            };
        }

        let summary = summary_from(&text);
        let terms = glossary_from(&text, &summary);
        let questions = questions_from(&terms, request.purpose);

        counts.insert("summarySections".to_string(), summary.sections.len() as i64);
        counts.insert("terms".to_string(), terms.len() as i64);
        counts.insert("questions".to_string(), questions.len() as i64);

        StudyMaterial {
            summary: (!summary.is_empty()).then_some(summary),
            terms,
            questions,
            counts,
            origin: Origin::Offline,
            ..Default::default()
        }
    }
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Summary ──────────────────────────────────────────────────────────────

fn summary_from(text: &str) -> Summary {
    let paragraphs = split_paragraphs(text);

    let high_level = match paragraphs.first() {
        Some(first) => first.to_string(),
        None => take_chars(text.trim(), HIGH_LEVEL_FALLBACK_CHARS),
    };

    let sections = paragraphs
        .iter()
        .skip(1)
        .take(MAX_SECTIONS)
        .enumerate()
        .map(|(i, p)| Section {
            title: format!("Section {}", i + 1),
            bullets: split_bullets(p),
        })
        .collect();

    Summary {
        high_level: take_chars(&high_level, HIGH_LEVEL_MAX_CHARS),
        sections,
    }
}

static RE_PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

fn split_paragraphs(text: &str) -> Vec<&str> {
    RE_PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

// A sentence end keeps its punctuation; a bullet marker is dropped, including
// one that directly follows a sentence end.
static RE_BULLET_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.!?])(?:\s+[-*•])?\s+|(?:^|\s)[-*•]\s+").unwrap());

fn split_bullets(paragraph: &str) -> Vec<String> {
    let mut bullets = Vec::new();
    let mut start = 0;
    for caps in RE_BULLET_BREAK.captures_iter(paragraph) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        let end = caps.get(1).map_or(whole.start, |m| m.end());
        bullets.push(&paragraph[start..end]);
        start = whole.end;
    }
    bullets.push(&paragraph[start..]);

    bullets
        .into_iter()
        .map(collapse_whitespace)
        .filter(|b| !b.is_empty())
        .take(MAX_BULLETS)
        .collect()
}

// ── Glossary ─────────────────────────────────────────────────────────────

static RE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z가-힣]{2,}").unwrap());
static RE_SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());

fn glossary_from(text: &str, summary: &Summary) -> Vec<Term> {
    let mut source = summary.high_level.clone();
    for bullet in summary.sections.iter().flat_map(|s| &s.bullets) {
        source.push(' ');
        source.push_str(bullet);
    }
    if source.chars().count() < GLOSSARY_SOURCE_MIN_CHARS {
        source = take_chars(text, GLOSSARY_SOURCE_MAX_CHARS);
    }
    let source = source.to_lowercase();

    let mut picked: Vec<&str> = Vec::new();
    for token in RE_TOKEN.find_iter(&source).map(|m| m.as_str()) {
        if STOP_WORDS.contains(&token) || picked.contains(&token) {
            continue;
        }
        picked.push(token);
        if picked.len() >= MAX_TERMS {
            break;
        }
    }

    if picked.is_empty() {
        return vec![Term {
            term: PLACEHOLDER_TERM.to_string(),
            definition: Some(PLACEHOLDER_DEFINITION.to_string()),
            importance: Some(IMPORTANCE_NORMAL.to_string()),
        }];
    }

    let sentences = split_sentences(text);
    picked
        .into_iter()
        .enumerate()
        .map(|(i, token)| {
            let definition = sentences
                .iter()
                .find(|s| s.to_lowercase().contains(token))
                .map(|s| take_chars(s, DEFINITION_MAX_CHARS))
                .unwrap_or_else(|| DEFAULT_DEFINITION.to_string());
            let importance = if i < KEY_TERMS {
                IMPORTANCE_KEY
            } else {
                IMPORTANCE_NORMAL
            };
            Term {
                term: token.to_string(),
                definition: Some(definition),
                importance: Some(importance.to_string()),
            }
        })
        .collect()
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in RE_SENTENCE_END.find_iter(text) {
        // The terminator is a single ASCII byte.
        sentences.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
        .collect()
}

// ── Questions ────────────────────────────────────────────────────────────

fn questions_from(terms: &[Term], purpose: Purpose) -> Vec<Question> {
    if terms.is_empty() {
        return Vec::new();
    }
    (0..QUESTION_COUNT)
        .map(|i| {
            let term = &terms[i % terms.len()];
            Question {
                kind: Some(QuestionKind::Short),
                stem: format!("{QUESTION_STEM_PREFIX} {}", term.term),
                choices: None,
                answer: Some(
                    term.definition
                        .clone()
                        .unwrap_or_else(|| DEFAULT_ANSWER.to_string()),
                ),
                rationale: Some(QUESTION_RATIONALE.to_string()),
                difficulty: Some(difficulty(i, purpose).to_string()),
            }
        })
        .collect()
}

/// Exam practice skips the easy warm-up; the last question is always hard.
fn difficulty(index: usize, purpose: Purpose) -> &'static str {
    match (purpose, index) {
        (Purpose::Understanding, 0..=3) => "easy",
        (_, 0..=8) => "medium",
        _ => "hard",
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn take_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
