//! Keyword-based mood of an entry.
//!
//! The score of each polarity is the number of distinct vocabulary words that
//! occur at least once in the case-folded text. A word repeated five times
//! still contributes one. Nothing here is persisted.

use crate::config::Language;
use crate::constants::ENTRY_ID_LEN;
use crate::entry::EntryStore;
use crate::errors::{AppError, AppResult};
use serde::Serialize;
use std::fmt;
use std::fs;
use tracing::debug;

const POSITIVE_PT: &[&str] = &[
    "feliz",
    "alegre",
    "amor",
    "animado",
    "ótimo",
    "bom",
    "incrível",
    "fantástico",
    "sucesso",
    "grato",
    "orgulhoso",
];

const NEGATIVE_PT: &[&str] = &[
    "triste",
    "raiva",
    "chateado",
    "ruim",
    "péssimo",
    "ódio",
    "deprimido",
    "terrível",
    "frustrado",
    "medo",
    "ansioso",
];

const POSITIVE_EN: &[&str] = &[
    "happy",
    "joyful",
    "love",
    "excited",
    "great",
    "good",
    "amazing",
    "fantastic",
    "success",
    "grateful",
    "proud",
];

const NEGATIVE_EN: &[&str] = &[
    "sad",
    "angry",
    "upset",
    "bad",
    "awful",
    "hate",
    "depressed",
    "terrible",
    "frustrated",
    "afraid",
    "anxious",
];

/// Ternary sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mood {
    /// More positive than negative keywords.
    Positive,
    /// More negative than positive keywords.
    Negative,
    /// A tie, including no keywords at all.
    Neutral,
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mood::Positive => "Positive",
            Mood::Negative => "Negative",
            Mood::Neutral => "Neutral",
        };
        f.write_str(label)
    }
}

/// The two closed keyword sets of one language.
#[derive(Debug, Clone, Copy)]
pub struct Lexicon {
    positive: &'static [&'static str],
    negative: &'static [&'static str],
}

impl Lexicon {
    /// The vocabulary for `language`.
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Portuguese => Lexicon {
                positive: POSITIVE_PT,
                negative: NEGATIVE_PT,
            },
            Language::English => Lexicon {
                positive: POSITIVE_EN,
                negative: NEGATIVE_EN,
            },
        }
    }

    /// Positive keywords.
    pub fn positive(&self) -> &'static [&'static str] {
        self.positive
    }

    /// Negative keywords.
    pub fn negative(&self) -> &'static [&'static str] {
        self.negative
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::for_language(Language::default())
    }
}

/// Keyword counts and the resulting label for a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextScore {
    /// Distinct positive keywords present.
    pub positive_score: usize,
    /// Distinct negative keywords present.
    pub negative_score: usize,
    /// Label derived from the two scores.
    pub mood: Mood,
}

/// Mood of one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodScore {
    /// Full id of the analyzed entry.
    pub entry_id: String,
    /// Distinct positive keywords present.
    pub positive_score: usize,
    /// Distinct negative keywords present.
    pub negative_score: usize,
    /// Label derived from the two scores.
    pub mood: Mood,
}

/// Scores `text` against `lexicon`.
///
/// ```
/// use offjournal::mood::{score_text, Lexicon, Mood};
///
/// let score = score_text("Hoje estou FELIZ, muito feliz!", &Lexicon::default());
/// assert_eq!(score.positive_score, 1);
/// assert_eq!(score.mood, Mood::Positive);
/// ```
pub fn score_text(text: &str, lexicon: &Lexicon) -> TextScore {
    let folded = text.to_lowercase();
    let count = |words: &[&str]| words.iter().filter(|word| folded.contains(*word)).count();

    let positive_score = count(lexicon.positive);
    let negative_score = count(lexicon.negative);
    let mood = if positive_score > negative_score {
        Mood::Positive
    } else if negative_score > positive_score {
        Mood::Negative
    } else {
        Mood::Neutral
    };

    TextScore {
        positive_score,
        negative_score,
        mood,
    }
}

/// Computes moods of stored entries.
#[derive(Debug, Clone)]
pub struct MoodAnalyzer {
    entries: EntryStore,
    lexicon: Lexicon,
}

impl MoodAnalyzer {
    /// Creates an analyzer reading from `entries`.
    pub fn new(entries: EntryStore, lexicon: Lexicon) -> Self {
        MoodAnalyzer { entries, lexicon }
    }

    /// Scores the entry identified by `id_or_prefix`.
    ///
    /// # Errors
    ///
    /// `AppError::NotFound` or `AppError::Ambiguous` if the id does not
    /// resolve to exactly one entry; `AppError::Io` if it cannot be read.
    pub fn analyze(&self, id_or_prefix: &str) -> AppResult<MoodScore> {
        let path = self.entries.path_of(id_or_prefix)?;
        let entry_id = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.get(..ENTRY_ID_LEN))
            .unwrap_or(id_or_prefix)
            .to_string();
        let content = fs::read_to_string(&path)
            .map_err(|e| AppError::io_context("Failed to read entry", e))?;
        let score = score_text(&content, &self.lexicon);

        debug!(
            "Entry {} scored +{} / -{}",
            entry_id, score.positive_score, score.negative_score
        );
        Ok(MoodScore {
            entry_id,
            positive_score: score.positive_score,
            negative_score: score.negative_score,
            mood: score.mood,
        })
    }
}
