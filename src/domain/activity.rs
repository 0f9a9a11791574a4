/// Activity kinds and their answer rules.
/// Comparison semantics are queried via `ActivityKind::answer_rule()`,
/// not branched on at call sites, so every kind's rule lives here.

use serde::Deserialize;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    MultipleChoice,
    FillInTheBlank,
    Matching,     // No dedicated rule yet, see AnswerRule
    CodeAnalysis, // No dedicated rule yet, see AnswerRule
}

/// How a submitted answer is compared against the expected one.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AnswerRule {
    /// Trim surrounding whitespace on both sides, then compare case-insensitively.
    NormalizedText,
}

impl ActivityKind {
    /// Does this kind present a fixed list of options?
    pub fn takes_options(self) -> bool {
        matches!(self, ActivityKind::MultipleChoice | ActivityKind::Matching)
    }

    /// Comparison rule for this kind.
    ///
    /// Matching and CodeAnalysis have no product-defined rule of their own;
    /// they share the text rule until one is specified.
    pub fn answer_rule(self) -> AnswerRule {
        match self {
            ActivityKind::MultipleChoice => AnswerRule::NormalizedText,
            ActivityKind::FillInTheBlank => AnswerRule::NormalizedText,
            ActivityKind::Matching => AnswerRule::NormalizedText,
            ActivityKind::CodeAnalysis => AnswerRule::NormalizedText,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityKind::MultipleChoice => "Multiple Choice",
            ActivityKind::FillInTheBlank => "Fill in the Blank",
            ActivityKind::Matching => "Matching",
            ActivityKind::CodeAnalysis => "Code Analysis",
        }
    }
}

impl AnswerRule {
    pub fn matches(self, submitted: &str, expected: &str) -> bool {
        match self {
            AnswerRule::NormalizedText => normalize(submitted) == normalize(expected),
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// A single quiz question.
#[derive(Clone, Debug, Deserialize)]
pub struct Activity {
    pub question: String,
    pub kind: ActivityKind,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub hints: Vec<String>,
}

impl Activity {
    /// Is `submitted` the correct answer for this activity?
    pub fn accepts(&self, submitted: &str) -> bool {
        self.kind.answer_rule().matches(submitted, &self.correct_answer)
    }

    /// Option text at `idx`, for kinds that present options.
    pub fn option(&self, idx: usize) -> Option<&str> {
        if !self.kind.takes_options() {
            return None;
        }
        self.options.get(idx).map(String::as_str)
    }
}
