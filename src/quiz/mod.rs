pub mod ai_helper;
pub mod chunker;
pub mod cloze;
pub mod export;
pub mod select;
pub mod synth;

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TfAnswer {
    True,
    False,
}

impl TfAnswer {
    pub fn from_bool(value: bool) -> Self {
        if value {
            TfAnswer::True
        } else {
            TfAnswer::False
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TfAnswer::True => "True",
            TfAnswer::False => "False",
        }
    }
}

/// One quiz question. The serialized form carries a `type` tag next to the
/// kind-specific fields, which is also the export format.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum QuestionRecord {
    #[serde(rename = "MCQ")]
    Mcq {
        question: String,
        options: Vec<String>,
        answer: String,
    },
    #[serde(rename = "TF")]
    TrueFalse { statement: String, answer: TfAnswer },
    Cloze { question: String, answer: String },
}

impl QuestionRecord {
    /// The string a submission is compared against when scoring.
    pub fn correct_answer(&self) -> &str {
        match self {
            QuestionRecord::Mcq { answer, .. } => answer,
            QuestionRecord::TrueFalse { answer, .. } => answer.as_str(),
            QuestionRecord::Cloze { answer, .. } => answer,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SessionState {
    #[default]
    Empty,
    Generated,
    Answering,
    Scored,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no quiz has been generated yet")]
    NoQuiz,
    #[error("question index {0} is out of range")]
    OutOfRange(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.correct, self.total)
    }
}

/// A single user's quiz: the generated questions, the answers submitted so
/// far (sparse, keyed by question index), and an explicit lifecycle state.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct QuizSession {
    questions: Vec<QuestionRecord>,
    answers: BTreeMap<usize, String>,
    state: SessionState,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a freshly generated quiz, discarding any previous one.
    pub fn begin(&mut self, questions: Vec<QuestionRecord>) {
        self.questions = questions;
        self.answers.clear();
        self.state = SessionState::Generated;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn answer_for(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    /// Stores the user's answer for one question, overwriting any earlier
    /// submission for the same index.
    pub fn submit_answer(
        &mut self,
        index: usize,
        answer: impl Into<String>,
    ) -> Result<(), SessionError> {
        if self.state == SessionState::Empty {
            return Err(SessionError::NoQuiz);
        }
        if index >= self.questions.len() {
            return Err(SessionError::OutOfRange(index));
        }
        self.answers.insert(index, answer.into());
        self.state = SessionState::Answering;
        Ok(())
    }

    /// Scores every question. Unanswered indices count as wrong, and an
    /// empty submission never matches.
    pub fn score(&mut self) -> Result<Score, SessionError> {
        if self.state == SessionState::Empty {
            return Err(SessionError::NoQuiz);
        }
        let correct = self
            .questions
            .iter()
            .enumerate()
            .filter(|(index, question)| {
                self.answers
                    .get(index)
                    .map_or(false, |given| answer_matches(given, question.correct_answer()))
            })
            .count();
        self.state = SessionState::Scored;
        Ok(Score {
            correct,
            total: self.questions.len(),
        })
    }

    /// Clears submitted answers; the questions stay for another round.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.questions.is_empty() {
            return Err(SessionError::NoQuiz);
        }
        self.answers.clear();
        self.state = SessionState::Answering;
        Ok(())
    }

    /// Clears both questions and answers; a fresh generation is required.
    pub fn regenerate(&mut self) {
        self.questions.clear();
        self.answers.clear();
        self.state = SessionState::Empty;
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn answer_matches(given: &str, correct: &str) -> bool {
    let given = normalize(given);
    !given.is_empty() && given == normalize(correct)
}
