use std::future::Future;

use rand::Rng;
use thiserror::Error;

use super::chunker::Chunk;
use super::cloze;
use super::select;
use super::{QuestionRecord, TfAnswer};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("question model backend: {0}")]
    Backend(String),
}

/// External question-generation collaborator: `(answer, context) -> question`.
/// Any error from it costs one question, never the batch.
pub trait QuestionModel {
    fn generate(
        &self,
        answer: &str,
        context: &str,
    ) -> impl Future<Output = Result<String, ModelError>> + Send;
}

/// Model-free question text: the context up to its first sentence-ending
/// period, with a question mark appended.
pub struct NaiveModel;

impl NaiveModel {
    pub fn question_for(context: &str) -> String {
        let head = context.split('.').next().unwrap_or(context).trim();
        format!("{head}?")
    }
}

impl QuestionModel for NaiveModel {
    fn generate(
        &self,
        _answer: &str,
        context: &str,
    ) -> impl Future<Output = Result<String, ModelError>> + Send {
        let question = Self::question_for(context);
        async move { Ok(question) }
    }
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    Mcq,
    TrueFalse,
    Cloze,
}

const KIND_ROTATION: [Kind; 3] = [Kind::Mcq, Kind::TrueFalse, Kind::Cloze];

/// Builds up to `requested` questions, rotating through the three kinds on
/// each chunk in order. Thin material or a failing model only shortens the
/// quiz; the chunk list is finite, so generation always terminates.
pub async fn synthesize_quiz<M, R>(
    chunks: &[Chunk],
    requested: usize,
    model: &M,
    rng: &mut R,
) -> Vec<QuestionRecord>
where
    M: QuestionModel,
    R: Rng,
{
    let corpus = chunks
        .iter()
        .map(|chunk| chunk.text())
        .collect::<Vec<_>>()
        .join(" ");
    let pool = select::word_pool(&corpus);

    let mut quiz = Vec::new();
    'chunks: for chunk in chunks {
        for kind in KIND_ROTATION {
            if quiz.len() >= requested {
                break 'chunks;
            }
            match synthesize_one(kind, chunk, &pool, model, rng).await {
                Ok(Some(question)) => quiz.push(question),
                Ok(None) => log::debug!("not enough material for a {kind:?} question, skipping"),
                Err(err) => log::warn!("question generation failed, skipping one: {err}"),
            }
        }
    }
    quiz
}

async fn synthesize_one<M, R>(
    kind: Kind,
    chunk: &Chunk,
    pool: &[String],
    model: &M,
    rng: &mut R,
) -> Result<Option<QuestionRecord>, ModelError>
where
    M: QuestionModel,
    R: Rng,
{
    match kind {
        Kind::Mcq => {
            let answer = match select::positional_answer(chunk) {
                Some(answer) => answer,
                None => return Ok(None),
            };
            let options = match select::build_options(&answer, pool, rng) {
                Some(options) => options,
                None => return Ok(None),
            };
            let question = model.generate(&answer, &chunk.text()).await?;
            Ok(Some(QuestionRecord::Mcq {
                question,
                options,
                answer,
            }))
        }
        Kind::TrueFalse => {
            let word = match select::random_word(pool, rng) {
                Some(word) => word,
                None => return Ok(None),
            };
            let excerpt = match chunk.sentences.first() {
                Some(sentence) => sentence.clone(),
                None => return Ok(None),
            };
            // The label is computed against the chunk, not guessed
            let holds = contains_word(&chunk.text(), &word);
            let statement =
                format!("The passage starting \"{excerpt}\" contains the word \"{word}\".");
            Ok(Some(QuestionRecord::TrueFalse {
                statement,
                answer: TfAnswer::from_bool(holds),
            }))
        }
        Kind::Cloze => {
            let answer = match select::positional_answer(chunk) {
                Some(answer) => answer,
                None => return Ok(None),
            };
            let sentence = match chunk.sentences.first() {
                Some(sentence) => sentence.clone(),
                None => return Ok(None),
            };
            let mut question = cloze::mask_answer(&sentence, &answer);
            if question == sentence {
                // Answer token sits outside the first sentence
                let full = chunk.text();
                question = cloze::mask_answer(&full, &answer);
                if question == full {
                    log::debug!("cloze mask found no occurrence of {answer:?}");
                    return Ok(None);
                }
            }
            Ok(Some(QuestionRecord::Cloze { question, answer }))
        }
    }
}

fn contains_word(text: &str, word: &str) -> bool {
    let needle = word.to_lowercase();
    text.split_whitespace().any(|token| {
        token
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase()
            == needle
    })
}
