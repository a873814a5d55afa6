use rand::seq::SliceRandom;
use rand::Rng;

use super::chunker::Chunk;

pub const MCQ_OPTION_COUNT: usize = 4;

// The positional pick takes the 4th token and needs more than 5 in the chunk
const POSITIONAL_INDEX: usize = 3;
const MIN_CHUNK_TOKENS: usize = 6;

fn clean_token(token: &str) -> Option<String> {
    let cleaned = token.trim_matches(|c: char| !c.is_alphanumeric());
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Picks the answer token at a fixed position in the chunk. Chunks with too
/// few tokens, or no usable token from that position on, yield no candidate.
pub fn positional_answer(chunk: &Chunk) -> Option<String> {
    let text = chunk.text();
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < MIN_CHUNK_TOKENS {
        return None;
    }
    tokens[POSITIONAL_INDEX..]
        .iter()
        .find_map(|token| clean_token(token))
}

/// Distinct (case-sensitive) words of the corpus in first-seen order,
/// stripped of surrounding punctuation.
pub fn word_pool(text: &str) -> Vec<String> {
    let mut pool: Vec<String> = Vec::new();
    for token in text.split_whitespace() {
        if let Some(word) = clean_token(token) {
            if !pool.contains(&word) {
                pool.push(word);
            }
        }
    }
    pool
}

/// Uniform draw from the word pool.
pub fn random_word<R: Rng>(pool: &[String], rng: &mut R) -> Option<String> {
    pool.choose(rng).cloned()
}

/// Draws unique distractors from the pool until exactly four options exist,
/// shuffles them, and returns `None` when the pool is too small for an MCQ.
pub fn build_options<R: Rng>(answer: &str, pool: &[String], rng: &mut R) -> Option<Vec<String>> {
    let mut distractors: Vec<&String> = pool.iter().filter(|word| word.as_str() != answer).collect();
    if distractors.len() < MCQ_OPTION_COUNT - 1 {
        return None;
    }
    distractors.shuffle(rng);

    let mut options: Vec<String> = distractors[..MCQ_OPTION_COUNT - 1]
        .iter()
        .map(|word| (*word).clone())
        .collect();
    options.push(answer.to_string());
    options.shuffle(rng);
    Some(options)
}
