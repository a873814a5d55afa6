use std::collections::VecDeque;

/// A bounded run of consecutive sentences used as generation context.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Chunk {
    pub sentences: Vec<String>,
}

impl Chunk {
    pub fn text(&self) -> String {
        self.sentences.join(" ")
    }
}

// Words that end with a period without ending the sentence
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "no", "vs", "etc", "fig", "al", "approx",
    "dept", "est", "inc", "e.g", "i.e", "a.m", "p.m",
];

/// Splits text into sentences, keeping abbreviations ("Dr. Smith"),
/// initials ("J. K.") and decimal points ("3.14") inside one sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        if b != b'.' && b != b'!' && b != b'?' {
            i += 1;
            continue;
        }

        // Absorb terminator runs ("...", "?!") and closing quotes/brackets
        let mut end = i + 1;
        while end < bytes.len() && matches!(bytes[end], b'.' | b'!' | b'?') {
            end += 1;
        }
        while end < bytes.len() && matches!(bytes[end], b'"' | b'\'' | b')' | b']') {
            end += 1;
        }

        let lone_period = b == b'.' && end == i + 1;
        let breaks_here = end >= bytes.len() || bytes[end].is_ascii_whitespace();
        let real_boundary = !lone_period
            || (!is_decimal_point(bytes, i) && !ends_in_abbreviation(&text[start..i]));

        if breaks_here && real_boundary {
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = end;
        }
        i = end;
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

fn is_decimal_point(bytes: &[u8], i: usize) -> bool {
    i > 0 && bytes[i - 1].is_ascii_digit() && i + 1 < bytes.len() && bytes[i + 1].is_ascii_digit()
}

fn ends_in_abbreviation(prefix: &str) -> bool {
    let last = match prefix.split_whitespace().last() {
        Some(word) => word,
        None => return false,
    };
    let word = last.trim_start_matches(|c: char| !c.is_alphanumeric());
    // A single uppercase letter is an initial, as in "J. K. Rowling"
    let mut chars = word.chars();
    if let (Some(first), None) = (chars.next(), chars.next()) {
        if first.is_alphabetic() && first.is_uppercase() {
            return true;
        }
    }
    ABBREVIATIONS.contains(&word.to_lowercase().as_str())
}

/// Groups sentences into runs of at most `max_sentences`, preserving order.
/// Whitespace-only chunks are dropped; empty input yields no chunks.
pub fn chunk_text(text: &str, max_sentences: usize) -> impl Iterator<Item = Chunk> {
    let max = max_sentences.max(1);
    let mut sentences: VecDeque<String> = split_sentences(text).into();

    std::iter::from_fn(move || {
        while !sentences.is_empty() {
            let run: Vec<String> = sentences.drain(..max.min(sentences.len())).collect();
            let chunk = Chunk { sentences: run };
            if !chunk.text().trim().is_empty() {
                return Some(chunk);
            }
        }
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert_eq!(chunk_text("", 4).count(), 0);
        assert_eq!(chunk_text("   \n\t  ", 4).count(), 0);
    }

    #[test]
    fn test_chunks_are_bounded_and_preserve_order() {
        let text = "One fish. Two fish. Red fish. Blue fish. Old fish. New fish. This one has a little star.";
        let sentences = split_sentences(text);
        assert_eq!(sentences.len(), 7);

        let chunks: Vec<Chunk> = chunk_text(text, 3).collect();
        for chunk in &chunks {
            assert!(chunk.sentences.len() <= 3);
        }
        let rebuilt: Vec<String> = chunks.iter().flat_map(|c| c.sentences.clone()).collect();
        assert_eq!(rebuilt, sentences);
    }

    #[test]
    fn test_chunk_joins_with_single_space() {
        let chunks: Vec<Chunk> = chunk_text("First sentence. Second sentence.", 4).collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text(), "First sentence. Second sentence.");
    }

    #[test]
    fn test_abbreviations_do_not_split() {
        let sentences = split_sentences("Dr. Smith arrived at 9 a.m. sharp. He sat down.");
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].starts_with("Dr. Smith"));
    }

    #[test]
    fn test_decimal_points_do_not_split() {
        let sentences = split_sentences("Pi is roughly 3.14 in value. Tau is twice that.");
        assert_eq!(
            sentences,
            vec![
                "Pi is roughly 3.14 in value.".to_string(),
                "Tau is twice that.".to_string(),
            ]
        );
    }

    #[test]
    fn test_initials_do_not_split() {
        let sentences = split_sentences("J. K. Rowling wrote it. Everyone read it.");
        assert_eq!(sentences.len(), 2);
    }

    #[test]
    fn test_question_and_exclamation_marks() {
        let sentences = split_sentences("Really?! I had no idea... Tell me more.");
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0], "Really?!");
    }

    #[test]
    fn test_text_without_terminator_is_one_sentence() {
        let sentences = split_sentences("no punctuation here");
        assert_eq!(sentences, vec!["no punctuation here".to_string()]);
    }
}
