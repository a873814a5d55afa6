use regex::RegexBuilder;

/// Marker substituted for the masked answer token.
pub const BLANK: &str = "_____";

/// Replaces the first case-insensitive occurrence of `answer` in `sentence`
/// with the blank marker. Only the first occurrence is masked, so later
/// occurrences keep their context. When `answer` does not occur at all the
/// sentence comes back unchanged; callers detect that by comparison.
pub fn mask_answer(sentence: &str, answer: &str) -> String {
    if answer.is_empty() {
        return sentence.to_string();
    }

    // The answer is literal text, never a pattern
    if let Ok(re) = RegexBuilder::new(&regex::escape(answer))
        .case_insensitive(true)
        .build()
    {
        let replaced = re.replace(sentence, BLANK);
        if replaced != sentence {
            return replaced.into_owned();
        }
    }

    sentence.replacen(answer, BLANK, 1)
}
