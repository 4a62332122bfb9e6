//! Turns raw paraphrase-model output into presentable prose. All pure
//! string work; the model decides content, this module decides form.

use crate::types::{Candidate, SentenceParaphrase};

/// Picks the highest-scoring candidate. The first candidate wins ties, so
/// model ordering acts as the tiebreaker. `None` when the model proposed
/// nothing for the sentence.
pub fn best_candidate(candidates: &[Candidate]) -> Option<&Candidate> {
    let mut best: Option<&Candidate> = None;
    for candidate in candidates {
        let better = match best {
            Some(current) => candidate.score > current.score,
            None => true,
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

/// Normalizes a winning rewrite: whitespace runs collapse to single spaces,
/// the first character is uppercased, and a period is appended unless the
/// sentence already ends in `.`, `!` or `?`. Empty input stays empty.
pub fn tidy_sentence(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let mut out = match chars.next() {
        Some(first) => {
            let mut s: String = first.to_uppercase().collect();
            s.push_str(chars.as_str());
            s
        }
        None => return String::new(),
    };
    if !out.ends_with(['.', '!', '?']) {
        out.push('.');
    }
    out
}

/// Applies candidate selection and tidying across the whole model output.
/// A sentence the model had no candidates for passes through unchanged.
pub fn rewrite_sentences(paraphrased: &[SentenceParaphrase]) -> Vec<String> {
    paraphrased
        .iter()
        .map(|entry| match best_candidate(&entry.candidates) {
            Some(winner) => tidy_sentence(&winner.text),
            None => entry.sentence.clone(),
        })
        .collect()
}
