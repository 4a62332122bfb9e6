use serde::{Deserialize, Serialize};

/// Report from the AI-content detection service, passed through to clients
/// verbatim. Parsing is lenient: every field defaults, so provider-side
/// omissions or additions never fail a request that the service accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub length: i64,
    /// Overall human-likelihood score for the whole input.
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub sentences: Vec<SentenceScore>,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub attack_detected: AttackFlags,
    #[serde(default)]
    pub readability_score: f64,
    #[serde(default)]
    pub credits_used: i64,
    #[serde(default)]
    pub credits_remaining: i64,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceScore {
    #[serde(default)]
    pub length: i64,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub text: String,
}

/// Adversarial-input markers some detection services report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttackFlags {
    #[serde(default)]
    pub zero_width_space: bool,
    #[serde(default)]
    pub homoglyph_attack: bool,
}

/// One input sentence with the candidate rewrites the paraphrase model
/// proposed for it. An empty candidate list means the model had nothing to
/// offer and the sentence should pass through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceParaphrase {
    pub sentence: String,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// A candidate rewrite scored for fluency and adequacy by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    #[serde(default)]
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_detection_report() {
        let raw = r#"{
            "status": 200,
            "length": 52,
            "score": 87.5,
            "sentences": [{"length": 52, "score": 87.5, "text": "This is a sample."}],
            "input": "This is a sample.",
            "attack_detected": {"zero_width_space": false, "homoglyph_attack": true},
            "readability_score": 55.1,
            "credits_used": 1,
            "credits_remaining": 999,
            "version": "3.0",
            "language": "en"
        }"#;
        let report: DetectionReport = serde_json::from_str(raw).unwrap();
        assert_eq!(report.score, 87.5);
        assert_eq!(report.sentences.len(), 1);
        assert!(report.attack_detected.homoglyph_attack);
        assert_eq!(report.credits_remaining, 999);
    }

    #[test]
    fn missing_report_fields_default_instead_of_failing() {
        let report: DetectionReport = serde_json::from_str(r#"{"score": 12.0}"#).unwrap();
        assert_eq!(report.score, 12.0);
        assert!(report.sentences.is_empty());
        assert!(!report.attack_detected.zero_width_space);
        assert_eq!(report.language, "");
    }

    #[test]
    fn parses_paraphrase_entries_without_candidates() {
        let raw = r#"{"sentence": "Left as is.", "candidates": []}"#;
        let entry: SentenceParaphrase = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.sentence, "Left as is.");
        assert!(entry.candidates.is_empty());

        let raw = r#"{"sentence": "Rewrite me."}"#;
        let entry: SentenceParaphrase = serde_json::from_str(raw).unwrap();
        assert!(entry.candidates.is_empty());
    }
}
