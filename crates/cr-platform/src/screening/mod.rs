//! Content Screener
//!
//! Stateless banned-phrase check run over a submission's text before any
//! side effect happens. Deliberately coarse: any substring match rejects,
//! false positives included ("free parking" is rejected). The verdict is
//! evaluated once, pre-persistence; a rejected submission is never written.

/// Fixed banned-phrase list. Containment anywhere in the text rejects.
const BANNED_PHRASES: &[&str] = &["spam", "buy now", "free", "http", "www.", "offensive"];

/// True when the text contains any banned phrase, case-insensitively.
pub fn is_rejected(text: &str) -> bool {
    let lowered = text.to_lowercase();
    BANNED_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_each_banned_phrase() {
        for phrase in BANNED_PHRASES {
            assert!(is_rejected(phrase), "{phrase} should reject");
        }
    }

    #[test]
    fn rejects_case_insensitively_and_anywhere() {
        assert!(is_rejected("Check this out http://x"));
        assert!(is_rejected("BUY NOW while stocks last"));
        assert!(is_rejected("totally OFFENSIVE remark"));
    }

    #[test]
    fn accepts_clean_text() {
        assert!(!is_rejected("Pothole on Main St"));
        assert!(!is_rejected(""));
    }

    #[test]
    fn false_positives_are_intentional() {
        // "free parking" contains "free"; the coarse match is by contract.
        assert!(is_rejected("Broken meter near the free parking lot"));
    }
}
