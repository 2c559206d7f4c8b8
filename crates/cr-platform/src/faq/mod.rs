//! FAQ aggregate: the published FAQ list and a keyword-matching answer
//! lookup. No language model behind it, just containment checks.

pub mod api;

pub use api::{faq_router, FaqState};

use serde_json::Value;

/// Fallback answer when nothing matches.
pub const NO_ANSWER: &str = "Sorry, I do not know the answer to that yet.";

/// Pick an answer for a free-text question.
///
/// Two passes over the FAQ rows: first an entry whose full question appears
/// inside the query, then an entry sharing any word with it. Matching is
/// case-insensitive; first hit wins.
pub fn find_answer(faqs: &[Value], question: &str) -> String {
    let query = question.to_lowercase();

    for faq in faqs {
        let Some(faq_question) = faq.get("question").and_then(Value::as_str) else {
            continue;
        };
        let needle = faq_question.to_lowercase();
        if !needle.is_empty() && query.contains(&needle) {
            if let Some(answer) = faq.get("answer").and_then(Value::as_str) {
                return answer.to_string();
            }
        }
    }

    for faq in faqs {
        let Some(faq_question) = faq.get("question").and_then(Value::as_str) else {
            continue;
        };
        let lowered = faq_question.to_lowercase();
        if lowered.split_whitespace().any(|word| query.contains(word)) {
            if let Some(answer) = faq.get("answer").and_then(Value::as_str) {
                return answer.to_string();
            }
        }
    }

    NO_ANSWER.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn faqs() -> Vec<Value> {
        vec![
            json!({"question": "How do I report a pothole", "answer": "Use the new issue form."}),
            json!({"question": "Opening hours", "answer": "Weekdays 9 to 5."}),
        ]
    }

    #[test]
    fn full_question_containment_wins() {
        let answer = find_answer(&faqs(), "Hi, how do I report a pothole near my house?");
        assert_eq!(answer, "Use the new issue form.");
    }

    #[test]
    fn falls_back_to_shared_words() {
        let answer = find_answer(&faqs(), "what are your hours?");
        assert_eq!(answer, "Weekdays 9 to 5.");
    }

    #[test]
    fn no_match_returns_the_stock_answer() {
        assert_eq!(find_answer(&faqs(), "xyzzy"), NO_ANSWER);
        assert_eq!(find_answer(&[], "anything"), NO_ANSWER);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let answer = find_answer(&faqs(), "HOW DO I REPORT A POTHOLE?");
        assert_eq!(answer, "Use the new issue form.");
    }
}
