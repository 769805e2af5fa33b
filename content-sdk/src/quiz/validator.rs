//! Turns free-form model output into a [`Quiz`]

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{default_fallback_quiz, Quiz, QuizQuestion, QuizRejection};
use crate::util::truncate_string;

/// Filler options used when padding short option lists, in order of use
pub const OPTION_PLACEHOLDER: [&str; 4] = [
    "None of the above",
    "All of the above",
    "Not mentioned in the episode",
    "Not sure",
];

/// Markdown code fence, optionally tagged `json`
static FENCED_BLOCK: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)```(?:json)?[ \t]*\r?\n?([\s\S]*?)```").ok());

/// Locate the JSON array in model output.
///
/// A fenced code block whose content is an array wins; otherwise the first
/// balanced `[...]` in the text is used.
pub fn extract_json_array(text: &str) -> Option<&str> {
    if let Some(fence) = FENCED_BLOCK.as_ref() {
        for captures in fence.captures_iter(text) {
            let Some(body) = captures.get(1) else {
                continue;
            };
            let body = body.as_str().trim();
            if body.starts_with('[') {
                if let Some(array) = balanced_array(body) {
                    return Some(array);
                }
            }
        }
    }

    text.char_indices()
        .filter(|(_, c)| *c == '[')
        .find_map(|(start, _)| balanced_array(&text[start..]))
}

/// The bracketed span starting at the first `[` of `text`, honoring JSON
/// string quoting.
fn balanced_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Index in `correctAnswer`, accepting whole floats such as `1.0`
fn answer_index(value: &Value) -> Option<usize> {
    if let Some(index) = value.as_u64() {
        return usize::try_from(index).ok();
    }

    let index = value.as_f64()?;
    (index >= 0.0 && index.fract() == 0.0).then_some(index as usize)
}

/// Validates model output and substitutes the fallback quiz when it is unusable
#[derive(Debug, Clone)]
pub struct QuizValidator {
    fallback: Arc<Quiz>,
    pad_options_to: Option<usize>,
}

impl Default for QuizValidator {
    fn default() -> Self {
        Self::new(default_fallback_quiz())
    }
}

impl QuizValidator {
    pub fn new(fallback: Quiz) -> Self {
        Self {
            fallback: Arc::new(fallback),
            pad_options_to: None,
        }
    }

    /// Pad option lists shorter than `width` with placeholder options
    pub fn with_option_padding(mut self, width: usize) -> Self {
        self.pad_options_to = Some(width);
        self
    }

    /// The injected fallback quiz
    pub fn fallback(&self) -> Quiz {
        Quiz::clone(&self.fallback)
    }

    /// Parse and coerce `text` into a quiz
    pub fn validate(&self, text: &str) -> Result<Quiz, QuizRejection> {
        let candidate = extract_json_array(text).ok_or(QuizRejection::NoArrayFound)?;

        let value: Value =
            serde_json::from_str(candidate).map_err(|e| QuizRejection::Malformed(e.to_string()))?;

        self.coerce_value(value)
    }

    /// Coerce an already parsed JSON value into a quiz
    pub fn coerce_value(&self, value: Value) -> Result<Quiz, QuizRejection> {
        let items = match value {
            Value::Array(items) => items,
            _ => return Err(QuizRejection::NotAnArray),
        };

        if items.is_empty() {
            return Err(QuizRejection::Empty);
        }

        let total = items.len();
        let questions: Vec<QuizQuestion> = items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|item| self.coerce(item))
            .collect();

        if questions.len() < total {
            debug!(
                dropped = total - questions.len(),
                kept = questions.len(),
                "Dropped invalid quiz questions"
            );
        }

        Quiz::new(questions).map_err(|_| QuizRejection::NoValidQuestions)
    }

    /// Like [`validate`](Self::validate), returning the fallback on rejection
    pub fn resolve(&self, text: &str) -> Quiz {
        match self.validate(text) {
            Ok(quiz) => quiz,
            Err(reason) => {
                warn!(
                    reason = %reason,
                    output_preview = %truncate_string(text, 120),
                    "Quiz output rejected, serving fallback quiz"
                );
                self.fallback()
            }
        }
    }

    fn coerce(&self, item: &Map<String, Value>) -> Option<QuizQuestion> {
        let question = item.get("question")?.as_str()?.trim();
        if question.is_empty() {
            return None;
        }

        // (original position, text) for each kept option
        let (positions, mut options): (Vec<usize>, Vec<String>) = item
            .get("options")?
            .as_array()?
            .iter()
            .enumerate()
            .filter_map(|(position, option)| Some((position, option.as_str()?.trim())))
            .filter(|(_, option)| !option.is_empty())
            .map(|(position, option)| (position, option.to_string()))
            .unzip();

        if options.len() < 2 {
            return None;
        }

        let correct_answer = item
            .get("correctAnswer")
            .and_then(answer_index)
            .and_then(|original| positions.iter().position(|kept| *kept == original))
            .unwrap_or(0);

        if let Some(width) = self.pad_options_to {
            for placeholder in OPTION_PLACEHOLDER {
                if options.len() >= width {
                    break;
                }
                if !options.iter().any(|option| option == placeholder) {
                    options.push(placeholder.to_string());
                }
            }
        }

        QuizQuestion::new(question, options, correct_answer).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn q(question: &str, options: &[&str], answer: usize) -> QuizQuestion {
        QuizQuestion::new(question, options.iter().map(|o| o.to_string()).collect(), answer).unwrap()
    }

    #[test]
    fn test_fenced_json_in_prose() {
        let text = "Sure! Here you go: ```json\n[{\"question\":\"Q1\",\"options\":[\"A\",\"B\"],\"correctAnswer\":1}]\n```";
        let quiz = QuizValidator::default().resolve(text);

        assert_eq!(quiz.questions(), &[q("Q1", &["A", "B"], 1)]);
    }

    #[test]
    fn test_plain_text_yields_fallback() {
        let validator = QuizValidator::default();

        assert_eq!(validator.validate("not json at all"), Err(QuizRejection::NoArrayFound));
        assert_eq!(validator.resolve("not json at all"), default_fallback_quiz());
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let validator = QuizValidator::default();
        let first = serde_json::to_string(&validator.resolve("garbage")).unwrap();
        let second = serde_json::to_string(&validator.resolve("")).unwrap();

        assert_eq!(first, second);
        assert_eq!(validator.fallback().len(), 3);
    }

    #[test]
    fn test_unfenced_array_with_nested_options() {
        let text = r#"Quiz: [{"question": "Why [brackets]?", "options": ["A", "B", "C"], "correctAnswer": 2}] Enjoy!"#;
        let quiz = QuizValidator::default().validate(text).unwrap();

        assert_eq!(quiz.questions(), &[q("Why [brackets]?", &["A", "B", "C"], 2)]);
    }

    #[test]
    fn test_extract_prefers_fenced_block() {
        let text = "see [1] first\n```\n[2, 3]\n```";
        assert_eq!(extract_json_array(text), Some("[2, 3]"));

        assert_eq!(extract_json_array("```json\n{\"a\": 1}\n``` then [4]"), Some("[4]"));
        assert_eq!(extract_json_array("unterminated [1, 2"), None);
    }

    #[test]
    fn test_invalid_entries_are_dropped() {
        let text = json!([
            {"question": "   ", "options": ["A", "B"], "correctAnswer": 0},
            {"question": "One option", "options": ["A"], "correctAnswer": 0},
            {"question": "Not a list", "options": "A,B", "correctAnswer": 0},
            "just a string",
            {"question": " Kept ", "options": ["A", 7, "B", ""], "correctAnswer": 2}
        ])
        .to_string();

        let quiz = QuizValidator::default().validate(&text).unwrap();
        assert_eq!(quiz.questions(), &[q("Kept", &["A", "B"], 1)]);
    }

    #[test]
    fn test_answer_follows_its_option_when_entries_are_dropped() {
        let text = json!([
            {"question": "Capital of France?", "options": ["", "Paris", "Rome", "Berlin"], "correctAnswer": 1},
            {"question": "Two plus two?", "options": [3, "4", "5"], "correctAnswer": 1},
            {"question": "Removed answer", "options": ["A", "B", null], "correctAnswer": 2}
        ])
        .to_string();

        let quiz = QuizValidator::default().validate(&text).unwrap();
        let marked: Vec<&str> = quiz
            .questions()
            .iter()
            .map(|q| q.options()[q.correct_answer()].as_str())
            .collect();

        assert_eq!(marked, ["Paris", "4", "A"]);
        assert_eq!(quiz.questions()[0], q("Capital of France?", &["Paris", "Rome", "Berlin"], 0));
    }

    #[test]
    fn test_coerce_value_accepts_parsed_json() {
        let validator = QuizValidator::default();
        let value = json!([{"question": "Q", "options": ["A", "B"], "correctAnswer": 3}]);

        assert_eq!(validator.coerce_value(value).unwrap().questions(), &[q("Q", &["A", "B"], 0)]);
        assert_eq!(validator.coerce_value(json!({"question": "Q"})), Err(QuizRejection::NotAnArray));
    }

    #[test]
    fn test_correct_answer_coercion() {
        let text = json!([
            {"question": "Out of range", "options": ["A", "B"], "correctAnswer": 9},
            {"question": "Negative", "options": ["A", "B"], "correctAnswer": -1},
            {"question": "Text", "options": ["A", "B"], "correctAnswer": "1"},
            {"question": "Missing", "options": ["A", "B"]},
            {"question": "Float", "options": ["A", "B"], "correctAnswer": 1.0}
        ])
        .to_string();

        let quiz = QuizValidator::default().validate(&text).unwrap();
        let answers: Vec<usize> = quiz.questions().iter().map(|q| q.correct_answer()).collect();
        assert_eq!(answers, vec![0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_structural_rejections() {
        let validator = QuizValidator::default();

        assert_eq!(validator.validate("[]"), Err(QuizRejection::Empty));
        assert!(matches!(validator.validate("[1, 2,]"), Err(QuizRejection::Malformed(_))));
        assert_eq!(
            validator.validate(r#"[{"question": "", "options": []}]"#),
            Err(QuizRejection::NoValidQuestions)
        );
    }

    #[test]
    fn test_option_padding() {
        let validator = QuizValidator::default().with_option_padding(4);
        let text = r#"[{"question": "Q", "options": ["Yes", "None of the above"], "correctAnswer": 1}]"#;

        let quiz = validator.validate(text).unwrap();
        let question = &quiz.questions()[0];
        assert_eq!(
            question.options(),
            &["Yes", "None of the above", "All of the above", "Not mentioned in the episode"]
        );
        assert_eq!(question.correct_answer(), 1);
    }

    #[test]
    fn test_every_input_yields_a_usable_quiz() {
        let validator = QuizValidator::default();
        let inputs = [
            "",
            "[",
            "]",
            "[[[]]]",
            "```json\n[]\n```",
            "[{\"question\": \"Q\"}]",
            "{\"question\": \"Q\", \"options\": [\"A\", \"B\"]}",
            "[{\"question\":\"Q1\",\"options\":[\"A\",\"B\"],\"correctAnswer\":1}]",
        ];

        for input in inputs {
            let quiz = validator.resolve(input);
            assert!(!quiz.is_empty(), "empty quiz for {:?}", input);
            for question in quiz.questions() {
                assert!(!question.question().trim().is_empty());
                assert!(question.options().len() >= 2);
                assert!(question.correct_answer() < question.options().len());
            }
        }
    }

    #[test]
    fn test_injected_fallback_is_used() {
        let custom = Quiz::new(vec![q("Custom?", &["Yes", "No"], 0)]).unwrap();
        let validator = QuizValidator::new(custom.clone());

        assert_eq!(validator.resolve("nope"), custom);
    }
}
