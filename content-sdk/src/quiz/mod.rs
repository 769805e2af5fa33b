//! Quiz model, validation and fallback
//!
//! A [`Quiz`] can only be built from questions that satisfy its invariants:
//! at least one question, each with non-blank text, two or more options and
//! an answer index inside the options. Deserialization enforces the same
//! rules; saved script rows repair their quiz through [`QuizValidator`]
//! instead.

mod fallback;
mod validator;

pub use fallback::{default_fallback_quiz, FALLBACK_QUIZ};
pub use validator::{extract_json_array, QuizValidator, OPTION_PLACEHOLDER};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why model output could not be turned into a quiz
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizRejection {
    #[error("no JSON array found in model output")]
    NoArrayFound,

    #[error("malformed JSON: {0}")]
    Malformed(String),

    #[error("top-level JSON value is not an array")]
    NotAnArray,

    #[error("quiz contains no questions")]
    Empty,

    #[error("no question survived validation")]
    NoValidQuestions,

    #[error("invalid question: {0}")]
    InvalidQuestion(String),
}

/// One multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecord", into = "QuestionRecord")]
pub struct QuizQuestion {
    question: String,
    options: Vec<String>,
    correct_answer: usize,
}

/// Wire shape of a question, before invariants are checked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: usize,
}

impl QuizQuestion {
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        correct_answer: usize,
    ) -> Result<Self, QuizRejection> {
        let question = question.into().trim().to_string();

        if question.is_empty() {
            return Err(QuizRejection::InvalidQuestion("question text is blank".to_string()));
        }
        if options.len() < 2 {
            return Err(QuizRejection::InvalidQuestion(format!(
                "{:?} has {} option(s)",
                question,
                options.len()
            )));
        }
        if correct_answer >= options.len() {
            return Err(QuizRejection::InvalidQuestion(format!(
                "answer index {} out of range for {:?}",
                correct_answer, question
            )));
        }

        Ok(Self {
            question,
            options,
            correct_answer,
        })
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_answer(&self) -> usize {
        self.correct_answer
    }
}

impl TryFrom<QuestionRecord> for QuizQuestion {
    type Error = QuizRejection;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        QuizQuestion::new(record.question, record.options, record.correct_answer)
    }
}

impl From<QuizQuestion> for QuestionRecord {
    fn from(question: QuizQuestion) -> Self {
        Self {
            question: question.question,
            options: question.options,
            correct_answer: question.correct_answer,
        }
    }
}

/// Non-empty, ordered list of questions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<QuizQuestion>", into = "Vec<QuizQuestion>")]
pub struct Quiz(Vec<QuizQuestion>);

impl Quiz {
    pub fn new(questions: Vec<QuizQuestion>) -> Result<Self, QuizRejection> {
        if questions.is_empty() {
            return Err(QuizRejection::Empty);
        }
        Ok(Self(questions))
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<QuizQuestion>> for Quiz {
    type Error = QuizRejection;

    fn try_from(questions: Vec<QuizQuestion>) -> Result<Self, Self::Error> {
        Quiz::new(questions)
    }
}

impl From<Quiz> for Vec<QuizQuestion> {
    fn from(quiz: Quiz) -> Self {
        quiz.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_question_invariants() {
        assert!(QuizQuestion::new("  ", vec!["a".into(), "b".into()], 0).is_err());
        assert!(QuizQuestion::new("Q", vec!["a".into()], 0).is_err());
        assert!(QuizQuestion::new("Q", vec!["a".into(), "b".into()], 2).is_err());

        let question = QuizQuestion::new(" Q ", vec!["a".into(), "b".into()], 1).unwrap();
        assert_eq!(question.question(), "Q");
        assert_eq!(question.correct_answer(), 1);
    }

    #[test]
    fn test_quiz_serializes_with_camel_case_answer() {
        let quiz = Quiz::new(vec![QuizQuestion::new("Q1", vec!["A".into(), "B".into()], 1).unwrap()]).unwrap();

        assert_eq!(
            serde_json::to_value(&quiz).unwrap(),
            json!([{"question": "Q1", "options": ["A", "B"], "correctAnswer": 1}])
        );
    }

    #[test]
    fn test_deserialization_enforces_invariants() {
        let empty: Result<Quiz, _> = serde_json::from_value(json!([]));
        assert!(empty.is_err());

        let out_of_range: Result<Quiz, _> = serde_json::from_value(json!([
            {"question": "Q", "options": ["A", "B"], "correctAnswer": 5}
        ]));
        assert!(out_of_range.is_err());

        let valid: Quiz = serde_json::from_value(json!([
            {"question": "Q", "options": ["A", "B", "C"], "correctAnswer": 2}
        ]))
        .unwrap();
        assert_eq!(valid.questions()[0].options().len(), 3);
    }
}
