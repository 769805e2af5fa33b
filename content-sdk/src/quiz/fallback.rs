//! Generic comprehension quiz served when model output is unusable

use once_cell::sync::Lazy;

use super::{Quiz, QuizQuestion};

fn question(text: &str, options: [&str; 4]) -> QuizQuestion {
    QuizQuestion {
        question: text.to_string(),
        options: options.iter().map(|option| option.to_string()).collect(),
        correct_answer: 0,
    }
}

/// Immutable fallback quiz
pub static FALLBACK_QUIZ: Lazy<Quiz> = Lazy::new(|| {
    Quiz(vec![
        question(
            "What is the main topic discussed in this podcast?",
            [
                "The primary subject covered in the content",
                "An unrelated business topic",
                "A different entertainment subject",
                "Something about cooking or travel",
            ],
        ),
        question(
            "What key information was presented?",
            [
                "Important insights and main ideas",
                "Unmentioned or irrelevant details",
                "Random unrelated information",
                "Only promotional content",
            ],
        ),
        question(
            "What can listeners learn from this content?",
            [
                "Valuable knowledge and concepts",
                "Nothing of practical use",
                "Only entertainment value",
                "Unrelated information",
            ],
        ),
    ])
});

/// Copy of [`FALLBACK_QUIZ`]
pub fn default_fallback_quiz() -> Quiz {
    FALLBACK_QUIZ.clone()
}
