//! Trivia content as the session engine consumes it
//!
//! Persisted content is a loose map of category name to questions, each with a
//! letter-keyed choice map. It is validated once, up front, and normalized into
//! an ordered board: categories by name, questions by ascending points.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{EngineResult, GameError};
use crate::types::{MAX_CHOICES_PER_QUESTION, MIN_CHOICES_PER_QUESTION};

/// A question exactly as it is persisted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredQuestion {
    pub question: String,
    /// Choice letter (A, B, C, ...) mapped to answer text
    pub choices: BTreeMap<String, String>,
    /// Correct choice letter
    pub answer: String,
    pub points: i64,
}

/// Persisted content: category name mapped to its questions
pub type TriviaContent = BTreeMap<String, Vec<StoredQuestion>>;

/// Something wrong with persisted content. Indexes are positions in the
/// persisted question list of the category.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContentProblem {
    #[error("trivia has no categories")]
    NoCategories,

    #[error("a category has a blank name")]
    BlankCategoryName,

    #[error("category '{category}' has no questions")]
    EmptyCategory { category: String },

    #[error("question {index} in '{category}' has no text")]
    BlankQuestion { category: String, index: usize },

    #[error("question {index} in '{category}' has {count} choices")]
    ChoiceCount {
        category: String,
        index: usize,
        count: usize,
    },

    #[error("question {index} in '{category}' has choice labels that are not A, B, C, ...")]
    ChoiceLabels { category: String, index: usize },

    #[error("choice {label} of question {index} in '{category}' is blank")]
    BlankChoice {
        category: String,
        index: usize,
        label: String,
    },

    #[error("question {index} in '{category}' marks '{answer}' correct, which is not a choice")]
    MissingAnswer {
        category: String,
        index: usize,
        answer: String,
    },

    #[error("question {index} in '{category}' is worth {points} points")]
    InvalidPoints {
        category: String,
        index: usize,
        points: i64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Choice {
    pub label: char,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub choices: Vec<Choice>,
    pub correct_label: char,
    pub points: u32,
}

impl Question {
    pub fn is_correct(&self, label: char) -> bool {
        self.correct_label == label.to_ascii_uppercase()
    }

    pub fn choice(&self, label: char) -> Option<&Choice> {
        let label = label.to_ascii_uppercase();
        self.choices.iter().find(|c| c.label == label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub questions: Vec<Question>,
}

/// Validated, read-only content for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    categories: Vec<Category>,
}

/// Letter for the choice at `position` (0 -> 'A')
pub fn label_for(position: usize) -> Option<char> {
    u8::try_from(position)
        .ok()
        .filter(|p| *p < 26)
        .map(|p| (b'A' + p) as char)
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

impl Content {
    /// Validate persisted content and build the board.
    ///
    /// Every problem found is reported; nothing is coerced.
    pub fn from_stored(stored: &TriviaContent) -> EngineResult<Self> {
        let mut problems = Vec::new();
        let mut categories = Vec::with_capacity(stored.len());

        if stored.is_empty() {
            problems.push(ContentProblem::NoCategories);
        }

        for (name, stored_questions) in stored {
            if name.trim().is_empty() {
                problems.push(ContentProblem::BlankCategoryName);
            }
            if stored_questions.is_empty() {
                problems.push(ContentProblem::EmptyCategory {
                    category: name.clone(),
                });
            }

            let mut questions = Vec::with_capacity(stored_questions.len());
            for (index, stored_q) in stored_questions.iter().enumerate() {
                if let Some(q) = validate_question(name, index, stored_q, &mut problems) {
                    questions.push(q);
                }
            }

            // Board order: cheapest first; ties keep authoring order
            questions.sort_by_key(|q| q.points);
            categories.push(Category {
                name: name.clone(),
                questions,
            });
        }

        if !problems.is_empty() {
            return Err(GameError::ContentInvalid(problems));
        }

        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn question(&self, category: &str, index: usize) -> Option<&Question> {
        self.category(category)?.questions.get(index)
    }

    pub fn total_questions(&self) -> usize {
        self.categories.iter().map(|c| c.questions.len()).sum()
    }
}

fn validate_question(
    category: &str,
    index: usize,
    stored: &StoredQuestion,
    problems: &mut Vec<ContentProblem>,
) -> Option<Question> {
    let before = problems.len();

    if stored.question.trim().is_empty() {
        problems.push(ContentProblem::BlankQuestion {
            category: category.to_string(),
            index,
        });
    }

    let count = stored.choices.len();
    if !(MIN_CHOICES_PER_QUESTION..=MAX_CHOICES_PER_QUESTION).contains(&count) {
        problems.push(ContentProblem::ChoiceCount {
            category: category.to_string(),
            index,
            count,
        });
    }

    // BTreeMap iterates labels in order, so sequential labels line up with positions
    let mut choices = Vec::with_capacity(count);
    let mut labels_ok = true;
    for (position, (label, text)) in stored.choices.iter().enumerate() {
        match (single_char(label), label_for(position)) {
            (Some(actual), Some(expected)) if actual == expected => {
                if text.trim().is_empty() {
                    problems.push(ContentProblem::BlankChoice {
                        category: category.to_string(),
                        index,
                        label: label.clone(),
                    });
                }
                choices.push(Choice {
                    label: actual,
                    text: text.clone(),
                });
            }
            _ => labels_ok = false,
        }
    }
    if !labels_ok {
        problems.push(ContentProblem::ChoiceLabels {
            category: category.to_string(),
            index,
        });
    }

    let correct_label =
        single_char(&stored.answer).filter(|_| stored.choices.contains_key(&stored.answer));
    if correct_label.is_none() {
        problems.push(ContentProblem::MissingAnswer {
            category: category.to_string(),
            index,
            answer: stored.answer.clone(),
        });
    }

    let points = u32::try_from(stored.points).ok().filter(|p| *p > 0);
    if points.is_none() {
        problems.push(ContentProblem::InvalidPoints {
            category: category.to_string(),
            index,
            points: stored.points,
        });
    }

    if problems.len() != before {
        return None;
    }

    Some(Question {
        text: stored.question.clone(),
        choices,
        correct_label: correct_label?,
        points: points?,
    })
}
