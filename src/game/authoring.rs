//! Editing trivia content before it is published
//!
//! These helpers operate on the persisted shape (`TriviaContent`) and enforce
//! the authoring limits, which are stricter than what the play engine accepts.
//! Question indexes here are positions in the persisted list, not board order.

use serde::{Deserialize, Serialize};

use super::content::{label_for, StoredQuestion, TriviaContent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthoringLimits {
    pub min_points: i64,
    pub max_points: i64,
    pub min_choices: usize,
    pub max_choices: usize,
    pub min_questions_per_category: usize,
    pub max_questions_per_category: usize,
    pub min_categories: usize,
    pub max_categories: usize,
}

impl Default for AuthoringLimits {
    fn default() -> Self {
        Self {
            min_points: 1,
            max_points: 10_000,
            min_choices: 2,
            max_choices: 6,
            min_questions_per_category: 1,
            max_questions_per_category: 10,
            min_categories: 1,
            max_categories: 10,
        }
    }
}

/// A question as typed into the editor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub question: String,
    /// Choice texts in display order; labels are assigned A, B, ...
    pub choices: Vec<String>,
    /// Position in `choices` of the correct one
    pub correct: Option<usize>,
    pub points: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthoringError {
    #[error("Please enter a title.")]
    TitleRequired,

    #[error("Category name is required.")]
    CategoryNameRequired,

    #[error("Category already exists.")]
    CategoryExists,

    #[error("Category \"{0}\" does not exist.")]
    UnknownCategory(String),

    #[error("Question {} in \"{category}\" does not exist.", .index + 1)]
    UnknownQuestion { category: String, index: usize },

    #[error("Question is required.")]
    QuestionRequired,

    #[error("A question needs between {min} and {max} choices.")]
    ChoiceCount { min: usize, max: usize },

    #[error("All choices must be filled.")]
    ChoicesIncomplete,

    #[error("Please select a correct answer.")]
    CorrectAnswerRequired,

    #[error("Please enter a valid number of points.")]
    InvalidPoints,

    #[error("Trivia must have between {min} and {max} categories.")]
    CategoryCount { min: usize, max: usize },

    #[error("Category \"{category}\" must have between {min} and {max} questions.")]
    QuestionCount {
        category: String,
        min: usize,
        max: usize,
    },
}

/// Add an empty category. Returns the trimmed name it was stored under.
pub fn add_category(
    content: &mut TriviaContent,
    name: &str,
    limits: &AuthoringLimits,
) -> Result<String, AuthoringError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AuthoringError::CategoryNameRequired);
    }
    if content.contains_key(trimmed) {
        return Err(AuthoringError::CategoryExists);
    }
    if content.len() >= limits.max_categories {
        return Err(AuthoringError::CategoryCount {
            min: limits.min_categories,
            max: limits.max_categories,
        });
    }

    content.insert(trimmed.to_string(), Vec::new());
    Ok(trimmed.to_string())
}

/// Validate a draft into the persisted shape
pub fn build_question(
    draft: &QuestionDraft,
    limits: &AuthoringLimits,
) -> Result<StoredQuestion, AuthoringError> {
    let text = draft.question.trim();
    if text.is_empty() {
        return Err(AuthoringError::QuestionRequired);
    }
    if !(limits.min_choices..=limits.max_choices).contains(&draft.choices.len()) {
        return Err(AuthoringError::ChoiceCount {
            min: limits.min_choices,
            max: limits.max_choices,
        });
    }
    if draft.choices.iter().any(|c| c.trim().is_empty()) {
        return Err(AuthoringError::ChoicesIncomplete);
    }
    let correct = draft
        .correct
        .filter(|i| *i < draft.choices.len())
        .and_then(label_for)
        .ok_or(AuthoringError::CorrectAnswerRequired)?;
    let points = draft
        .points
        .filter(|p| (limits.min_points..=limits.max_points).contains(p))
        .ok_or(AuthoringError::InvalidPoints)?;

    let mut choices = std::collections::BTreeMap::new();
    for (position, choice) in draft.choices.iter().enumerate() {
        let label = label_for(position).ok_or(AuthoringError::ChoiceCount {
            min: limits.min_choices,
            max: limits.max_choices,
        })?;
        choices.insert(label.to_string(), choice.clone());
    }

    Ok(StoredQuestion {
        question: text.to_string(),
        choices,
        answer: correct.to_string(),
        points,
    })
}

/// Append a question to a category. Returns its position in the category.
pub fn add_question(
    content: &mut TriviaContent,
    category: &str,
    draft: &QuestionDraft,
    limits: &AuthoringLimits,
) -> Result<usize, AuthoringError> {
    let question = build_question(draft, limits)?;
    let questions = content
        .get_mut(category)
        .ok_or_else(|| AuthoringError::UnknownCategory(category.to_string()))?;
    if questions.len() >= limits.max_questions_per_category {
        return Err(AuthoringError::QuestionCount {
            category: category.to_string(),
            min: limits.min_questions_per_category,
            max: limits.max_questions_per_category,
        });
    }

    questions.push(question);
    Ok(questions.len() - 1)
}

pub fn delete_category(
    content: &mut TriviaContent,
    category: &str,
) -> Result<Vec<StoredQuestion>, AuthoringError> {
    content
        .remove(category)
        .ok_or_else(|| AuthoringError::UnknownCategory(category.to_string()))
}

pub fn delete_question(
    content: &mut TriviaContent,
    category: &str,
    index: usize,
) -> Result<StoredQuestion, AuthoringError> {
    let questions = content
        .get_mut(category)
        .ok_or_else(|| AuthoringError::UnknownCategory(category.to_string()))?;
    if index >= questions.len() {
        return Err(AuthoringError::UnknownQuestion {
            category: category.to_string(),
            index,
        });
    }
    Ok(questions.remove(index))
}

/// Can this content be marked completed and shared?
pub fn check_publishable(
    content: &TriviaContent,
    limits: &AuthoringLimits,
) -> Result<(), AuthoringError> {
    if !(limits.min_categories..=limits.max_categories).contains(&content.len()) {
        return Err(AuthoringError::CategoryCount {
            min: limits.min_categories,
            max: limits.max_categories,
        });
    }

    let question_range = limits.min_questions_per_category..=limits.max_questions_per_category;
    for (category, questions) in content {
        if !question_range.contains(&questions.len()) {
            return Err(AuthoringError::QuestionCount {
                category: category.clone(),
                min: limits.min_questions_per_category,
                max: limits.max_questions_per_category,
            });
        }
    }
    Ok(())
}
