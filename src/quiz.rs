use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The aggregate root stored in the quiz collection. Everything a quiz
/// carries, including its questions, lives in this one document; saving is
/// always a whole-document replace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub shuffle_answers: bool,
    #[serde(default)]
    pub time_limit: TimeLimit,
    #[serde(default = "Utc::now")]
    pub available_date: DateTime<Utc>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub until_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

fn default_title() -> String {
    "Untitled Quiz".to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeLimit {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_minutes")]
    pub minutes: i32,
}

fn default_minutes() -> i32 {
    20
}

impl Default for TimeLimit {
    fn default() -> Self {
        Self {
            enabled: false,
            minutes: default_minutes(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    #[default]
    MultipleChoice,
    TrueFalse,
    FillBlank,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::MultipleChoice => write!(f, "Multiple Choice"),
            QuestionKind::TrueFalse => write!(f, "True/False"),
            QuestionKind::FillBlank => write!(f, "Fill in the Blank"),
        }
    }
}

/// An embedded question. Questions have no identity of their own; they are
/// addressed by position inside the parent quiz.
///
/// The payload fields for all three kinds coexist on the record. A kind
/// switch never clears the inactive payloads, so an author can flip a
/// question back and forth without losing work. Only the payload matching
/// `kind` is presented for editing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default, rename = "type")]
    pub kind: QuestionKind,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "question")]
    pub prompt: String,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub options: Vec<AnswerOption>,
    #[serde(default)]
    pub correct_answer: Option<bool>,
    #[serde(default)]
    pub blanks: Vec<Blank>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blank {
    #[serde(default)]
    pub possible_answers: Vec<String>,
}

impl Quiz {
    /// A brand-new quiz is immediately valid and displayable: defaulted
    /// title, zero points, unpublished, empty question list, available
    /// from the moment of creation.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: default_title(),
            description: String::new(),
            points: 0,
            published: false,
            shuffle_answers: false,
            time_limit: TimeLimit::default(),
            available_date: Utc::now(),
            due_date: None,
            until_date: None,
            questions: Vec::new(),
        }
    }
}

impl Default for Quiz {
    fn default() -> Self {
        Self::new()
    }
}

impl Question {
    /// A fresh question as the editor opens it: multiple-choice, two empty
    /// non-correct options, and one inert empty blank that only matters if
    /// the kind is later switched to fill-blank.
    pub fn new() -> Self {
        Self {
            kind: QuestionKind::MultipleChoice,
            title: String::new(),
            prompt: String::new(),
            points: 0,
            options: vec![AnswerOption::default(), AnswerOption::default()],
            correct_answer: None,
            blanks: vec![Blank::default()],
        }
    }
}

impl Default for Question {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Quiz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<b>{}</b>", self.title)?;
        if !self.description.is_empty() {
            writeln!(f, "<i>{}</i>", self.description)?;
        }
        writeln!(f, "Points: {}", self.points)?;
        writeln!(
            f,
            "Status: {}",
            if self.published {
                "published"
            } else {
                "unpublished"
            }
        )?;
        if self.time_limit.enabled {
            writeln!(f, "Time limit: {} minutes", self.time_limit.minutes)?;
        }
        writeln!(f, "Available from: {}", self.available_date.format("%Y-%m-%d"))?;
        if let Some(due) = self.due_date {
            writeln!(f, "Due: {}", due.format("%Y-%m-%d"))?;
        }
        if let Some(until) = self.until_date {
            writeln!(f, "Until: {}", until.format("%Y-%m-%d"))?;
        }
        write!(f, "Questions: {}", self.questions.len())
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "<b>{}</b> ({}, {} pts)",
            if self.title.is_empty() {
                "Untitled"
            } else {
                self.title.as_str()
            },
            self.kind,
            self.points
        )?;
        if !self.prompt.is_empty() {
            writeln!(f, "{}", self.prompt)?;
        }
        match self.kind {
            QuestionKind::MultipleChoice => {
                for (i, option) in self.options.iter().enumerate() {
                    writeln!(
                        f,
                        "{}) {} {}",
                        i + 1,
                        option.text,
                        if option.is_correct { "✅" } else { "" }
                    )?;
                }
            }
            QuestionKind::TrueFalse => {
                writeln!(
                    f,
                    "Correct answer: {}",
                    match self.correct_answer {
                        Some(true) => "True",
                        Some(false) => "False",
                        None => "not set",
                    }
                )?;
            }
            QuestionKind::FillBlank => {
                for (i, blank) in self.blanks.iter().enumerate() {
                    writeln!(
                        f,
                        "Blank {}: {}",
                        i + 1,
                        blank.possible_answers.join(", ")
                    )?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_quiz_has_defaults() {
        let quiz = Quiz::new();
        assert_eq!(quiz.title, "Untitled Quiz");
        assert_eq!(quiz.points, 0);
        assert!(!quiz.published);
        assert!(!quiz.shuffle_answers);
        assert!(!quiz.time_limit.enabled);
        assert_eq!(quiz.time_limit.minutes, 20);
        assert!(quiz.due_date.is_none());
        assert!(quiz.until_date.is_none());
        assert!(quiz.questions.is_empty());
    }

    #[test]
    fn fresh_question_is_multiple_choice_with_two_empty_options() {
        let question = Question::new();
        assert_eq!(question.kind, QuestionKind::MultipleChoice);
        assert_eq!(question.options.len(), 2);
        for option in &question.options {
            assert_eq!(option.text, "");
            assert!(!option.is_correct);
        }
        assert!(question.correct_answer.is_none());
        assert_eq!(question.blanks.len(), 1);
        assert!(question.blanks[0].possible_answers.is_empty());
    }

    #[test]
    fn sparse_document_hydrates_to_defaults() {
        let quiz: Quiz = serde_json::from_str(r#"{"title": "Midterm"}"#).unwrap();
        assert_eq!(quiz.title, "Midterm");
        assert_eq!(quiz.points, 0);
        assert!(!quiz.published);
        assert_eq!(quiz.time_limit.minutes, 20);
        assert!(quiz.questions.is_empty());
    }

    #[test]
    fn untyped_question_hydrates_as_multiple_choice() {
        let question: Question = serde_json::from_str(r#"{"title": "untyped"}"#).unwrap();
        assert_eq!(question.kind, QuestionKind::MultipleChoice);

        let quiz: Quiz =
            serde_json::from_str(r#"{"title": "Midterm", "questions": [{"title": "untyped"}]}"#)
                .unwrap();
        assert_eq!(quiz.questions[0].kind, QuestionKind::MultipleChoice);
    }

    #[test]
    fn question_kind_uses_wire_names() {
        let json = serde_json::to_string(&QuestionKind::FillBlank).unwrap();
        assert_eq!(json, r#""fill-blank""#);
        let kind: QuestionKind = serde_json::from_str(r#""true-false""#).unwrap();
        assert_eq!(kind, QuestionKind::TrueFalse);
    }

    #[test]
    fn question_document_round_trips() {
        let mut question = Question::new();
        question.title = "Capitals".into();
        question.prompt = "Capital of France?".into();
        question.options[0] = AnswerOption {
            text: "Paris".into(),
            is_correct: true,
        };
        question.options[1] = AnswerOption {
            text: "London".into(),
            is_correct: false,
        };

        let json = serde_json::to_value(&question).unwrap();
        assert_eq!(json["type"], "multiple-choice");
        assert_eq!(json["question"], "Capital of France?");

        let back: Question = serde_json::from_value(json).unwrap();
        assert_eq!(back.options, question.options);
    }
}
