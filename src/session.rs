use crate::error::SessionError;
use crate::quiz::{AnswerOption, Blank, Question, QuestionKind, Quiz};

/// A single author's editing session over one quiz document.
///
/// The session owns a private working copy of the quiz. Question edits go
/// through a second, detached working copy held in `editing`: the question
/// sequence is untouched until [`Session::commit`], and a discarded edit
/// leaves it exactly as it was. Nothing here talks to storage; saving the
/// whole document is the caller's move.
#[derive(Debug, Clone)]
pub struct Session {
    pub quiz: Quiz,
    editing: Option<Editing>,
}

#[derive(Debug, Clone)]
struct Editing {
    /// Position the working question lands at on commit. Equal to the
    /// current sequence length for a new question (append on commit).
    index: usize,
    question: Question,
}

impl Session {
    pub fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            editing: None,
        }
    }

    /// Opens a fresh question for editing, to be appended on commit.
    pub fn start_new(&mut self) -> Result<(), SessionError> {
        if self.editing.is_some() {
            return Err(SessionError::EditInProgress);
        }
        self.editing = Some(Editing {
            index: self.quiz.questions.len(),
            question: Question::new(),
        });
        Ok(())
    }

    /// Opens a detached copy of `questions[index]` for editing in place.
    pub fn start_edit(&mut self, index: usize) -> Result<(), SessionError> {
        if self.editing.is_some() {
            return Err(SessionError::EditInProgress);
        }
        let question = self
            .quiz
            .questions
            .get(index)
            .cloned()
            .ok_or(SessionError::OutOfRange {
                index,
                len: self.quiz.questions.len(),
            })?;
        self.editing = Some(Editing { index, question });
        Ok(())
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn working(&self) -> Option<&Question> {
        self.editing.as_ref().map(|e| &e.question)
    }

    /// True when the working question was opened via [`Session::start_new`]
    /// and will be appended rather than replace an existing entry.
    pub fn editing_new(&self) -> bool {
        self.editing
            .as_ref()
            .map(|e| e.index == self.quiz.questions.len())
            .unwrap_or(false)
    }

    /// Switches the working question's kind, preserving every payload as-is.
    /// The one exception: switching to fill-blank with no blanks present
    /// materializes a single empty blank, so the blank editor never opens
    /// on an empty list.
    pub fn change_kind(&mut self, kind: QuestionKind) -> Result<(), SessionError> {
        let editing = self.editing.as_mut().ok_or(SessionError::NoActiveEdit)?;
        editing.question.kind = kind;
        if kind == QuestionKind::FillBlank && editing.question.blanks.is_empty() {
            editing.question.blanks.push(Blank::default());
        }
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), SessionError> {
        let editing = self.editing.as_mut().ok_or(SessionError::NoActiveEdit)?;
        editing.question.title = title.into();
        Ok(())
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) -> Result<(), SessionError> {
        let editing = self.editing.as_mut().ok_or(SessionError::NoActiveEdit)?;
        editing.question.prompt = prompt.into();
        Ok(())
    }

    pub fn set_points(&mut self, points: i32) -> Result<(), SessionError> {
        let editing = self.editing.as_mut().ok_or(SessionError::NoActiveEdit)?;
        editing.question.points = points.max(0);
        Ok(())
    }

    /// Appends an empty, non-correct option. Ignored unless the working
    /// question is multiple-choice.
    pub fn add_option(&mut self) -> Result<(), SessionError> {
        let editing = self.editing.as_mut().ok_or(SessionError::NoActiveEdit)?;
        if editing.question.kind == QuestionKind::MultipleChoice {
            editing.question.options.push(AnswerOption::default());
        }
        Ok(())
    }

    /// Removes the option at `index`. No minimum count is enforced; an
    /// author can delete every option.
    pub fn remove_option(&mut self, index: usize) -> Result<(), SessionError> {
        let editing = self.editing.as_mut().ok_or(SessionError::NoActiveEdit)?;
        if editing.question.kind != QuestionKind::MultipleChoice {
            return Ok(());
        }
        if index >= editing.question.options.len() {
            return Err(SessionError::OutOfRange {
                index,
                len: editing.question.options.len(),
            });
        }
        editing.question.options.remove(index);
        Ok(())
    }

    pub fn set_option_text(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), SessionError> {
        let editing = self.editing.as_mut().ok_or(SessionError::NoActiveEdit)?;
        if editing.question.kind != QuestionKind::MultipleChoice {
            return Ok(());
        }
        let len = editing.question.options.len();
        let option = editing
            .question
            .options
            .get_mut(index)
            .ok_or(SessionError::OutOfRange { index, len })?;
        option.text = text.into();
        Ok(())
    }

    pub fn set_option_correct(
        &mut self,
        index: usize,
        is_correct: bool,
    ) -> Result<(), SessionError> {
        let editing = self.editing.as_mut().ok_or(SessionError::NoActiveEdit)?;
        if editing.question.kind != QuestionKind::MultipleChoice {
            return Ok(());
        }
        let len = editing.question.options.len();
        let option = editing
            .question
            .options
            .get_mut(index)
            .ok_or(SessionError::OutOfRange { index, len })?;
        option.is_correct = is_correct;
        Ok(())
    }

    /// Sets the true/false answer key. `None` keeps the three-valued
    /// semantics: an unanswered key is distinct from an explicit "false".
    pub fn set_correct_answer(&mut self, answer: Option<bool>) -> Result<(), SessionError> {
        let editing = self.editing.as_mut().ok_or(SessionError::NoActiveEdit)?;
        if editing.question.kind == QuestionKind::TrueFalse {
            editing.question.correct_answer = answer;
        }
        Ok(())
    }

    pub fn add_blank(&mut self) -> Result<(), SessionError> {
        let editing = self.editing.as_mut().ok_or(SessionError::NoActiveEdit)?;
        if editing.question.kind == QuestionKind::FillBlank {
            editing.question.blanks.push(Blank::default());
        }
        Ok(())
    }

    /// Removes the blank at `index`. Zero blanks is a valid transient
    /// state; a later switch back to fill-blank re-materializes one.
    pub fn remove_blank(&mut self, index: usize) -> Result<(), SessionError> {
        let editing = self.editing.as_mut().ok_or(SessionError::NoActiveEdit)?;
        if editing.question.kind != QuestionKind::FillBlank {
            return Ok(());
        }
        if index >= editing.question.blanks.len() {
            return Err(SessionError::OutOfRange {
                index,
                len: editing.question.blanks.len(),
            });
        }
        editing.question.blanks.remove(index);
        Ok(())
    }

    /// Replaces a blank's accepted answers with the lines of `input`.
    pub fn set_blank_answers(&mut self, index: usize, input: &str) -> Result<(), SessionError> {
        let editing = self.editing.as_mut().ok_or(SessionError::NoActiveEdit)?;
        if editing.question.kind != QuestionKind::FillBlank {
            return Ok(());
        }
        let len = editing.question.blanks.len();
        let blank = editing
            .question
            .blanks
            .get_mut(index)
            .ok_or(SessionError::OutOfRange { index, len })?;
        blank.possible_answers = parse_possible_answers(input);
        Ok(())
    }

    /// Folds the working question back into the quiz: replaced in place
    /// when it came from an existing position, appended when it was new.
    /// The session returns to idle either way.
    pub fn commit(&mut self) -> Result<(), SessionError> {
        let editing = self.editing.take().ok_or(SessionError::NoActiveEdit)?;
        if editing.index < self.quiz.questions.len() {
            self.quiz.questions[editing.index] = editing.question;
        } else {
            self.quiz.questions.push(editing.question);
        }
        Ok(())
    }

    /// Drops the working question without touching the sequence.
    pub fn discard(&mut self) {
        self.editing = None;
    }

    /// Removes `questions[index]`, shifting later questions down by one.
    /// Rejected while a question edit is open: deleting would invalidate
    /// the index the working copy commits back to.
    pub fn delete_question(&mut self, index: usize) -> Result<Question, SessionError> {
        if self.editing.is_some() {
            return Err(SessionError::EditInProgress);
        }
        if index >= self.quiz.questions.len() {
            return Err(SessionError::OutOfRange {
                index,
                len: self.quiz.questions.len(),
            });
        }
        Ok(self.quiz.questions.remove(index))
    }
}

/// Splits multi-line answer input into individual accepted answers.
/// Whitespace-only lines are dropped, everything else is kept verbatim in
/// order.
pub fn parse_possible_answers(input: &str) -> Vec<String> {
    input
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz_with_questions(count: usize) -> Quiz {
        let mut quiz = Quiz::new();
        for i in 0..count {
            let mut question = Question::new();
            question.title = format!("Q{}", i + 1);
            quiz.questions.push(question);
        }
        quiz
    }

    #[test]
    fn start_new_opens_fresh_multiple_choice_question() {
        let mut session = Session::new(quiz_with_questions(2));
        session.start_new().unwrap();

        let working = session.working().unwrap();
        assert_eq!(working.kind, QuestionKind::MultipleChoice);
        assert_eq!(working.options.len(), 2);
        assert!(session.editing_new());
        // Nothing committed yet.
        assert_eq!(session.quiz.questions.len(), 2);
    }

    #[test]
    fn start_edit_rejects_out_of_range_index() {
        let mut session = Session::new(quiz_with_questions(2));
        assert_eq!(
            session.start_edit(2),
            Err(SessionError::OutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn second_start_is_rejected_while_editing() {
        let mut session = Session::new(quiz_with_questions(1));
        session.start_edit(0).unwrap();
        assert_eq!(session.start_new(), Err(SessionError::EditInProgress));
        assert_eq!(session.start_edit(0), Err(SessionError::EditInProgress));
    }

    #[test]
    fn edit_operates_on_detached_copy_until_commit() {
        let mut session = Session::new(quiz_with_questions(1));
        session.start_edit(0).unwrap();
        session.set_title("changed").unwrap();

        assert_eq!(session.quiz.questions[0].title, "Q1");
        session.commit().unwrap();
        assert_eq!(session.quiz.questions[0].title, "changed");
        assert!(!session.is_editing());
    }

    #[test]
    fn commit_replaces_in_place_preserving_order() {
        let mut session = Session::new(quiz_with_questions(3));
        session.start_edit(1).unwrap();
        session.set_title("middle").unwrap();
        session.commit().unwrap();

        let titles: Vec<&str> = session
            .quiz
            .questions
            .iter()
            .map(|q| q.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Q1", "middle", "Q3"]);
    }

    #[test]
    fn commit_appends_new_question() {
        let mut session = Session::new(quiz_with_questions(2));
        session.start_new().unwrap();
        session.set_title("new one").unwrap();
        session.commit().unwrap();

        assert_eq!(session.quiz.questions.len(), 3);
        assert_eq!(session.quiz.questions[2].title, "new one");
    }

    #[test]
    fn discard_leaves_sequence_untouched() {
        let mut session = Session::new(quiz_with_questions(1));
        session.start_edit(0).unwrap();
        session.set_title("never saved").unwrap();
        session.discard();

        assert_eq!(session.quiz.questions[0].title, "Q1");
        assert!(!session.is_editing());
    }

    #[test]
    fn switch_to_fill_blank_materializes_one_blank_when_empty() {
        let mut session = Session::new(Quiz::new());
        session.start_new().unwrap();
        // Drain the placeholder blank first.
        session.change_kind(QuestionKind::FillBlank).unwrap();
        session.remove_blank(0).unwrap();
        session.change_kind(QuestionKind::TrueFalse).unwrap();

        session.change_kind(QuestionKind::FillBlank).unwrap();
        let working = session.working().unwrap();
        assert_eq!(working.blanks.len(), 1);
        assert!(working.blanks[0].possible_answers.is_empty());
    }

    #[test]
    fn switch_to_fill_blank_keeps_existing_blanks() {
        let mut session = Session::new(Quiz::new());
        session.start_new().unwrap();
        session.change_kind(QuestionKind::FillBlank).unwrap();
        session.set_blank_answers(0, "cat\ndog").unwrap();
        session.change_kind(QuestionKind::TrueFalse).unwrap();
        session.change_kind(QuestionKind::FillBlank).unwrap();

        let working = session.working().unwrap();
        assert_eq!(working.blanks.len(), 1);
        assert_eq!(working.blanks[0].possible_answers, vec!["cat", "dog"]);
    }

    #[test]
    fn kind_switch_preserves_other_payloads() {
        let mut session = Session::new(Quiz::new());
        session.start_new().unwrap();
        session.set_option_text(0, "Paris").unwrap();
        session.set_option_correct(0, true).unwrap();
        session.change_kind(QuestionKind::TrueFalse).unwrap();
        session.set_correct_answer(Some(false)).unwrap();
        session.change_kind(QuestionKind::MultipleChoice).unwrap();

        let working = session.working().unwrap();
        assert_eq!(working.options[0].text, "Paris");
        assert!(working.options[0].is_correct);
        assert_eq!(working.correct_answer, Some(false));
    }

    #[test]
    fn kind_mismatched_edits_are_silently_dropped() {
        let mut session = Session::new(Quiz::new());
        session.start_new().unwrap();
        session.change_kind(QuestionKind::TrueFalse).unwrap();

        // Option edits against a true-false question go nowhere.
        session.set_option_text(0, "ignored").unwrap();
        session.add_option().unwrap();
        assert_eq!(session.working().unwrap().options[0].text, "");
        assert_eq!(session.working().unwrap().options.len(), 2);

        // And the answer key is untouchable outside true-false.
        session.change_kind(QuestionKind::MultipleChoice).unwrap();
        session.set_correct_answer(Some(true)).unwrap();
        assert_eq!(session.working().unwrap().correct_answer, None);
    }

    #[test]
    fn options_can_be_drained_to_zero() {
        let mut session = Session::new(Quiz::new());
        session.start_new().unwrap();
        session.remove_option(1).unwrap();
        session.remove_option(0).unwrap();
        assert!(session.working().unwrap().options.is_empty());
        assert_eq!(
            session.remove_option(0),
            Err(SessionError::OutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn delete_question_shifts_later_indices_down() {
        let mut session = Session::new(quiz_with_questions(3));
        session.delete_question(1).unwrap();

        let titles: Vec<&str> = session
            .quiz
            .questions
            .iter()
            .map(|q| q.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Q1", "Q3"]);
    }

    #[test]
    fn delete_question_is_rejected_mid_edit() {
        let mut session = Session::new(quiz_with_questions(2));
        session.start_edit(0).unwrap();
        assert_eq!(session.delete_question(1), Err(SessionError::EditInProgress));
        session.discard();
        assert!(session.delete_question(1).is_ok());
    }

    #[test]
    fn field_edits_require_an_active_edit() {
        let mut session = Session::new(quiz_with_questions(1));
        assert_eq!(session.set_title("x"), Err(SessionError::NoActiveEdit));
        assert_eq!(session.commit(), Err(SessionError::NoActiveEdit));
    }

    #[test]
    fn negative_points_clamp_to_zero() {
        let mut session = Session::new(Quiz::new());
        session.start_new().unwrap();
        session.set_points(-5).unwrap();
        assert_eq!(session.working().unwrap().points, 0);
    }

    #[test]
    fn blank_answer_lines_drop_whitespace_only_entries() {
        assert_eq!(parse_possible_answers("cat\n  \ndog\n"), vec!["cat", "dog"]);
        assert_eq!(parse_possible_answers(""), Vec::<String>::new());
        assert_eq!(parse_possible_answers(" \n\t\n"), Vec::<String>::new());
        // Kept lines are not trimmed.
        assert_eq!(parse_possible_answers(" cat "), vec![" cat "]);
    }
}
