use uuid::Uuid;

use crate::navigator::Navigator;
use crate::quiz::Quiz;
use crate::session::Session;

/// Where a chat currently is in the authoring/preview dialogue. States that
/// edit a quiz carry the whole [`Session`] (the private working copy plus
/// any in-progress question edit), so nothing is persisted until the
/// author explicitly saves.
#[derive(Debug, Clone, Default)]
pub enum QuizState {
    #[default]
    Start,

    // PART FOR --- SELECTING A QUIZ ---
    SelectQuizToEdit {
        choices: Vec<(Uuid, String)>,
    },
    SelectQuizToPreview {
        choices: Vec<(Uuid, String)>,
    },

    // PART FOR --- QUIZ DETAILS ---
    HandleQuiz {
        session: Session,
    },
    EditQuizTitle {
        session: Session,
    },
    EditQuizDescription {
        session: Session,
    },
    EditQuizPoints {
        session: Session,
    },
    EditTimeLimit {
        session: Session,
    },
    EditAvailableDate {
        session: Session,
    },
    EditDueDate {
        session: Session,
    },
    EditUntilDate {
        session: Session,
    },
    ConfirmDeleteQuiz {
        session: Session,
    },

    // PART FOR --- THE QUESTION LIST ---
    HandleQuestions {
        session: Session,
    },
    SelectQuestionToEdit {
        session: Session,
    },
    SelectQuestionToDelete {
        session: Session,
    },
    ConfirmDeleteQuestion {
        session: Session,
        index: usize,
    },

    // PART FOR --- EDITING ONE QUESTION ---
    // `session.working()` is Some in all of these.
    EditQuestion {
        session: Session,
    },
    ChooseQuestionKind {
        session: Session,
    },
    EditQuestionTitle {
        session: Session,
    },
    EditQuestionPrompt {
        session: Session,
    },
    EditQuestionPoints {
        session: Session,
    },
    SelectOption {
        session: Session,
    },
    HandleOption {
        session: Session,
        index: usize,
    },
    EditOptionText {
        session: Session,
        index: usize,
    },
    ChooseCorrectAnswer {
        session: Session,
    },
    SelectBlank {
        session: Session,
    },
    HandleBlank {
        session: Session,
        index: usize,
    },
    EditBlankAnswers {
        session: Session,
        index: usize,
    },

    // PART FOR --- PREVIEWING ---
    Previewing {
        quiz: Quiz,
        navigator: Navigator,
    },
}
