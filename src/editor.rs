use teloxide::types::ChatId;
use teloxide::{payloads::SendMessageSetters, prelude::Requester, types::Message, Bot};
use tracing::instrument;

use crate::builder::{show_questions_menu, show_quiz_menu};
use crate::error::SessionError;
use crate::keyboard::{
    blank_menu_keyboard, numbered_keyboard_with, option_menu_keyboard, parse_choice,
    question_kind_keyboard, question_menu_keyboard, true_false_keyboard, yes_no_keyboard,
};
use crate::quiz::QuestionKind;
use crate::session::Session;
use crate::state::QuizState;
use crate::{HandlerResult, UserDialogue};

pub(crate) async fn show_question_menu(
    bot: &Bot,
    chat_id: ChatId,
    session: &Session,
) -> HandlerResult {
    if let Some(working) = session.working() {
        let header = if session.editing_new() {
            "New question"
        } else {
            "Edit question"
        };
        bot.send_message(chat_id, format!("{}\n\n{}", header, working))
            .parse_mode(teloxide::types::ParseMode::Html)
            .reply_markup(question_menu_keyboard(working))
            .await?;
    }
    Ok(())
}

async fn show_options(bot: &Bot, chat_id: ChatId, session: &Session) -> HandlerResult {
    if let Some(working) = session.working() {
        let labels: Vec<String> = working
            .options
            .iter()
            .map(|option| {
                format!(
                    "{} {}",
                    if option.text.is_empty() { "(empty)" } else { &option.text },
                    if option.is_correct { "✅" } else { "" }
                )
            })
            .collect();
        bot.send_message(chat_id, "Pick an option, or add one:")
            .reply_markup(numbered_keyboard_with(&labels, &["Add option➕", "Back"]))
            .await?;
    }
    Ok(())
}

async fn show_blanks(bot: &Bot, chat_id: ChatId, session: &Session) -> HandlerResult {
    if let Some(working) = session.working() {
        let labels: Vec<String> = working
            .blanks
            .iter()
            .map(|blank| format!("Blank ({} answers)", blank.possible_answers.len()))
            .collect();
        bot.send_message(chat_id, "Pick a blank, or add one:")
            .reply_markup(numbered_keyboard_with(&labels, &["Add blank➕", "Back"]))
            .await?;
    }
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn handle_questions(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
) -> HandlerResult {
    match msg.text() {
        Some("New question➕") => {
            if session.start_new().is_err() {
                // A stale edit left behind; drop it and start fresh.
                session.discard();
                let _ = session.start_new();
            }
            show_question_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::EditQuestion { session }).await?;
        }
        Some("Edit question") => {
            if session.quiz.questions.is_empty() {
                bot.send_message(msg.chat.id, "No questions to edit yet.").await?;
            } else {
                let labels: Vec<String> = session
                    .quiz
                    .questions
                    .iter()
                    .map(|q| if q.title.is_empty() { "Untitled".to_owned() } else { q.title.clone() })
                    .collect();
                bot.send_message(msg.chat.id, "Which question?")
                    .reply_markup(numbered_keyboard_with(&labels, &["Back"]))
                    .await?;
                dialogue
                    .update(QuizState::SelectQuestionToEdit { session })
                    .await?;
            }
        }
        Some("Delete question🗑️") => {
            if session.quiz.questions.is_empty() {
                bot.send_message(msg.chat.id, "No questions to delete.").await?;
            } else {
                let labels: Vec<String> = session
                    .quiz
                    .questions
                    .iter()
                    .map(|q| if q.title.is_empty() { "Untitled".to_owned() } else { q.title.clone() })
                    .collect();
                bot.send_message(msg.chat.id, "Which question should be deleted?")
                    .reply_markup(numbered_keyboard_with(&labels, &["Back"]))
                    .await?;
                dialogue
                    .update(QuizState::SelectQuestionToDelete { session })
                    .await?;
            }
        }
        Some("Back") => {
            show_quiz_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Invalid input. Try again.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn select_question_to_edit(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
) -> HandlerResult {
    match msg.text() {
        Some("Back") => {
            show_questions_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuestions { session }).await?;
        }
        Some(text) => match parse_choice(text) {
            Some(index) => match session.start_edit(index) {
                Ok(()) => {
                    show_question_menu(&bot, msg.chat.id, &session).await?;
                    dialogue.update(QuizState::EditQuestion { session }).await?;
                }
                Err(e) => {
                    log::info!("cannot edit question {}: {}", index, e);
                    bot.send_message(msg.chat.id, "That question does not exist. Try again.")
                        .await?;
                }
            },
            None => {
                bot.send_message(msg.chat.id, "Please pick a question from the list.")
                    .await?;
            }
        },
        None => {
            bot.send_message(msg.chat.id, "Please pick a question from the list.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn select_question_to_delete(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    session: Session,
) -> HandlerResult {
    match msg.text() {
        Some("Back") => {
            show_questions_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuestions { session }).await?;
        }
        Some(text) => match parse_choice(text) {
            Some(index) if index < session.quiz.questions.len() => {
                bot.send_message(
                    msg.chat.id,
                    format!("Delete question {}? This cannot be undone. (Yes/No)", index + 1),
                )
                .reply_markup(yes_no_keyboard())
                .await?;
                dialogue
                    .update(QuizState::ConfirmDeleteQuestion { session, index })
                    .await?;
            }
            _ => {
                bot.send_message(msg.chat.id, "Please pick a question from the list.")
                    .await?;
            }
        },
        None => {
            bot.send_message(msg.chat.id, "Please pick a question from the list.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn confirm_delete_question(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    (mut session, index): (Session, usize),
) -> HandlerResult {
    match msg.text() {
        Some("Yes") | Some("Yes✔️") => {
            match session.delete_question(index) {
                Ok(_) => {
                    bot.send_message(msg.chat.id, "Question deleted.").await?;
                }
                Err(SessionError::OutOfRange { .. }) => {
                    bot.send_message(msg.chat.id, "That question no longer exists.")
                        .await?;
                }
                Err(e) => {
                    log::error!("deleting question {} failed: {}", index, e);
                    bot.send_message(msg.chat.id, "Cannot delete right now.").await?;
                }
            }
            show_questions_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuestions { session }).await?;
        }
        Some("No") | Some("No❌") => {
            bot.send_message(msg.chat.id, "Keeping the question.").await?;
            show_questions_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuestions { session }).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Please answer Yes or No.")
                .reply_markup(yes_no_keyboard())
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_question(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
) -> HandlerResult {
    let kind = match session.working() {
        Some(working) => working.kind,
        None => {
            // Should not happen; recover to the question list.
            show_questions_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuestions { session }).await?;
            return Ok(());
        }
    };

    match msg.text() {
        Some("Change type") => {
            bot.send_message(msg.chat.id, "What type should this question be?")
                .reply_markup(question_kind_keyboard())
                .await?;
            dialogue.update(QuizState::ChooseQuestionKind { session }).await?;
        }
        Some("Edit title") => {
            bot.send_message(msg.chat.id, "What's the question title?").await?;
            dialogue.update(QuizState::EditQuestionTitle { session }).await?;
        }
        Some("Edit prompt") => {
            bot.send_message(msg.chat.id, "What's the question text?").await?;
            dialogue.update(QuizState::EditQuestionPrompt { session }).await?;
        }
        Some("Edit points") => {
            bot.send_message(msg.chat.id, "How many points is this question worth?")
                .await?;
            dialogue.update(QuizState::EditQuestionPoints { session }).await?;
        }
        Some("Options") if kind == QuestionKind::MultipleChoice => {
            show_options(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::SelectOption { session }).await?;
        }
        Some("Correct answer") if kind == QuestionKind::TrueFalse => {
            bot.send_message(msg.chat.id, "What is the correct answer?")
                .reply_markup(true_false_keyboard())
                .await?;
            dialogue.update(QuizState::ChooseCorrectAnswer { session }).await?;
        }
        Some("Blanks") if kind == QuestionKind::FillBlank => {
            show_blanks(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::SelectBlank { session }).await?;
        }
        Some("Save question") => {
            match session.commit() {
                Ok(()) => {
                    bot.send_message(msg.chat.id, "Question saved into the quiz.").await?;
                }
                Err(e) => {
                    log::error!("commit failed: {}", e);
                    bot.send_message(msg.chat.id, "Nothing to save.").await?;
                }
            }
            show_questions_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuestions { session }).await?;
        }
        Some("Cancel question") => {
            session.discard();
            bot.send_message(msg.chat.id, "Question discarded.").await?;
            show_questions_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuestions { session }).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Invalid input. Try again.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn choose_question_kind(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
) -> HandlerResult {
    let kind = match msg.text() {
        Some("Multiple Choice") => Some(QuestionKind::MultipleChoice),
        Some("True/False") => Some(QuestionKind::TrueFalse),
        Some("Fill in the Blank") => Some(QuestionKind::FillBlank),
        _ => None,
    };

    match kind {
        Some(kind) => {
            session.change_kind(kind)?;
            bot.send_message(msg.chat.id, format!("Question type is now {}.", kind))
                .await?;
            show_question_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::EditQuestion { session }).await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please pick a type from the keyboard.")
                .reply_markup(question_kind_keyboard())
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_question_title(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
) -> HandlerResult {
    match msg.text() {
        Some(title) => {
            session.set_title(title)?;
            bot.send_message(msg.chat.id, "Question title updated.").await?;
            show_question_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::EditQuestion { session }).await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please send a title.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_question_prompt(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
) -> HandlerResult {
    match msg.text() {
        Some(prompt) => {
            session.set_prompt(prompt)?;
            bot.send_message(msg.chat.id, "Question text updated.").await?;
            show_question_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::EditQuestion { session }).await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please send the question text.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_question_points(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
) -> HandlerResult {
    match msg.text().and_then(|text| text.trim().parse::<i32>().ok()) {
        Some(points) if points >= 0 => {
            session.set_points(points)?;
            bot.send_message(msg.chat.id, "Question points updated.").await?;
            show_question_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::EditQuestion { session }).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Please send a non-negative number.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn select_option(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
) -> HandlerResult {
    let option_count = session.working().map(|q| q.options.len()).unwrap_or(0);

    match msg.text() {
        Some("Add option➕") => {
            session.add_option()?;
            bot.send_message(msg.chat.id, "Empty option added.").await?;
            show_options(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::SelectOption { session }).await?;
        }
        Some("Back") => {
            show_question_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::EditQuestion { session }).await?;
        }
        Some(text) => match parse_choice(text) {
            Some(index) if index < option_count => {
                bot.send_message(msg.chat.id, format!("Option {} selected.", index + 1))
                    .reply_markup(option_menu_keyboard())
                    .await?;
                dialogue.update(QuizState::HandleOption { session, index }).await?;
            }
            _ => {
                bot.send_message(msg.chat.id, "Please pick an option from the list.")
                    .await?;
            }
        },
        None => {
            bot.send_message(msg.chat.id, "Please pick an option from the list.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn handle_option(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    (mut session, index): (Session, usize),
) -> HandlerResult {
    match msg.text() {
        Some("Edit text") => {
            bot.send_message(msg.chat.id, "What's the option text?").await?;
            dialogue
                .update(QuizState::EditOptionText { session, index })
                .await?;
        }
        Some("Toggle correct") => {
            let currently = session
                .working()
                .and_then(|q| q.options.get(index))
                .map(|o| o.is_correct)
                .unwrap_or(false);
            match session.set_option_correct(index, !currently) {
                Ok(()) => {
                    bot.send_message(
                        msg.chat.id,
                        format!(
                            "Option {} is now {}.",
                            index + 1,
                            if currently { "incorrect" } else { "correct" }
                        ),
                    )
                    .await?;
                }
                Err(e) => {
                    log::info!("toggling option {} failed: {}", index, e);
                    bot.send_message(msg.chat.id, "That option no longer exists.").await?;
                }
            }
            show_options(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::SelectOption { session }).await?;
        }
        Some("Remove option") => {
            match session.remove_option(index) {
                Ok(()) => {
                    bot.send_message(msg.chat.id, "Option removed.").await?;
                }
                Err(e) => {
                    log::info!("removing option {} failed: {}", index, e);
                    bot.send_message(msg.chat.id, "That option no longer exists.").await?;
                }
            }
            show_options(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::SelectOption { session }).await?;
        }
        Some("Back") => {
            show_options(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::SelectOption { session }).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Invalid input. Try again.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_option_text(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    (mut session, index): (Session, usize),
) -> HandlerResult {
    match msg.text() {
        Some(text) => {
            match session.set_option_text(index, text) {
                Ok(()) => {
                    bot.send_message(msg.chat.id, "Option text updated.").await?;
                }
                Err(e) => {
                    log::info!("editing option {} failed: {}", index, e);
                    bot.send_message(msg.chat.id, "That option no longer exists.").await?;
                }
            }
            show_options(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::SelectOption { session }).await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please send the option text.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn choose_correct_answer(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
) -> HandlerResult {
    let answer = match msg.text() {
        Some("True") => Some(Some(true)),
        Some("False") => Some(Some(false)),
        Some("Clear answer") => Some(None),
        _ => None,
    };

    match answer {
        Some(answer) => {
            session.set_correct_answer(answer)?;
            bot.send_message(
                msg.chat.id,
                match answer {
                    Some(true) => "Correct answer set to True.",
                    Some(false) => "Correct answer set to False.",
                    None => "Answer key cleared.",
                },
            )
            .await?;
            show_question_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::EditQuestion { session }).await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please answer True, False or Clear answer.")
                .reply_markup(true_false_keyboard())
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn select_blank(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
) -> HandlerResult {
    let blank_count = session.working().map(|q| q.blanks.len()).unwrap_or(0);

    match msg.text() {
        Some("Add blank➕") => {
            session.add_blank()?;
            bot.send_message(msg.chat.id, "Blank added.").await?;
            show_blanks(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::SelectBlank { session }).await?;
        }
        Some("Back") => {
            show_question_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::EditQuestion { session }).await?;
        }
        Some(text) => match parse_choice(text) {
            Some(index) if index < blank_count => {
                bot.send_message(msg.chat.id, format!("Blank {} selected.", index + 1))
                    .reply_markup(blank_menu_keyboard())
                    .await?;
                dialogue.update(QuizState::HandleBlank { session, index }).await?;
            }
            _ => {
                bot.send_message(msg.chat.id, "Please pick a blank from the list.")
                    .await?;
            }
        },
        None => {
            bot.send_message(msg.chat.id, "Please pick a blank from the list.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn handle_blank(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    (mut session, index): (Session, usize),
) -> HandlerResult {
    match msg.text() {
        Some("Edit answers") => {
            bot.send_message(
                msg.chat.id,
                "Send the accepted answers, one per line. Empty lines are ignored.",
            )
            .await?;
            dialogue
                .update(QuizState::EditBlankAnswers { session, index })
                .await?;
        }
        Some("Remove blank") => {
            match session.remove_blank(index) {
                Ok(()) => {
                    bot.send_message(msg.chat.id, "Blank removed.").await?;
                }
                Err(e) => {
                    log::info!("removing blank {} failed: {}", index, e);
                    bot.send_message(msg.chat.id, "That blank no longer exists.").await?;
                }
            }
            show_blanks(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::SelectBlank { session }).await?;
        }
        Some("Back") => {
            show_blanks(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::SelectBlank { session }).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Invalid input. Try again.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_blank_answers(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    (mut session, index): (Session, usize),
) -> HandlerResult {
    match msg.text() {
        Some(input) => {
            match session.set_blank_answers(index, input) {
                Ok(()) => {
                    let count = session
                        .working()
                        .and_then(|q| q.blanks.get(index))
                        .map(|b| b.possible_answers.len())
                        .unwrap_or(0);
                    bot.send_message(
                        msg.chat.id,
                        format!("Blank now accepts {} answer(s).", count),
                    )
                    .await?;
                }
                Err(e) => {
                    log::info!("editing blank {} failed: {}", index, e);
                    bot.send_message(msg.chat.id, "That blank no longer exists.").await?;
                }
            }
            show_blanks(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::SelectBlank { session }).await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please send the answers as text.").await?;
        }
    }

    Ok(())
}
