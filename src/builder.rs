use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use teloxide::types::ChatId;
use teloxide::{payloads::SendMessageSetters, prelude::Requester, types::Message, Bot};
use tracing::instrument;

use crate::keyboard::{action_keyboard, quiz_menu_keyboard, questions_menu_keyboard, yes_no_keyboard};
use crate::session::Session;
use crate::state::QuizState;
use crate::store::QuizStore;
use crate::{HandlerResult, UserDialogue};

/// Parses a `YYYY-MM-DD` date into a midnight UTC timestamp.
fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

pub(crate) async fn show_quiz_menu(bot: &Bot, chat_id: ChatId, session: &Session) -> HandlerResult {
    bot.send_message(chat_id, session.quiz.to_string())
        .parse_mode(teloxide::types::ParseMode::Html)
        .reply_markup(quiz_menu_keyboard())
        .await?;
    Ok(())
}

pub(crate) async fn show_questions_menu(
    bot: &Bot,
    chat_id: ChatId,
    session: &Session,
) -> HandlerResult {
    let listing = if session.quiz.questions.is_empty() {
        "No questions yet. Add the first one!".to_owned()
    } else {
        session
            .quiz
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                format!(
                    "{}. {} ({}, {} pts)",
                    i + 1,
                    if q.title.is_empty() { "Untitled" } else { q.title.as_str() },
                    q.kind,
                    q.points
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    bot.send_message(chat_id, listing)
        .reply_markup(questions_menu_keyboard())
        .await?;
    Ok(())
}

#[instrument(level = "info", skip(connection, bot, dialogue))]
pub(crate) async fn select_quiz_to_edit<Store: QuizStore>(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    choices: Vec<(uuid::Uuid, String)>,
    connection: Arc<Store>,
) -> HandlerResult {
    let id = match msg.text().and_then(crate::keyboard::parse_choice) {
        Some(index) => match choices.get(index) {
            Some((id, _)) => *id,
            None => {
                bot.send_message(msg.chat.id, "Please pick a quiz from the list.")
                    .await?;
                return Ok(());
            }
        },
        None => {
            bot.send_message(msg.chat.id, "Please pick a quiz from the list.")
                .await?;
            return Ok(());
        }
    };

    match connection.get_quiz(id).await {
        Ok(Some(quiz)) => {
            log::info!("opening quiz {} for editing", quiz.id);
            let session = Session::new(quiz);
            show_quiz_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        Ok(None) => {
            bot.send_message(msg.chat.id, "That quiz no longer exists.")
                .reply_markup(action_keyboard())
                .await?;
            dialogue.update(QuizState::Start).await?;
        }
        Err(e) => {
            log::error!("fetching quiz {} failed: {}", id, e);
            bot.send_message(msg.chat.id, "Failed to load the quiz. Please try again.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(connection, bot, dialogue, session))]
pub(crate) async fn handle_quiz<Store: QuizStore>(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
    connection: Arc<Store>,
) -> HandlerResult {
    match msg.text() {
        Some("Edit title") => {
            bot.send_message(msg.chat.id, "What's the new quiz title?").await?;
            dialogue.update(QuizState::EditQuizTitle { session }).await?;
        }
        Some("Edit description") => {
            bot.send_message(msg.chat.id, "What's the new quiz description?")
                .await?;
            dialogue
                .update(QuizState::EditQuizDescription { session })
                .await?;
        }
        Some("Edit points") => {
            bot.send_message(msg.chat.id, "How many points is the quiz worth?")
                .await?;
            dialogue.update(QuizState::EditQuizPoints { session }).await?;
        }
        Some("Time limit") => {
            bot.send_message(
                msg.chat.id,
                "Send the time limit in minutes, or 'off' to disable it.",
            )
            .await?;
            dialogue.update(QuizState::EditTimeLimit { session }).await?;
        }
        Some("Toggle shuffle") => {
            session.quiz.shuffle_answers = !session.quiz.shuffle_answers;
            bot.send_message(
                msg.chat.id,
                format!(
                    "Shuffle answers is now {}.",
                    if session.quiz.shuffle_answers { "on" } else { "off" }
                ),
            )
            .await?;
            show_quiz_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        Some("Available date") => {
            bot.send_message(msg.chat.id, "Send the available date (YYYY-MM-DD).")
                .await?;
            dialogue
                .update(QuizState::EditAvailableDate { session })
                .await?;
        }
        Some("Due date") => {
            bot.send_message(msg.chat.id, "Send the due date (YYYY-MM-DD), or 'none' to clear it.")
                .await?;
            dialogue.update(QuizState::EditDueDate { session }).await?;
        }
        Some("Until date") => {
            bot.send_message(
                msg.chat.id,
                "Send the until date (YYYY-MM-DD), or 'none' to clear it.",
            )
            .await?;
            dialogue.update(QuizState::EditUntilDate { session }).await?;
        }
        Some("Questions") => {
            show_questions_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuestions { session }).await?;
        }
        Some("Save💾") => {
            save_quiz(&bot, &msg, &dialogue, session, &connection, false).await?;
        }
        Some("Save & Publish") => {
            save_quiz(&bot, &msg, &dialogue, session, &connection, true).await?;
        }
        Some("Toggle publish") => {
            // Narrow write against the stored record, independent of the
            // working copy; only the flag is synced back locally.
            match connection.toggle_publish(session.quiz.id).await {
                Ok(stored) => {
                    session.quiz.published = stored.published;
                    bot.send_message(
                        msg.chat.id,
                        format!(
                            "Quiz is now {}.",
                            if stored.published { "published" } else { "unpublished" }
                        ),
                    )
                    .await?;
                }
                Err(e) => {
                    log::error!("publish toggle failed: {}", e);
                    bot.send_message(msg.chat.id, "Failed to toggle publish. Please try again.")
                        .await?;
                }
            }
            show_quiz_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        Some("Delete quiz🗑️") => {
            bot.send_message(
                msg.chat.id,
                "Delete this quiz? This cannot be undone. (Yes/No)",
            )
            .reply_markup(yes_no_keyboard())
            .await?;
            dialogue.update(QuizState::ConfirmDeleteQuiz { session }).await?;
        }
        Some("Back") => {
            bot.send_message(msg.chat.id, "Leaving the editor. Unsaved changes are discarded.")
                .reply_markup(action_keyboard())
                .await?;
            dialogue.update(QuizState::Start).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Invalid input. Try again.").await?;
        }
    }

    Ok(())
}

async fn save_quiz<Store: QuizStore>(
    bot: &Bot,
    msg: &Message,
    dialogue: &UserDialogue,
    mut session: Session,
    connection: &Arc<Store>,
    publish: bool,
) -> HandlerResult {
    // The publish flag is stamped on a copy so a failed save leaves the
    // working copy reporting the stored state.
    let mut document = session.quiz.clone();
    if publish {
        document.published = true;
    }
    match connection.replace_quiz(document.id, &document).await {
        Ok(_) => {
            session.quiz = document;
            log::info!("quiz {} saved", session.quiz.id);
            bot.send_message(
                msg.chat.id,
                if publish { "Quiz saved and published!" } else { "Quiz saved!" },
            )
            .await?;
        }
        Err(e) => {
            // The working copy stays in the dialogue state untouched, so
            // the author can retry the save.
            log::error!("saving quiz {} failed: {}", session.quiz.id, e);
            bot.send_message(msg.chat.id, "Failed to save the quiz. Please try again.")
                .await?;
        }
    }
    show_quiz_menu(bot, msg.chat.id, &session).await?;
    dialogue.update(QuizState::HandleQuiz { session }).await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_quiz_title(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
) -> HandlerResult {
    match msg.text() {
        Some(title) if !title.trim().is_empty() => {
            session.quiz.title = title.trim().to_owned();
            bot.send_message(msg.chat.id, "Quiz title updated.").await?;
            show_quiz_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Please send a non-empty title.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_quiz_description(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
) -> HandlerResult {
    match msg.text() {
        Some(description) => {
            session.quiz.description = description.to_owned();
            bot.send_message(msg.chat.id, "Quiz description updated.").await?;
            show_quiz_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please send a description.").await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_quiz_points(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
) -> HandlerResult {
    match msg.text().and_then(|text| text.trim().parse::<i32>().ok()) {
        Some(points) if points >= 0 => {
            session.quiz.points = points;
            bot.send_message(msg.chat.id, "Quiz points updated.").await?;
            show_quiz_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Please send a non-negative number.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_time_limit(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
) -> HandlerResult {
    match msg.text().map(str::trim) {
        Some("off") => {
            session.quiz.time_limit.enabled = false;
            bot.send_message(msg.chat.id, "Time limit disabled.").await?;
            show_quiz_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        Some(minutes) => match minutes.parse::<i32>() {
            Ok(minutes) if minutes > 0 => {
                session.quiz.time_limit.enabled = true;
                session.quiz.time_limit.minutes = minutes;
                bot.send_message(msg.chat.id, format!("Time limit set to {} minutes.", minutes))
                    .await?;
                show_quiz_menu(&bot, msg.chat.id, &session).await?;
                dialogue.update(QuizState::HandleQuiz { session }).await?;
            }
            _ => {
                bot.send_message(msg.chat.id, "Send a positive number of minutes, or 'off'.")
                    .await?;
            }
        },
        None => {
            bot.send_message(msg.chat.id, "Send a positive number of minutes, or 'off'.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_available_date(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
) -> HandlerResult {
    match msg.text().and_then(parse_date) {
        Some(date) => {
            session.quiz.available_date = date;
            bot.send_message(msg.chat.id, "Available date updated.").await?;
            show_quiz_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        None => {
            // The available date always has a value, so 'none' is not an
            // option here.
            bot.send_message(msg.chat.id, "Please send a date as YYYY-MM-DD.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_due_date(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
) -> HandlerResult {
    match msg.text().map(str::trim) {
        Some("none") => {
            session.quiz.due_date = None;
            bot.send_message(msg.chat.id, "Due date cleared.").await?;
            show_quiz_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        Some(text) => match parse_date(text) {
            Some(date) => {
                session.quiz.due_date = Some(date);
                bot.send_message(msg.chat.id, "Due date updated.").await?;
                show_quiz_menu(&bot, msg.chat.id, &session).await?;
                dialogue.update(QuizState::HandleQuiz { session }).await?;
            }
            None => {
                bot.send_message(msg.chat.id, "Please send a date as YYYY-MM-DD, or 'none'.")
                    .await?;
            }
        },
        None => {
            bot.send_message(msg.chat.id, "Please send a date as YYYY-MM-DD, or 'none'.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(bot, dialogue, session))]
pub(crate) async fn edit_until_date(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
) -> HandlerResult {
    match msg.text().map(str::trim) {
        Some("none") => {
            session.quiz.until_date = None;
            bot.send_message(msg.chat.id, "Until date cleared.").await?;
            show_quiz_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        Some(text) => match parse_date(text) {
            Some(date) => {
                session.quiz.until_date = Some(date);
                bot.send_message(msg.chat.id, "Until date updated.").await?;
                show_quiz_menu(&bot, msg.chat.id, &session).await?;
                dialogue.update(QuizState::HandleQuiz { session }).await?;
            }
            None => {
                bot.send_message(msg.chat.id, "Please send a date as YYYY-MM-DD, or 'none'.")
                    .await?;
            }
        },
        None => {
            bot.send_message(msg.chat.id, "Please send a date as YYYY-MM-DD, or 'none'.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "info", skip(connection, bot, dialogue, session))]
pub(crate) async fn confirm_delete_quiz<Store: QuizStore>(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    session: Session,
    connection: Arc<Store>,
) -> HandlerResult {
    match msg.text() {
        Some("Yes") | Some("Yes✔️") => match connection.delete_quiz(session.quiz.id).await {
            Ok(()) => {
                log::info!("quiz {} deleted", session.quiz.id);
                bot.send_message(msg.chat.id, "Quiz deleted.")
                    .reply_markup(action_keyboard())
                    .await?;
                dialogue.update(QuizState::Start).await?;
            }
            Err(e) => {
                log::error!("deleting quiz {} failed: {}", session.quiz.id, e);
                bot.send_message(msg.chat.id, "Failed to delete the quiz. Please try again.")
                    .await?;
                show_quiz_menu(&bot, msg.chat.id, &session).await?;
                dialogue.update(QuizState::HandleQuiz { session }).await?;
            }
        },
        Some("No") | Some("No❌") => {
            bot.send_message(msg.chat.id, "Keeping the quiz.").await?;
            show_quiz_menu(&bot, msg.chat.id, &session).await?;
            dialogue.update(QuizState::HandleQuiz { session }).await?;
        }
        _ => {
            bot.send_message(msg.chat.id, "Please answer Yes or No.")
                .reply_markup(yes_no_keyboard())
                .await?;
        }
    }

    Ok(())
}
