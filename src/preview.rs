use std::sync::Arc;

use teloxide::{
    dispatching::dialogue::GetChatId,
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{CallbackQuery, Message},
    Bot,
};
use tracing::instrument;

use crate::keyboard::{action_keyboard, parse_choice, preview_keyboard};
use crate::navigator::Navigator;
use crate::quiz::Quiz;
use crate::state::QuizState;
use crate::store::QuizStore;
use crate::{HandlerResult, UserDialogue};

async fn show_question(
    bot: &Bot,
    chat_id: teloxide::types::ChatId,
    quiz: &Quiz,
    navigator: &Navigator,
) -> HandlerResult {
    let question = &quiz.questions[navigator.cursor()];
    bot.send_message(
        chat_id,
        format!(
            "Question {} of {}\n\n{}",
            navigator.cursor() + 1,
            navigator.total(),
            question
        ),
    )
    .parse_mode(teloxide::types::ParseMode::Html)
    .reply_markup(preview_keyboard(navigator))
    .await?;
    Ok(())
}

#[instrument(level = "info", skip(connection, bot, dialogue))]
pub(crate) async fn select_quiz_to_preview<Store: QuizStore>(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    choices: Vec<(uuid::Uuid, String)>,
    connection: Arc<Store>,
) -> HandlerResult {
    let id = match msg.text().and_then(parse_choice) {
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
        Ok(Some(quiz)) => match Navigator::new(quiz.questions.len()) {
            Some(navigator) => {
                log::info!("previewing quiz {}", quiz.id);
                bot.send_message(
                    msg.chat.id,
                    format!("{}\n\nThis is a preview; answers are not recorded.", quiz),
                )
                .parse_mode(teloxide::types::ParseMode::Html)
                .await?;
                show_question(&bot, msg.chat.id, &quiz, &navigator).await?;
                dialogue
                    .update(QuizState::Previewing { quiz, navigator })
                    .await?;
            }
            None => {
                bot.send_message(msg.chat.id, "This quiz has no questions yet.")
                    .reply_markup(action_keyboard())
                    .await?;
                dialogue.update(QuizState::Start).await?;
            }
        },
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

/// Handles the inline Previous/Next/jump/Submit buttons. Movement is
/// clamped by the navigator, so a tap past either edge simply re-answers
/// the callback without moving.
#[instrument(level = "info", skip(bot, dialogue))]
pub(crate) async fn navigate(
    bot: Bot,
    dialogue: UserDialogue,
    q: CallbackQuery,
    (quiz, mut navigator): (Quiz, Navigator),
) -> HandlerResult {
    bot.answer_callback_query(&q.id).await?;

    let chat_id = match q.chat_id() {
        Some(chat_id) => chat_id,
        None => return Ok(()),
    };

    let data = q.data.as_deref().unwrap_or_default();
    if data == "submit" {
        // Preview only: no score, no attempt record, nothing validated.
        log::info!("preview of quiz {} submitted", quiz.id);
        bot.send_message(chat_id, "Preview finished! Nothing was recorded.")
            .reply_markup(action_keyboard())
            .await?;
        dialogue.update(QuizState::Start).await?;
        return Ok(());
    }

    let before = navigator.cursor();
    match data {
        "next" => navigator.next(),
        "prev" => navigator.previous(),
        _ => {
            if let Some(index) = data.strip_prefix("jump:").and_then(|n| n.parse().ok()) {
                navigator.jump_to(index);
            }
        }
    }

    if navigator.cursor() != before {
        show_question(&bot, chat_id, &quiz, &navigator).await?;
    }
    dialogue
        .update(QuizState::Previewing { quiz, navigator })
        .await?;

    Ok(())
}
