use std::{error::Error, sync::Arc};

use teloxide::{
    dispatching::{
        dialogue::{self, InMemStorage},
        DpHandlerDescription, UpdateFilterExt, UpdateHandler,
    },
    dptree::{self, Handler},
    payloads::SendMessageSetters,
    prelude::{DependencyMap, Requester},
    types::{Message, Update},
    Bot,
};
use tracing::instrument;

use crate::{
    builder,
    commands::{cancel, help, start, Command},
    editor,
    keyboard::numbered_keyboard,
    preview,
    session::Session,
    state::QuizState,
    store::{PgStore, QuizStore},
    HandlerResult, UserDialogue,
};

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Help].endpoint(help))
        .branch(case![Command::Start].endpoint(start))
        .branch(case![Command::Cancel].endpoint(cancel));

    let handler = Update::filter_message()
        .branch(command_handler)
        .branch(case![QuizState::Start].endpoint(choose_what_to_do::<PgStore>))
        .branch(builder_scheme())
        .branch(editor_scheme())
        .branch(preview_scheme())
        .endpoint(invalid_state);

    dialogue::enter::<Update, InMemStorage<QuizState>, QuizState, _>()
        .branch(handler)
        .branch(callback_query_scheme())
}

async fn choose_what_to_do<Store: QuizStore>(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    connection: Arc<Store>,
) -> HandlerResult {
    match msg.text() {
        Some("Create a new quiz🏗️") => match connection.create_quiz().await {
            Ok(quiz) => {
                log::info!("created quiz {}", quiz.id);
                let session = Session::new(quiz);
                builder::show_quiz_menu(&bot, msg.chat.id, &session).await?;
                dialogue.update(QuizState::HandleQuiz { session }).await?;
            }
            Err(e) => {
                log::error!("creating quiz failed: {}", e);
                bot.send_message(msg.chat.id, "Failed to create a quiz. Please try again.")
                    .await?;
            }
        },
        Some("Edit an existing quiz✏️") => match connection.list_quizzes().await {
            Ok(quizzes) if quizzes.is_empty() => {
                bot.send_message(msg.chat.id, "No quizzes yet. Create one first!")
                    .await?;
            }
            Ok(quizzes) => {
                let choices: Vec<_> = quizzes.iter().map(|q| (q.id, q.title.clone())).collect();
                let labels: Vec<String> = quizzes.iter().map(|q| q.title.clone()).collect();
                bot.send_message(msg.chat.id, "Select a quiz to edit:")
                    .reply_markup(numbered_keyboard(&labels))
                    .await?;
                dialogue
                    .update(QuizState::SelectQuizToEdit { choices })
                    .await?;
            }
            Err(e) => {
                log::error!("listing quizzes failed: {}", e);
                bot.send_message(msg.chat.id, "Failed to list quizzes. Please try again.")
                    .await?;
            }
        },
        Some("Preview a quiz📝") => match connection.list_quizzes().await {
            Ok(quizzes) if quizzes.is_empty() => {
                bot.send_message(msg.chat.id, "No quizzes to preview yet.").await?;
            }
            Ok(quizzes) => {
                let choices: Vec<_> = quizzes.iter().map(|q| (q.id, q.title.clone())).collect();
                let labels: Vec<String> = quizzes.iter().map(|q| q.title.clone()).collect();
                bot.send_message(msg.chat.id, "Select a quiz to preview:")
                    .reply_markup(numbered_keyboard(&labels))
                    .await?;
                dialogue
                    .update(QuizState::SelectQuizToPreview { choices })
                    .await?;
            }
            Err(e) => {
                log::error!("listing quizzes failed: {}", e);
                bot.send_message(msg.chat.id, "Failed to list quizzes. Please try again.")
                    .await?;
            }
        },
        other => {
            log::info!("invalid start input {:?}", other);
            bot.send_message(msg.chat.id, "Invalid input. Please try again.")
                .await?;
        }
    }

    Ok(())
}

#[instrument(level = "debug")]
fn builder_scheme() -> Handler<
    'static,
    DependencyMap,
    Result<(), Box<(dyn Error + Send + Sync + 'static)>>,
    DpHandlerDescription,
> {
    use dptree::case;
    Update::filter_message()
        .branch(
            case![QuizState::SelectQuizToEdit { choices }]
                .endpoint(builder::select_quiz_to_edit::<PgStore>),
        )
        .branch(case![QuizState::HandleQuiz { session }].endpoint(builder::handle_quiz::<PgStore>))
        .branch(case![QuizState::EditQuizTitle { session }].endpoint(builder::edit_quiz_title))
        .branch(
            case![QuizState::EditQuizDescription { session }]
                .endpoint(builder::edit_quiz_description),
        )
        .branch(case![QuizState::EditQuizPoints { session }].endpoint(builder::edit_quiz_points))
        .branch(case![QuizState::EditTimeLimit { session }].endpoint(builder::edit_time_limit))
        .branch(
            case![QuizState::EditAvailableDate { session }]
                .endpoint(builder::edit_available_date),
        )
        .branch(case![QuizState::EditDueDate { session }].endpoint(builder::edit_due_date))
        .branch(case![QuizState::EditUntilDate { session }].endpoint(builder::edit_until_date))
        .branch(
            case![QuizState::ConfirmDeleteQuiz { session }]
                .endpoint(builder::confirm_delete_quiz::<PgStore>),
        )
}

#[instrument(level = "debug")]
fn editor_scheme() -> Handler<
    'static,
    DependencyMap,
    Result<(), Box<(dyn Error + Send + Sync + 'static)>>,
    DpHandlerDescription,
> {
    use dptree::case;
    Update::filter_message()
        .branch(case![QuizState::HandleQuestions { session }].endpoint(editor::handle_questions))
        .branch(
            case![QuizState::SelectQuestionToEdit { session }]
                .endpoint(editor::select_question_to_edit),
        )
        .branch(
            case![QuizState::SelectQuestionToDelete { session }]
                .endpoint(editor::select_question_to_delete),
        )
        .branch(
            case![QuizState::ConfirmDeleteQuestion { session, index }]
                .endpoint(editor::confirm_delete_question),
        )
        .branch(case![QuizState::EditQuestion { session }].endpoint(editor::edit_question))
        .branch(
            case![QuizState::ChooseQuestionKind { session }].endpoint(editor::choose_question_kind),
        )
        .branch(
            case![QuizState::EditQuestionTitle { session }].endpoint(editor::edit_question_title),
        )
        .branch(
            case![QuizState::EditQuestionPrompt { session }]
                .endpoint(editor::edit_question_prompt),
        )
        .branch(
            case![QuizState::EditQuestionPoints { session }]
                .endpoint(editor::edit_question_points),
        )
        .branch(case![QuizState::SelectOption { session }].endpoint(editor::select_option))
        .branch(case![QuizState::HandleOption { session, index }].endpoint(editor::handle_option))
        .branch(
            case![QuizState::EditOptionText { session, index }].endpoint(editor::edit_option_text),
        )
        .branch(
            case![QuizState::ChooseCorrectAnswer { session }]
                .endpoint(editor::choose_correct_answer),
        )
        .branch(case![QuizState::SelectBlank { session }].endpoint(editor::select_blank))
        .branch(case![QuizState::HandleBlank { session, index }].endpoint(editor::handle_blank))
        .branch(
            case![QuizState::EditBlankAnswers { session, index }]
                .endpoint(editor::edit_blank_answers),
        )
}

#[instrument(level = "debug")]
fn preview_scheme() -> Handler<
    'static,
    DependencyMap,
    Result<(), Box<(dyn Error + Send + Sync + 'static)>>,
    DpHandlerDescription,
> {
    use dptree::case;
    Update::filter_message().branch(
        case![QuizState::SelectQuizToPreview { choices }]
            .endpoint(preview::select_quiz_to_preview::<PgStore>),
    )
}

#[instrument(level = "debug")]
fn callback_query_scheme() -> Handler<
    'static,
    DependencyMap,
    Result<(), Box<(dyn Error + Send + Sync + 'static)>>,
    DpHandlerDescription,
> {
    use dptree::case;

    Update::filter_callback_query()
        .branch(case![QuizState::Previewing { quiz, navigator }].endpoint(preview::navigate))
}

#[instrument(level = "info")]
async fn invalid_state(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "Unable to handle the message. Enter /help to see usages.",
    )
    .await?;
    Ok(())
}
