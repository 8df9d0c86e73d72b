use state::QuizState;
use teloxide::{dispatching::dialogue::InMemStorage, prelude::Dialogue};

pub mod builder;
pub mod commands;
pub mod editor;
pub mod error;
pub mod keyboard;
pub mod navigator;
pub mod preview;
pub mod quiz;
pub mod schema;
pub mod session;
pub mod state;
pub mod store;

type UserDialogue = Dialogue<QuizState, InMemStorage<QuizState>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
