use std::sync::Mutex;

use uuid::Uuid;

use crate::error::StoreError;
use crate::quiz::Quiz;
use crate::store::QuizStore;

/// In-process store with the same semantics as [`crate::store::PgStore`],
/// including `NotFound` on unresolved identifiers. The integration tests
/// run the full authoring flow against it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    quizzes: Mutex<Vec<Quiz>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QuizStore for MemoryStore {
    async fn list_quizzes(&self) -> Result<Vec<Quiz>, StoreError> {
        let quizzes = self.quizzes.lock().unwrap();
        let mut listed: Vec<Quiz> = quizzes.clone();
        listed.sort_by(|a, b| b.available_date.cmp(&a.available_date));
        Ok(listed)
    }

    async fn create_quiz(&self) -> Result<Quiz, StoreError> {
        let quiz = Quiz::new();
        self.quizzes.lock().unwrap().push(quiz.clone());
        Ok(quiz)
    }

    async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>, StoreError> {
        let quizzes = self.quizzes.lock().unwrap();
        Ok(quizzes.iter().find(|quiz| quiz.id == id).cloned())
    }

    async fn replace_quiz(&self, id: Uuid, quiz: &Quiz) -> Result<Quiz, StoreError> {
        let mut quizzes = self.quizzes.lock().unwrap();
        let slot = quizzes
            .iter_mut()
            .find(|stored| stored.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let mut document = quiz.clone();
        document.id = id;
        *slot = document.clone();
        Ok(document)
    }

    async fn delete_quiz(&self, id: Uuid) -> Result<(), StoreError> {
        let mut quizzes = self.quizzes.lock().unwrap();
        let before = quizzes.len();
        quizzes.retain(|quiz| quiz.id != id);
        if quizzes.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn toggle_publish(&self, id: Uuid) -> Result<Quiz, StoreError> {
        let mut quizzes = self.quizzes.lock().unwrap();
        let quiz = quizzes
            .iter_mut()
            .find(|quiz| quiz.id == id)
            .ok_or(StoreError::NotFound(id))?;
        quiz.published = !quiz.published;
        Ok(quiz.clone())
    }
}
