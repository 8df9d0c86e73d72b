use std::borrow::Cow;

use sqlx::postgres::PgPool;
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use crate::error::StoreError;
use crate::quiz::Quiz;
use crate::store::QuizStore;

/// Postgres-backed document store. Each quiz lives as one JSONB document
/// in the `quizzes` table; `available_date` is mirrored into a column so
/// listing can sort without unpacking documents.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(connection_string: Cow<'_, str>) -> Result<Self, sqlx::Error> {
        let pool = PgPool::connect(&connection_string).await?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }
}

impl QuizStore for PgStore {
    async fn list_quizzes(&self) -> Result<Vec<Quiz>, StoreError> {
        let rows = sqlx::query("SELECT document FROM quizzes ORDER BY available_date DESC")
            .fetch_all(&self.pool)
            .await?;

        let quizzes = rows
            .into_iter()
            .map(|row| row.get::<Json<Quiz>, _>("document").0)
            .collect();

        Ok(quizzes)
    }

    async fn create_quiz(&self) -> Result<Quiz, StoreError> {
        let quiz = Quiz::new();
        log::debug!("creating quiz {}", quiz.id);

        sqlx::query("INSERT INTO quizzes (id, available_date, document) VALUES ($1, $2, $3)")
            .bind(quiz.id)
            .bind(quiz.available_date)
            .bind(Json(&quiz))
            .execute(&self.pool)
            .await?;

        Ok(quiz)
    }

    async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>, StoreError> {
        let row = sqlx::query("SELECT document FROM quizzes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get::<Json<Quiz>, _>("document").0))
    }

    async fn replace_quiz(&self, id: Uuid, quiz: &Quiz) -> Result<Quiz, StoreError> {
        let mut document = quiz.clone();
        document.id = id;

        let row =
            sqlx::query("UPDATE quizzes SET available_date = $2, document = $3 WHERE id = $1 RETURNING id")
                .bind(id)
                .bind(document.available_date)
                .bind(Json(&document))
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(_) => Ok(document),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn delete_quiz(&self, id: Uuid) -> Result<(), StoreError> {
        let row = sqlx::query("DELETE FROM quizzes WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn toggle_publish(&self, id: Uuid) -> Result<Quiz, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT document FROM quizzes WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let mut quiz = match row {
            Some(row) => row.get::<Json<Quiz>, _>("document").0,
            None => return Err(StoreError::NotFound(id)),
        };
        quiz.published = !quiz.published;

        sqlx::query("UPDATE quizzes SET document = $2 WHERE id = $1")
            .bind(id)
            .bind(Json(&quiz))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(quiz)
    }
}
