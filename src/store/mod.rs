use uuid::Uuid;

use crate::error::StoreError;
use crate::quiz::Quiz;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// The persistence collaborator: a collection of quiz documents addressed
/// by opaque identifier. Saves are whole-document replaces; the one narrow
/// write is the publish toggle, which flips `published` independently of
/// any in-flight full save (last writer wins, by design).
pub trait QuizStore {
    /// All quizzes, newest `available_date` first.
    async fn list_quizzes(&self) -> Result<Vec<Quiz>, StoreError>;

    /// Creates a quiz with server-side defaults; the store stamps the
    /// identifier and `available_date`.
    async fn create_quiz(&self) -> Result<Quiz, StoreError>;

    async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>, StoreError>;

    /// Whole-document overwrite. The stored identifier wins over whatever
    /// the document body carries.
    async fn replace_quiz(&self, id: Uuid, quiz: &Quiz) -> Result<Quiz, StoreError>;

    async fn delete_quiz(&self, id: Uuid) -> Result<(), StoreError>;

    /// Read-modify-write flipping `published` only.
    async fn toggle_publish(&self, id: Uuid) -> Result<Quiz, StoreError>;
}
