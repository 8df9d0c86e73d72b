use quizdeck::error::StoreError;
use quizdeck::navigator::Navigator;
use quizdeck::quiz::{Question, QuestionKind};
use quizdeck::session::Session;
use quizdeck::store::{MemoryStore, QuizStore};
use uuid::Uuid;

#[tokio::test]
async fn author_commit_save_and_fetch_round_trip() {
    let store = MemoryStore::new();
    let quiz = store.create_quiz().await.unwrap();
    let id = quiz.id;

    let mut session = Session::new(quiz);
    session.start_new().unwrap();
    session.set_prompt("What is the capital of France?").unwrap();
    session.set_option_text(0, "Paris").unwrap();
    session.set_option_correct(0, true).unwrap();
    session.set_option_text(1, "London").unwrap();
    session.commit().unwrap();

    store.replace_quiz(id, &session.quiz).await.unwrap();

    let fetched = store.get_quiz(id).await.unwrap().unwrap();
    assert_eq!(fetched.questions.len(), 1);
    let question = &fetched.questions[0];
    assert_eq!(question.kind, QuestionKind::MultipleChoice);
    assert_eq!(question.options.len(), 2);
    assert_eq!(question.options[0].text, "Paris");
    assert!(question.options[0].is_correct);
    assert_eq!(question.options[1].text, "London");
    assert!(!question.options[1].is_correct);
}

#[tokio::test]
async fn double_publish_toggle_returns_to_unpublished() {
    let store = MemoryStore::new();
    let quiz = store.create_quiz().await.unwrap();
    assert!(!quiz.published);

    let once = store.toggle_publish(quiz.id).await.unwrap();
    assert!(once.published);
    let twice = store.toggle_publish(quiz.id).await.unwrap();
    assert!(!twice.published);

    let stored = store.get_quiz(quiz.id).await.unwrap().unwrap();
    assert!(!stored.published);
}

#[tokio::test]
async fn publish_toggle_is_independent_of_a_full_save() {
    let store = MemoryStore::new();
    let quiz = store.create_quiz().await.unwrap();
    let id = quiz.id;

    // A session holds its working copy while someone toggles publish.
    let mut session = Session::new(quiz);
    session.quiz.title = "Renamed".to_owned();
    store.toggle_publish(id).await.unwrap();

    // The full save overwrites the whole document; the toggle is lost.
    // Last writer wins, by design.
    let saved = store.replace_quiz(id, &session.quiz).await.unwrap();
    assert_eq!(saved.title, "Renamed");
    assert!(!saved.published);
}

#[tokio::test]
async fn preview_navigator_clamps_at_the_last_question() {
    let store = MemoryStore::new();
    let quiz = store.create_quiz().await.unwrap();
    let id = quiz.id;

    let mut session = Session::new(quiz);
    for _ in 0..3 {
        session.start_new().unwrap();
        session.commit().unwrap();
    }
    store.replace_quiz(id, &session.quiz).await.unwrap();

    let fetched = store.get_quiz(id).await.unwrap().unwrap();
    let mut navigator = Navigator::new(fetched.questions.len()).unwrap();
    navigator.next();
    navigator.next();
    navigator.next();
    assert_eq!(navigator.cursor(), 2);
    assert!(navigator.is_last());
}

#[tokio::test]
async fn listing_is_sorted_by_available_date_descending() {
    let store = MemoryStore::new();
    let first = store.create_quiz().await.unwrap();
    let second = store.create_quiz().await.unwrap();

    // Push the first quiz into the future so ordering is deterministic.
    let mut updated = first.clone();
    updated.available_date = updated.available_date + chrono::Duration::days(7);
    store.replace_quiz(first.id, &updated).await.unwrap();

    let listed = store.list_quizzes().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first.id);
    assert_eq!(listed[1].id, second.id);
}

#[tokio::test]
async fn replace_keeps_the_stored_identifier() {
    let store = MemoryStore::new();
    let quiz = store.create_quiz().await.unwrap();
    let id = quiz.id;

    let mut doctored = quiz.clone();
    doctored.id = Uuid::new_v4();
    let saved = store.replace_quiz(id, &doctored).await.unwrap();
    assert_eq!(saved.id, id);
}

#[tokio::test]
async fn operations_on_missing_ids_report_not_found() {
    let store = MemoryStore::new();
    let missing = Uuid::new_v4();

    assert!(store.get_quiz(missing).await.unwrap().is_none());
    assert!(matches!(
        store.replace_quiz(missing, &quizdeck::quiz::Quiz::new()).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.delete_quiz(missing).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.toggle_publish(missing).await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn failed_save_leaves_the_working_copy_intact() {
    let store = MemoryStore::new();
    let quiz = store.create_quiz().await.unwrap();
    let id = quiz.id;

    let mut session = Session::new(quiz);
    session.start_new().unwrap();
    session.set_title("survives the failure").unwrap();
    session.commit().unwrap();

    // Simulate the record vanishing under the session.
    store.delete_quiz(id).await.unwrap();
    assert!(store.replace_quiz(id, &session.quiz).await.is_err());

    // The working copy is untouched and can be retried elsewhere.
    assert_eq!(session.quiz.questions.len(), 1);
    assert_eq!(session.quiz.questions[0].title, "survives the failure");
}

#[tokio::test]
async fn failed_publish_save_does_not_mark_the_working_copy_published() {
    let store = MemoryStore::new();
    let quiz = store.create_quiz().await.unwrap();
    let id = quiz.id;

    let session = Session::new(quiz);
    store.delete_quiz(id).await.unwrap();

    // Save-and-publish stamps the flag on the document sent to the store,
    // never on the working copy ahead of a successful write.
    let mut document = session.quiz.clone();
    document.published = true;
    assert!(matches!(
        store.replace_quiz(id, &document).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(!session.quiz.published);
}

#[tokio::test]
async fn deleted_quiz_is_gone() {
    let store = MemoryStore::new();
    let quiz = store.create_quiz().await.unwrap();

    store.delete_quiz(quiz.id).await.unwrap();
    assert!(store.get_quiz(quiz.id).await.unwrap().is_none());
    assert!(store.list_quizzes().await.unwrap().is_empty());
}

#[tokio::test]
async fn fill_blank_question_survives_the_save_cycle() {
    let store = MemoryStore::new();
    let quiz = store.create_quiz().await.unwrap();
    let id = quiz.id;

    let mut session = Session::new(quiz);
    session.start_new().unwrap();
    session.change_kind(QuestionKind::FillBlank).unwrap();
    session.set_blank_answers(0, "cat\n  \ndog\n").unwrap();
    session.add_blank().unwrap();
    session.set_blank_answers(1, "fish").unwrap();
    session.commit().unwrap();
    store.replace_quiz(id, &session.quiz).await.unwrap();

    let fetched = store.get_quiz(id).await.unwrap().unwrap();
    let question: &Question = &fetched.questions[0];
    assert_eq!(question.kind, QuestionKind::FillBlank);
    assert_eq!(question.blanks.len(), 2);
    assert_eq!(question.blanks[0].possible_answers, vec!["cat", "dog"]);
    assert_eq!(question.blanks[1].possible_answers, vec!["fish"]);
}
