use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::{
    CompletionSummary, GameRules, Lesson, LessonDraft, LessonId, Mode, PlayerTitle,
    QuestionDraft, RunOutcome,
};
use quiz_core::quiz::{QuizSession, Selection, SelectionRejected};
use quiz_core::time::fixed_clock;
use services::{
    AdvanceOutcome, AnswerOutcome, AppServices, LessonCatalog, QuizError, QuizService, RunReport,
    StatsError, StatsStore,
};
use storage::repository::{
    CompletionLogRepository, CompletionRow, InMemoryRepository, KeyValueStore, StorageError,
};

fn lesson(id: &str, n: usize) -> Lesson {
    let questions = (0..n)
        .map(|i| {
            QuestionDraft::new(format!("{id} question {i}"), ["right", "wrong", "nope"], 0)
        })
        .collect();
    LessonDraft::new(id, questions).validate().unwrap()
}

fn app() -> AppServices {
    let catalog = LessonCatalog::from_lessons(vec![lesson("L1", 5), lesson("L2", 3)]).unwrap();
    AppServices::in_memory(fixed_clock(), GameRules::default(), catalog)
}

/// Answer every question with the given pattern and return the final report.
async fn play(quiz: &QuizService, session: &mut QuizSession, pattern: &[bool]) -> RunReport {
    for &correct in pattern {
        let index = session.current_index().expect("question showing");
        let option = if correct { 0 } else { 1 };
        let outcome = quiz
            .answer(session, Selection::new(index, option))
            .await
            .unwrap();
        match outcome {
            AnswerOutcome::Accepted(_) => {}
            AnswerOutcome::GameOver { report, .. } => return report,
            AnswerOutcome::Ignored(rejected) => panic!("unexpected rejection: {rejected}"),
        }
        if let AdvanceOutcome::Completed(report) = quiz.advance(session).await.unwrap() {
            return report;
        }
    }
    panic!("run did not finish");
}

#[tokio::test]
async fn completing_a_lesson_credits_xp_streak_and_history() {
    let app = app();
    let quiz = app.quiz();
    let l1 = LessonId::new("L1");

    let mut session = quiz.start(app.lesson(&l1).unwrap(), Mode::Fun);
    let report = play(&quiz, &mut session, &[true, false, true, false, true]).await;

    assert_eq!(report.summary.outcome(), RunOutcome::Completed);
    assert_eq!(report.summary.correct_count(), 3);
    assert_eq!(report.summary.xp_earned(), 15);
    assert_eq!(report.lesson_bonus_xp, 10);
    assert_eq!(report.total_xp(), 25);

    let stats = report.stats;
    assert_eq!(stats.xp, 25);
    assert_eq!(stats.level, 1);
    assert_eq!(stats.xp_in_level, 25);
    assert_eq!(stats.questions_answered, 5);
    assert_eq!(stats.correct_answers, 3);
    assert_eq!(stats.accuracy, 60);
    assert_eq!(stats.streak, 1);
    assert_eq!(stats.lessons_completed, 1);
    assert_eq!(stats.title, PlayerTitle::Apprentice);

    let history = app.history(None, 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, report.history_id);
    assert_eq!(history[0].summary, report.summary);
}

#[tokio::test]
async fn replaying_a_lesson_skips_the_completion_bonus() {
    let app = app();
    let quiz = app.quiz();
    let l2 = app.lesson(&LessonId::new("L2")).unwrap().clone();

    let mut first = quiz.start(&l2, Mode::Learn);
    let first = play(&quiz, &mut first, &[true; 3]).await;
    assert_eq!(first.lesson_bonus_xp, 10);
    assert_eq!(first.stats.xp, 25);

    let mut again = quiz.start(&l2, Mode::Learn);
    let again = play(&quiz, &mut again, &[true; 3]).await;
    assert_eq!(again.lesson_bonus_xp, 0);
    assert_eq!(again.stats.xp, 40);
    assert_eq!(again.stats.level, 2);
    assert_eq!(again.stats.streak, 2);
    assert_eq!(again.stats.lessons_completed, 1);

    let l2_history = app.history(Some(&LessonId::new("L2")), 10).await.unwrap();
    assert_eq!(l2_history.len(), 2);
}

#[tokio::test]
async fn challenge_game_over_records_answers_but_no_completion() {
    let app = app();
    let quiz = app.quiz();
    let l1 = LessonId::new("L1");

    app.stats().increment_streak().await.unwrap();

    let mut session = quiz.start(app.lesson(&l1).unwrap(), Mode::Challenge);
    let report = play(&quiz, &mut session, &[false, true, false, false, true]).await;

    assert_eq!(report.summary.outcome(), RunOutcome::GameOver);
    assert_eq!(report.summary.lives_remaining(), Some(0));
    assert_eq!(report.summary.bonus_xp(), 0);
    assert_eq!(report.lesson_bonus_xp, 0);
    assert!(session.is_finished());

    let stats = app.stats().load().await.unwrap();
    assert_eq!(stats.questions_answered(), 4);
    assert_eq!(stats.correct_answers(), 1);
    assert_eq!(stats.xp(), 5);
    assert_eq!(stats.streak(), 0);
    assert!(!stats.has_completed(&l1));

    let history = app.history(Some(&l1), 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].summary.outcome(), RunOutcome::GameOver);
}

#[tokio::test]
async fn challenge_completion_earns_survival_bonus() {
    let app = app();
    let quiz = app.quiz();

    let l2 = LessonId::new("L2");
    let mut session = quiz.start(app.lesson(&l2).unwrap(), Mode::Challenge);
    let report = play(&quiz, &mut session, &[true, false, true]).await;

    assert_eq!(report.summary.lives_remaining(), Some(2));
    assert_eq!(report.summary.bonus_xp(), 10);
    assert_eq!(report.stats.xp, 10 + 10 + 10);
}

#[tokio::test]
async fn speedrun_bonus_with_fixed_clock() {
    let app = app();
    let quiz = app.quiz();

    let l1 = LessonId::new("L1");
    let mut session = quiz.start(app.lesson(&l1).unwrap(), Mode::Speedrun);
    let report = play(&quiz, &mut session, &[true; 5]).await;

    // Fixed clock: zero elapsed out of a 50 second budget.
    assert_eq!(report.summary.bonus_xp(), 25);
    assert_eq!(report.stats.xp, 25 + 10 + 25);
    assert_eq!(report.total_xp(), 60);
}

#[tokio::test]
async fn duplicate_selection_is_not_counted_twice() {
    let app = app();
    let quiz = app.quiz();
    let l1 = LessonId::new("L1");
    let mut session = quiz.start(app.lesson(&l1).unwrap(), Mode::Learn);

    let first = quiz.answer(&mut session, Selection::new(0, 0)).await.unwrap();
    assert!(matches!(first, AnswerOutcome::Accepted(ref f) if f.is_correct));

    let again = quiz.answer(&mut session, Selection::new(0, 1)).await.unwrap();
    assert_eq!(again, AnswerOutcome::Ignored(SelectionRejected::AlreadyAnswered(0)));

    let stats = app.stats().load().await.unwrap();
    assert_eq!(stats.questions_answered(), 1);
    assert_eq!(stats.correct_answers(), 1);
    assert_eq!(stats.xp(), 5);
}

#[tokio::test]
async fn unknown_lesson_is_an_error() {
    let app = app();
    let Err(err) = app.start(&LessonId::new("missing"), Mode::Fun) else {
        panic!("expected unknown lesson");
    };
    assert!(matches!(err, QuizError::UnknownLesson(id) if id.as_str() == "missing"));
}

struct BrokenStore;

#[async_trait]
impl KeyValueStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Connection("disk on fire".into()))
    }

    async fn set_many(&self, _entries: &[(&str, String)]) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk on fire".into()))
    }

    async fn remove_many(&self, _keys: &[&str]) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk on fire".into()))
    }
}

#[tokio::test]
async fn storage_failures_surface_as_errors() {
    let stats = Arc::new(StatsStore::new(Arc::new(BrokenStore), GameRules::default()));
    let quiz = QuizService::new(fixed_clock(), stats, Arc::new(InMemoryRepository::new()));
    let mut session = quiz.start(&lesson("L1", 2), Mode::Learn);

    let err = quiz
        .answer(&mut session, Selection::new(0, 0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        QuizError::Stats(StatsError::Storage(StorageError::Connection(_)))
    ));
}

struct BrokenLog;

#[async_trait]
impl CompletionLogRepository for BrokenLog {
    async fn append_completion(&self, _summary: &CompletionSummary) -> Result<i64, StorageError> {
        Err(StorageError::Connection("history unavailable".into()))
    }

    async fn get_completion(&self, _id: i64) -> Result<CompletionSummary, StorageError> {
        Err(StorageError::Connection("history unavailable".into()))
    }

    async fn list_recent(
        &self,
        _lesson_id: Option<&LessonId>,
        _limit: u32,
    ) -> Result<Vec<CompletionRow>, StorageError> {
        Err(StorageError::Connection("history unavailable".into()))
    }
}

#[tokio::test]
async fn failed_history_insert_leaves_completion_uncredited() {
    let repo = InMemoryRepository::new();
    let stats = Arc::new(StatsStore::new(Arc::new(repo), GameRules::default()));
    let quiz = QuizService::new(fixed_clock(), Arc::clone(&stats), Arc::new(BrokenLog));
    let mut session = quiz.start(&lesson("L1", 1), Mode::Learn);

    let outcome = quiz
        .answer(&mut session, Selection::new(0, 0))
        .await
        .unwrap();
    assert!(matches!(outcome, AnswerOutcome::Accepted(_)));
    let err = quiz.advance(&mut session).await.unwrap_err();
    assert!(matches!(
        err,
        QuizError::Storage(StorageError::Connection(_))
    ));

    let player = stats.load().await.unwrap();
    assert_eq!(player.questions_answered(), 1);
    assert_eq!(player.xp(), 5);
    assert_eq!(player.streak(), 0);
    assert!(!player.has_completed(&LessonId::new("L1")));
}
