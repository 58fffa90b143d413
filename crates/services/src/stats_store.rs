use std::sync::Arc;

use quiz_core::model::{CompletionSummary, GameRules, LessonId, PlayerStats, StatsOverview};
use storage::repository::{KeyValueStore, StatKey};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StatsError;

/// What a completed lesson added to the player's stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCredit {
    /// One-time lesson bonus, 0 on replays.
    pub lesson_bonus_xp: u64,
    pub bonus_xp: u64,
    pub stats: StatsOverview,
}

/// Persisted player counters on top of a key-value store.
///
/// Every mutation is a read-modify-write of the full record, serialized by an
/// internal lock.
pub struct StatsStore {
    values: Arc<dyn KeyValueStore>,
    rules: GameRules,
    write_lock: Mutex<()>,
}

impl StatsStore {
    #[must_use]
    pub fn new(values: Arc<dyn KeyValueStore>, rules: GameRules) -> Self {
        Self {
            values,
            rules,
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Load the current stats. Missing or unreadable values count as zero.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Storage` if the store cannot be read.
    pub async fn load(&self) -> Result<PlayerStats, StatsError> {
        let keys = StatKey::ALL.map(StatKey::as_str);
        let mut raw = self.values.get_many(&keys).await?.into_iter();
        let mut next = |key| read_counter(key, raw.next().flatten());

        let xp = next(StatKey::Xp);
        let questions_answered = next(StatKey::QuestionsAnswered);
        let correct_answers = next(StatKey::CorrectAnswers);
        let streak = next(StatKey::Streak);
        let completed_lessons = read_lessons(raw.next().flatten());

        Ok(PlayerStats::from_persisted(
            xp,
            questions_answered,
            correct_answers,
            streak,
            completed_lessons,
        ))
    }

    /// Derived view for rendering (level, accuracy, title, ...).
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Storage` if the store cannot be read.
    pub async fn overview(&self) -> Result<StatsOverview, StatsError> {
        Ok(self.load().await?.overview(&self.rules))
    }

    /// Count one answered question.
    ///
    /// # Errors
    ///
    /// Returns `StatsError` if the counters cannot be read or written.
    pub async fn record_answer(&self, is_correct: bool) -> Result<PlayerStats, StatsError> {
        let (stats, awarded) = self
            .update(|stats, rules| stats.record_answer(is_correct, rules))
            .await?;
        debug!(is_correct, awarded, xp = stats.xp(), "answer recorded");
        Ok(stats)
    }

    /// Credit a lesson the first time it is completed.
    ///
    /// Returns true if the completion bonus was awarded.
    ///
    /// # Errors
    ///
    /// Returns `StatsError` if the counters cannot be read or written.
    pub async fn complete_lesson(&self, lesson_id: &LessonId) -> Result<bool, StatsError> {
        let (_, awarded) = self
            .update(|stats, rules| stats.complete_lesson(lesson_id, rules))
            .await?;
        Ok(awarded)
    }

    /// # Errors
    ///
    /// Returns `StatsError` if the counters cannot be read or written.
    pub async fn increment_streak(&self) -> Result<u64, StatsError> {
        let (stats, ()) = self.update(|stats, _| stats.increment_streak()).await?;
        Ok(stats.streak())
    }

    /// Add mode bonus XP. Returns the new XP total.
    ///
    /// # Errors
    ///
    /// Returns `StatsError` if the counters cannot be read or written.
    pub async fn award_bonus(&self, bonus_xp: u64) -> Result<u64, StatsError> {
        if bonus_xp == 0 {
            return Ok(self.load().await?.xp());
        }
        let (stats, ()) = self.update(|stats, _| stats.award_bonus(bonus_xp)).await?;
        Ok(stats.xp())
    }

    /// Apply everything a completed lesson earns in one write: streak, one-time
    /// lesson bonus, and the mode bonus.
    ///
    /// Game-over summaries earn nothing and leave the stats untouched.
    ///
    /// # Errors
    ///
    /// Returns `StatsError` if the counters cannot be read or written.
    pub async fn credit_completion(
        &self,
        summary: &CompletionSummary,
    ) -> Result<CompletionCredit, StatsError> {
        if !summary.is_completed() {
            return Ok(CompletionCredit {
                lesson_bonus_xp: 0,
                bonus_xp: 0,
                stats: self.overview().await?,
            });
        }

        let (stats, first_time) = self
            .update(|stats, rules| {
                stats.increment_streak();
                let first_time = stats.complete_lesson(summary.lesson_id(), rules);
                stats.award_bonus(summary.bonus_xp());
                first_time
            })
            .await?;

        Ok(CompletionCredit {
            lesson_bonus_xp: if first_time {
                self.rules.lesson_completion_xp()
            } else {
                0
            },
            bonus_xp: summary.bonus_xp(),
            stats: stats.overview(&self.rules),
        })
    }

    /// Forget all persisted counters.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Storage` if the store cannot be written.
    pub async fn reset(&self) -> Result<(), StatsError> {
        let _guard = self.write_lock.lock().await;
        let keys = StatKey::ALL.map(StatKey::as_str);
        self.values.remove_many(&keys).await?;
        Ok(())
    }

    async fn update<R>(
        &self,
        apply: impl FnOnce(&mut PlayerStats, &GameRules) -> R,
    ) -> Result<(PlayerStats, R), StatsError> {
        let _guard = self.write_lock.lock().await;
        let mut stats = self.load().await?;
        let out = apply(&mut stats, &self.rules);
        self.save(&stats).await?;
        Ok((stats, out))
    }

    async fn save(&self, stats: &PlayerStats) -> Result<(), StatsError> {
        let lessons = serde_json::to_string(stats.completed_lessons())?;
        self.values
            .set_many(&[
                (StatKey::Xp.as_str(), stats.xp().to_string()),
                (
                    StatKey::QuestionsAnswered.as_str(),
                    stats.questions_answered().to_string(),
                ),
                (
                    StatKey::CorrectAnswers.as_str(),
                    stats.correct_answers().to_string(),
                ),
                (StatKey::Streak.as_str(), stats.streak().to_string()),
                (StatKey::CompletedLessons.as_str(), lessons),
            ])
            .await?;
        Ok(())
    }
}

/// Lenient counter parse: integers as-is, non-negative decimals floored,
/// everything else 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_counter(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<u64>() {
        return Some(value);
    }
    let value = raw.parse::<f64>().ok().filter(|v| v.is_finite())?;
    if value < 0.0 {
        return None;
    }
    Some(value.floor() as u64)
}

fn read_counter(key: StatKey, raw: Option<String>) -> u64 {
    let Some(raw) = raw else {
        return 0;
    };
    parse_counter(&raw).unwrap_or_else(|| {
        warn!(key = key.as_str(), value = %raw, "unreadable counter, using 0");
        0
    })
}

fn read_lessons(raw: Option<String>) -> Vec<LessonId> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    serde_json::from_str(&raw).unwrap_or_else(|err| {
        warn!(
            key = StatKey::CompletedLessons.as_str(),
            %err,
            "unreadable lesson list, using empty"
        );
        Vec::new()
    })
}
