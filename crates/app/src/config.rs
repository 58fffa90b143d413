use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use quiz_core::model::GameRules;
use services::{AppServices, Clock, LessonCatalog};

/// Lessons bundled with the binary, used when no lesson file is given.
const BUILTIN_LESSONS: &str = include_str!("../assets/lessons.json");

/// Settings resolved from flags and environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_url: String,
    pub lessons: Option<PathBuf>,
    pub shuffle: bool,
    pub auto_advance: Option<Duration>,
}

impl AppConfig {
    pub fn new(db_url: &str, lessons: Option<PathBuf>) -> Self {
        Self {
            db_url: normalize_sqlite_url(db_url),
            lessons,
            shuffle: false,
            auto_advance: None,
        }
    }

    /// Load lessons, open storage, and wire the services.
    pub async fn build_services(&self) -> anyhow::Result<AppServices> {
        let catalog = match &self.lessons {
            Some(path) => LessonCatalog::from_path(path)
                .await
                .with_context(|| format!("loading lessons from {}", path.display()))?,
            None => LessonCatalog::from_json_str(BUILTIN_LESSONS)
                .context("loading built-in lessons")?,
        };

        prepare_sqlite_file(&self.db_url)?;
        let mut services =
            AppServices::new_sqlite(&self.db_url, Clock::default(), GameRules::default(), catalog)
                .await
                .with_context(|| format!("opening {}", self.db_url))?
                .with_shuffle_questions(self.shuffle);
        if let Some(delay) = self.auto_advance {
            services = services.with_auto_advance(delay);
        }
        Ok(services)
    }
}

/// Turn `path`, `sqlite:path` or `sqlite://path` into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file and its parent directories if missing.
fn prepare_sqlite_file(db_url: &str) -> anyhow::Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid database url: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid database url: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("creating {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_urls_are_normalized() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/quiz.db"),
            "sqlite:///tmp/quiz.db"
        );
        assert_eq!(normalize_sqlite_url("/tmp/quiz.db"), "sqlite:///tmp/quiz.db");
        assert_eq!(
            normalize_sqlite_url("sqlite:/var/quiz.db"),
            "sqlite:///var/quiz.db"
        );

        let relative = normalize_sqlite_url("quiz.sqlite3");
        assert!(relative.starts_with("sqlite:///"));
        assert!(relative.ends_with("quiz.sqlite3"));
    }

    #[test]
    fn builtin_lessons_are_valid() {
        let catalog = LessonCatalog::from_json_str(BUILTIN_LESSONS).unwrap();
        assert!(catalog.len() >= 3);
        assert!(
            catalog
                .lessons()
                .iter()
                .all(|lesson| lesson.questions().iter().all(|q| q.option_count() >= 2))
        );
    }

    #[test]
    fn prepare_rejects_non_sqlite_urls() {
        assert!(prepare_sqlite_file("postgres://db").is_err());
        assert!(prepare_sqlite_file("sqlite://").is_err());
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
    }

    #[tokio::test]
    async fn in_memory_config_builds_services() {
        let config = AppConfig::new("sqlite::memory:", None);
        let services = config.build_services().await.unwrap();
        assert!(!services.catalog().is_empty());
        assert_eq!(services.stats().load().await.unwrap().xp(), 0);
    }
}
