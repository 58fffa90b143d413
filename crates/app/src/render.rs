//! Plain-text rendering of quiz updates for the terminal.

use std::fmt::Write as _;

use quiz_core::model::{CompletionSummary, Lesson, RunOutcome, StatsOverview};
use quiz_core::quiz::{AnswerFeedback, FeedbackCue, NextStep, SelectionRejected};
use services::{QuestionView, RunReport};

pub fn question(view: &QuestionView) -> String {
    let mut out = format!(
        "\n[{}] {} - question {} of {}",
        view.mode,
        view.lesson_title,
        view.index + 1,
        view.total
    );
    if let Some(lives) = view.lives_remaining {
        let _ = write!(out, "  lives: {}", hearts(lives));
    }
    let _ = write!(out, "\n{}\n", view.prompt);
    for (i, option) in view.options.iter().enumerate() {
        let _ = writeln!(out, "  {}) {option}", i + 1);
    }
    out.push_str("> ");
    out
}

/// Feedback for an answer. `options` are the texts of the answered question.
pub fn feedback(feedback: &AnswerFeedback, options: &[String]) -> String {
    let mut out = String::new();
    match feedback.cue {
        Some(FeedbackCue::Celebrate) => out.push_str("*** "),
        Some(FeedbackCue::Shake) => out.push_str("~~~ "),
        None => {}
    }
    if feedback.is_correct {
        out.push_str("Correct!");
    } else {
        let right = options
            .get(feedback.correct_index)
            .map_or("?", String::as_str);
        let _ = write!(
            out,
            "Wrong. The answer was {}) {right}",
            feedback.correct_index + 1
        );
    }
    if let Some(explanation) = &feedback.explanation {
        let _ = write!(out, "\n  {explanation}");
    }
    if let Some(lives) = feedback.lives_remaining {
        let _ = write!(out, "\n  lives: {}", hearts(lives));
    }
    match feedback.next {
        NextStep::AwaitConfirm => out.push_str("\n(press enter to continue)"),
        NextStep::AutoAdvance(_) => out.push_str("\n(press enter to skip ahead)"),
        NextStep::GameOver => {}
    }
    out
}

pub fn ignored(rejected: &SelectionRejected) -> String {
    match rejected {
        SelectionRejected::AlreadyAnswered(_) => {
            "Already answered; press enter to continue.".into()
        }
        SelectionRejected::OptionOutOfRange { len, .. } => {
            format!("Pick a number from 1 to {len}.")
        }
        other => format!("Ignored: {other}"),
    }
}

pub fn report(report: &RunReport) -> String {
    let summary = &report.summary;
    let mut out = match summary.outcome() {
        RunOutcome::Completed => "\nLesson complete!".to_owned(),
        RunOutcome::GameOver => "\nGame over! You ran out of lives.".to_owned(),
    };
    let _ = write!(
        out,
        "\n  score: {}/{}  time: {}s",
        summary.correct_count(),
        summary.total(),
        summary.elapsed().num_seconds()
    );
    if let Some(lives) = summary.lives_remaining() {
        let _ = write!(out, "\n  lives: {}", hearts(lives));
    }
    let _ = write!(out, "\n  xp from answers: {}", summary.xp_earned());
    if summary.is_completed() && summary.bonus_xp() > 0 {
        let _ = write!(out, "\n  {} bonus: {}", summary.mode(), summary.bonus_xp());
    }
    if report.lesson_bonus_xp > 0 {
        let _ = write!(out, "\n  first completion bonus: {}", report.lesson_bonus_xp);
    }
    let _ = write!(out, "\n  total: +{} xp\n", report.total_xp());
    out.push_str(&stats(&report.stats));
    out
}

pub fn stats(stats: &StatsOverview) -> String {
    format!(
        "Level {} {} | {} xp ({}/{} xp, +{} to next, {}%)\n\
         answered {} | correct {} | accuracy {}% | streak {} | lessons {}",
        stats.level,
        stats.title,
        stats.xp,
        stats.xp_in_level,
        stats.xp_per_level,
        stats.xp_to_next_level,
        stats.level_progress_percent,
        stats.questions_answered,
        stats.correct_answers,
        stats.accuracy,
        stats.streak,
        stats.lessons_completed,
    )
}

pub fn lesson_line(lesson: &Lesson, completed: bool) -> String {
    let mark = if completed { "x" } else { " " };
    format!(
        "[{mark}] {:<12} {} ({} questions)",
        lesson.id().as_str(),
        lesson.title(),
        lesson.len()
    )
}

pub fn history_line(id: i64, summary: &CompletionSummary) -> String {
    let mut out = format!(
        "#{id:<4} {} {:<12} {:<9} {:<10} {}/{}",
        summary.finished_at().format("%Y-%m-%d %H:%M"),
        summary.lesson_id().as_str(),
        summary.mode().as_str(),
        summary.outcome().as_str(),
        summary.correct_count(),
        summary.total()
    );
    if summary.bonus_xp() > 0 {
        let _ = write!(out, " +{} bonus", summary.bonus_xp());
    }
    out
}

fn hearts(lives: u32) -> String {
    "<3 ".repeat(usize::try_from(lives).unwrap_or(0)).trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{GameRules, LessonId, Mode, PlayerStats};
    use quiz_core::time::fixed_now;

    fn view() -> QuestionView {
        QuestionView {
            lesson_title: "Basics".into(),
            mode: Mode::Challenge,
            index: 1,
            total: 4,
            prompt: "Pick one".into(),
            options: vec!["alpha".into(), "beta".into()],
            lives_remaining: Some(2),
        }
    }

    fn answer(is_correct: bool, cue: Option<FeedbackCue>, next: NextStep) -> AnswerFeedback {
        AnswerFeedback {
            question_index: 1,
            selected: if is_correct { 1 } else { 0 },
            correct_index: 1,
            is_correct,
            explanation: Some("beta is right".into()),
            lives_remaining: None,
            cue,
            next,
        }
    }

    #[test]
    fn question_lists_numbered_options_and_lives() {
        let text = question(&view());
        assert!(text.contains("[challenge] Basics - question 2 of 4"));
        assert!(text.contains("lives: <3 <3"));
        assert!(text.contains("  1) alpha\n  2) beta\n"));
    }

    #[test]
    fn feedback_names_the_correct_option() {
        let options = view().options;
        let shake = answer(false, Some(FeedbackCue::Shake), NextStep::AwaitConfirm);
        let wrong = feedback(&shake, &options);
        assert!(wrong.starts_with("~~~ Wrong. The answer was 2) beta"));
        assert!(wrong.contains("beta is right"));
        assert!(wrong.ends_with("(press enter to continue)"));

        let right = feedback(&answer(true, None, NextStep::GameOver), &options);
        assert!(right.starts_with("Correct!"));
        assert!(!right.contains("press enter"));
    }

    #[test]
    fn ignored_out_of_range_hints_at_valid_numbers() {
        let text = ignored(&SelectionRejected::OptionOutOfRange { option: 9, len: 4 });
        assert_eq!(text, "Pick a number from 1 to 4.");
    }

    #[test]
    fn stats_line_shows_level_and_title() {
        let mut player = PlayerStats::new();
        let rules = GameRules::default();
        for _ in 0..7 {
            player.record_answer(true, &rules);
        }
        let text = stats(&player.overview(&rules));
        assert!(text.starts_with("Level 2 Learner | 35 xp (5/30 xp, +25 to next, 16%)"));
        assert!(text.contains("accuracy 100%"));
    }

    #[test]
    fn report_shows_lives_left_in_challenge() {
        let summary = CompletionSummary::from_persisted(
            LessonId::new("L1"),
            Mode::Challenge,
            RunOutcome::Completed,
            4,
            5,
            20,
            10,
            Some(2),
            fixed_now(),
            fixed_now(),
        )
        .unwrap();
        let mut player = PlayerStats::new();
        let rules = GameRules::default();
        for _ in 0..4 {
            player.record_answer(true, &rules);
        }
        let text = report(&RunReport {
            summary,
            lesson_bonus_xp: 10,
            history_id: 1,
            stats: player.overview(&rules),
        });
        assert!(text.contains("\n  lives: <3 <3\n"));
        assert!(text.contains("challenge bonus: 10"));
        assert!(text.contains("total: +40 xp"));
    }

    #[test]
    fn history_line_includes_outcome_and_score() {
        let summary = CompletionSummary::from_persisted(
            LessonId::new("L1"),
            Mode::Speedrun,
            RunOutcome::Completed,
            4,
            5,
            20,
            12,
            None,
            fixed_now(),
            fixed_now(),
        )
        .unwrap();
        let line = history_line(3, &summary);
        assert!(line.starts_with("#3    2023-11-14 22:13 L1"));
        assert!(line.contains("speedrun"));
        assert!(line.contains("completed"));
        assert!(line.contains("4/5 +12 bonus"));
    }
}
