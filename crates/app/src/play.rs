//! Interactive terminal loop around a `QuizDriver`.

use std::io::Write as _;

use anyhow::Context;
use quiz_core::model::{LessonId, Mode};
use quiz_core::quiz::Selection;
use services::{AppServices, DriverExit, DriverInput, QuizUpdate};
use tokio::sync::mpsc;

use crate::render;

/// Map a line typed by the player to driver input.
///
/// Numbers pick an option (1-based), an empty line confirms, `q` quits.
/// Returns `None` for anything else.
pub fn parse_input(line: &str, current_question: Option<usize>) -> Option<DriverInput> {
    let line = line.trim();
    if line.is_empty() {
        return Some(DriverInput::Confirm);
    }
    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
        return Some(DriverInput::Quit);
    }
    let choice: usize = line.parse().ok()?;
    let option = choice.checked_sub(1)?;
    Some(DriverInput::Select(Selection::new(current_question?, option)))
}

/// Play one lesson on stdin/stdout until it finishes or the player quits.
pub async fn play(services: &AppServices, lesson_id: &LessonId, mode: Mode) -> anyhow::Result<()> {
    let driver = services.start(lesson_id, mode)?;

    let (input_tx, input_rx) = mpsc::channel(16);
    let (update_tx, mut updates) = mpsc::channel(16);
    let driver = tokio::spawn(driver.run(input_rx, update_tx));
    let mut lines = spawn_stdin_reader();

    let mut current: Option<usize> = None;
    let mut options: Vec<String> = Vec::new();

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else { break };
                match update {
                    QuizUpdate::Question(view) => {
                        current = Some(view.index);
                        options.clone_from(&view.options);
                        print_flush(&render::question(&view));
                    }
                    QuizUpdate::Feedback(feedback) => {
                        println!("{}", render::feedback(&feedback, &options));
                    }
                    QuizUpdate::Ignored(rejected) => println!("{}", render::ignored(&rejected)),
                    QuizUpdate::Finished(report) => {
                        println!("{}", render::report(&report));
                        break;
                    }
                }
            }
            line = lines.recv() => {
                let input = match line {
                    Some(line) => match parse_input(&line, current) {
                        Some(input) => input,
                        None => {
                            println!("Type an option number, enter to continue, or q to quit.");
                            continue;
                        }
                    },
                    None => DriverInput::Quit,
                };
                if input_tx.send(input).await.is_err() {
                    break;
                }
            }
        }
    }

    drop(input_tx);
    match driver.await.context("quiz task failed")?? {
        DriverExit::Finished(_) => {}
        DriverExit::Abandoned => println!("\nQuiz abandoned. Answers so far are saved."),
    }
    Ok(())
}

/// Read stdin lines on a plain thread so a pending read never blocks shutdown.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn print_flush(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_select_one_based_options() {
        assert_eq!(
            parse_input(" 2 ", Some(4)),
            Some(DriverInput::Select(Selection::new(4, 1)))
        );
        assert_eq!(parse_input("0", Some(0)), None);
        assert_eq!(parse_input("1", None), None);
        assert_eq!(parse_input("abc", Some(0)), None);
    }

    #[test]
    fn empty_line_confirms_and_q_quits() {
        assert_eq!(parse_input("", Some(0)), Some(DriverInput::Confirm));
        assert_eq!(parse_input("   ", None), Some(DriverInput::Confirm));
        assert_eq!(parse_input("Q", Some(0)), Some(DriverInput::Quit));
        assert_eq!(parse_input("quit", None), Some(DriverInput::Quit));
    }
}
