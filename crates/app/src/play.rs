//! Interactive terminal front end for a `SessionController`.

use std::io::Write;

use quiz_core::answer::ResultKind;
use quiz_core::model::{PRESET_TOPICS, QuizMode, ScoredMode};
use quiz_core::session::{Advance, Phase};
use services::{IssueType, PendingUpdate, SessionController};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

const HELP: &str = "Commands: :skip  :report [fact_error|typo|ui_bug|other] <note>  :menu  :quit";

struct Terminal {
    lines: Lines<BufReader<Stdin>>,
}

impl Terminal {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// `None` once stdin is closed.
    async fn ask(&mut self, label: &str) -> std::io::Result<Option<String>> {
        print!("{label}");
        std::io::stdout().flush()?;
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }
}

enum Flow {
    Menu,
    Quit,
}

pub async fn run(mut controller: SessionController) -> std::io::Result<()> {
    let mut term = Terminal::new();
    loop {
        let Some(pending) = choose_mode(&mut controller, &mut term).await? else {
            return Ok(());
        };
        println!("Loading questions...");
        settle(&mut controller, pending).await;

        match play_session(&mut controller, &mut term).await? {
            Flow::Menu => controller.to_menu(),
            Flow::Quit => return Ok(()),
        }
    }
}

async fn choose_mode(
    controller: &mut SessionController,
    term: &mut Terminal,
) -> std::io::Result<Option<PendingUpdate>> {
    loop {
        let scores = *controller.high_scores();
        println!();
        println!("Choose a game mode:");
        println!(
            "  1) {}  (best: {})",
            QuizMode::Capital,
            scores.get(ScoredMode::Capital)
        );
        println!(
            "  2) {}  (best: {})",
            QuizMode::Country,
            scores.get(ScoredMode::Country)
        );
        for (offset, topic) in PRESET_TOPICS.iter().enumerate() {
            println!("  {}) {topic} Trivia", offset + 3);
        }
        println!("  {}) Your own topic", PRESET_TOPICS.len() + 3);
        println!("  q) Quit");

        let Some(choice) = term.ask("> ").await? else {
            return Ok(None);
        };
        let mode = match choice.as_str() {
            "q" | ":q" | ":quit" => return Ok(None),
            "1" => Ok(QuizMode::Capital),
            "2" => Ok(QuizMode::Country),
            other => match other.parse::<usize>() {
                Ok(n) if (3..PRESET_TOPICS.len() + 3).contains(&n) => {
                    QuizMode::generated(PRESET_TOPICS[n - 3])
                }
                Ok(n) if n == PRESET_TOPICS.len() + 3 => {
                    let Some(topic) = term.ask("Topic: ").await? else {
                        return Ok(None);
                    };
                    QuizMode::generated(topic)
                }
                _ => {
                    println!("Please pick one of the listed options.");
                    continue;
                }
            },
        };

        match mode {
            Ok(mode) => return Ok(Some(controller.select_mode(mode))),
            Err(err) => println!("{err}"),
        }
    }
}

async fn play_session(
    controller: &mut SessionController,
    term: &mut Terminal,
) -> std::io::Result<Flow> {
    loop {
        match controller.session().phase() {
            Phase::ModeSelect | Phase::Loading => return Ok(Flow::Menu),
            Phase::LoadFailed => {
                let message = controller.session().load_error().unwrap_or_default();
                println!("{message}");
                match term.ask("[r]etry, [m]enu or [q]uit: ").await?.as_deref() {
                    Some("r") => match controller.retry() {
                        Ok(pending) => settle(controller, pending).await,
                        Err(err) => println!("{err}"),
                    },
                    Some("m") => return Ok(Flow::Menu),
                    Some("q") | None => return Ok(Flow::Quit),
                    Some(_) => {}
                }
            }
            Phase::Active => {
                if let Some(flow) = ask_question(controller, term).await? {
                    return Ok(flow);
                }
            }
            Phase::Answered => {
                show_result(controller);
                let Some(input) = term.ask("Press Enter to continue: ").await? else {
                    return Ok(Flow::Quit);
                };
                if let Some(flow) = run_command(controller, &input).await {
                    return Ok(flow);
                }
                if input.starts_with(':') {
                    continue;
                }
                match controller.advance().await {
                    Ok(Advance::Complete {
                        score,
                        new_high_score,
                    }) => show_summary(controller, score, new_high_score.is_some()),
                    Ok(Advance::Next { .. }) => {}
                    Err(err) => println!("{err}"),
                }
            }
            Phase::Complete => {
                match term.ask("[r]eplay, [m]enu or [q]uit: ").await?.as_deref() {
                    Some("r") => match controller.replay() {
                        Ok(pending) => {
                            println!("Loading questions...");
                            settle(controller, pending).await;
                        }
                        Err(err) => println!("{err}"),
                    },
                    Some("m") => return Ok(Flow::Menu),
                    Some("q") | None => return Ok(Flow::Quit),
                    Some(_) => {}
                }
            }
        }
    }
}

async fn ask_question(
    controller: &mut SessionController,
    term: &mut Terminal,
) -> std::io::Result<Option<Flow>> {
    let session = controller.session();
    let progress = session.progress();
    println!();
    println!(
        "Question {} / {}    Score: {}",
        progress.position, progress.total, progress.score
    );
    let options = session
        .current_question()
        .map(|question| question.options().to_vec())
        .unwrap_or_default();
    if let Some(prompt) = session.current_prompt() {
        println!("{prompt}");
    }
    for (n, option) in options.iter().enumerate() {
        println!("  {}) {option}", n + 1);
    }

    let Some(input) = term.ask("> ").await? else {
        return Ok(Some(Flow::Quit));
    };
    if input.is_empty() {
        println!("{HELP}");
        return Ok(None);
    }
    if let Some(flow) = run_command(controller, &input).await {
        return Ok(Some(flow));
    }

    let pending = if input == ":skip" {
        controller.skip()
    } else if input.starts_with(':') {
        return Ok(None);
    } else if options.is_empty() {
        controller.submit_answer(&input)
    } else {
        let choice = input
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|n| options.get(n))
            .map_or(input.as_str(), String::as_str);
        controller.select_option(choice)
    };

    match pending {
        Ok(Some(pending)) => {
            println!("Checking...");
            settle(controller, pending).await;
        }
        Ok(None) => {}
        Err(err) => println!("{err}"),
    }
    Ok(None)
}

/// Handles navigation and reporting commands; anything else is left to the caller.
async fn run_command(controller: &mut SessionController, input: &str) -> Option<Flow> {
    let (command, rest) = input.split_once(' ').unwrap_or((input, ""));
    match command {
        ":quit" | ":q" => Some(Flow::Quit),
        ":menu" => Some(Flow::Menu),
        ":help" => {
            println!("{HELP}");
            None
        }
        ":report" => {
            let rest = rest.trim();
            let (issue_type, note) = match rest.split_once(' ') {
                Some((kind, note)) => match kind.parse::<IssueType>() {
                    Ok(issue_type) => (issue_type, note),
                    Err(_) => (IssueType::Other, rest),
                },
                None => match rest.parse::<IssueType>() {
                    Ok(issue_type) => (issue_type, ""),
                    Err(_) => (IssueType::Other, rest),
                },
            };
            if controller.report_issue(issue_type, note).await {
                println!("Thanks, your report was sent.");
            } else {
                println!("Sorry, the report could not be sent.");
            }
            None
        }
        _ => None,
    }
}

fn show_result(controller: &SessionController) {
    let session = controller.session();
    let result = session.result();
    let marker = match result.kind {
        ResultKind::Correct => "✔ ",
        ResultKind::Incorrect => "✘ ",
        ResultKind::None => "",
    };
    if let Some(message) = &result.message {
        println!("{marker}{message}");
    }
    if let Some(fact) = session.pending_fact() {
        println!("Did you know? {fact}");
    }
}

fn show_summary(controller: &SessionController, score: u32, new_best: bool) {
    let session = controller.session();
    println!();
    println!("Final score: {score} / {}", session.progress().total);
    if let Some(mode) = session.mode().and_then(QuizMode::scored) {
        if new_best {
            println!("New high score!");
        }
        println!("Best for {mode}: {}", controller.high_scores().get(mode));
    }
}

async fn settle(controller: &mut SessionController, pending: PendingUpdate) {
    if let Err(err) = controller.settle(pending).await {
        warn!(error = %err, "could not apply result");
    }
}
