use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use rustyline::Editor;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use parsel_application::bus::{ParentMessage, ResultPayload};
use parsel_application::workbench::Workbench;
use parsel_core::config::ParselConfig;
use parsel_core::page::PageKind;
use parsel_core::tab::TabId;
use parsel_interaction::client::HttpChatClient;
use parsel_viz::SortStep;

const COMMANDS: &[&str] = &[
    ":tabs", ":new", ":tab", ":close", ":move", ":parse", ":edit", ":page", ":select",
    ":show", ":clear",
];

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with(':') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with(':') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with(':') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Prints one page frame's message stream with its own color accent. The
/// visualization frame additionally replays detected sort runs as bar rows.
fn spawn_frame_printer(page: PageKind, mut rx: mpsc::UnboundedReceiver<ParentMessage>) {
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            match message {
                ParentMessage::ModeChanged { parsing } => {
                    tracing::debug!("{page} frame saw mode change (parsing={parsing})");
                }
                ParentMessage::Result { payload, .. } => match payload {
                    ResultPayload::Status { text } => {
                        println!("{}", format!("[{page}] {text}").bright_black());
                    }
                    ResultPayload::Warning { text } => {
                        println!("{}", format!("[{page}] {text}").yellow());
                    }
                    ResultPayload::Content { markdown } => {
                        println!("{}", format!("[{page}]").bright_magenta());
                        for line in markdown.lines() {
                            println!("{}", line.bright_blue());
                        }
                        println!();
                    }
                    ResultPayload::Visualization {
                        algorithm,
                        array_data,
                    } => match parsel_viz::generate(&algorithm, &array_data) {
                        Ok(run) => {
                            println!(
                                "{}",
                                format!("[{page}] {}", run.algorithm_name).bright_magenta()
                            );
                            for (i, step) in run.steps.iter().enumerate() {
                                println!("  {:>3} {}", i, render_step(step));
                            }
                            println!();
                        }
                        Err(err) => {
                            println!("{}", format!("[{page}] {err}").yellow());
                        }
                    },
                },
            }
        }
    });
}

/// One animation frame as a line of numbers, coloring the indices the
/// step tags as compared, swapped or settled.
fn render_step(step: &SortStep) -> String {
    step.array
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let cell = format!("{value:>3}");
            if step.swapping.contains(&i) {
                cell.red().to_string()
            } else if step.comparing.contains(&i) {
                cell.yellow().to_string()
            } else if step.sorted.contains(&i) {
                cell.green().to_string()
            } else {
                cell
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_tabs(workbench: &Workbench) {
    for (i, tab) in workbench.registry().tabs().iter().enumerate() {
        let marker = if tab.id == *workbench.registry().active_id() {
            "*"
        } else {
            " "
        };
        let mode = if tab.mode.is_parsing() {
            "parsing".bright_cyan()
        } else {
            "editing".normal()
        };
        println!("{marker} {i}: {} [{mode}]", tab.name);
    }
}

fn tab_id_at(workbench: &Workbench, arg: &str) -> Option<TabId> {
    let index: usize = arg.parse().ok()?;
    workbench.registry().tabs().get(index).map(|t| t.id.clone())
}

fn handle_command(workbench: &mut Workbench, line: &str) {
    let (command, arg) = match line.split_once(' ') {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        ":tabs" => print_tabs(workbench),
        ":new" => {
            let name = if arg.is_empty() {
                None
            } else {
                Some(arg.to_string())
            };
            let id = workbench.new_tab(name);
            println!("{}", format!("Opened {}", id).green());
        }
        ":tab" => match tab_id_at(workbench, arg) {
            Some(id) => workbench.switch_tab(&id),
            None => println!("{}", "Usage: :tab <index>".yellow()),
        },
        ":close" => match tab_id_at(workbench, arg) {
            Some(id) => workbench.close_tab(&id),
            None => println!("{}", "Usage: :close <index>".yellow()),
        },
        ":move" => {
            let mut parts = arg.split_whitespace();
            match (
                parts.next().and_then(|p| p.parse().ok()),
                parts.next().and_then(|p| p.parse().ok()),
            ) {
                (Some(from), Some(to)) => workbench.reorder_tabs(from, to),
                _ => println!("{}", "Usage: :move <from> <to>".yellow()),
            }
        }
        ":parse" => {
            workbench.enter_parsing();
            println!("{}", "Parsing mode. Highlight with :select <text>.".bright_cyan());
        }
        ":edit" => {
            workbench.enter_editing();
            println!("{}", "Editing mode.".bright_cyan());
        }
        ":page" => {
            let page = match arg {
                "1" | "explanation" => Some(PageKind::Explanation),
                "2" | "visualization" => Some(PageKind::Visualization),
                "3" | "complexity" => Some(PageKind::Complexity),
                _ => None,
            };
            match page {
                Some(page) => {
                    // Same path a frame takes when it announces itself.
                    workbench.handle_child_json(&format!(
                        r#"{{"kind":"page_identity","page":"{page}"}}"#
                    ));
                    println!("{}", format!("Page: {page}").bright_cyan());
                }
                None => println!(
                    "{}",
                    "Usage: :page <explanation|visualization|complexity|1|2|3>".yellow()
                ),
            }
        }
        ":select" => {
            if arg.is_empty() {
                println!("{}", "Usage: :select <text>".yellow());
            } else if !workbench.submit_selection(arg) {
                println!("{}", "Selection not submitted.".yellow());
            }
        }
        ":show" => {
            for line in workbench.buffer().lines() {
                println!("{line}");
            }
        }
        ":clear" => workbench.set_buffer(""),
        _ => println!("{}", "Unknown command".bright_black()),
    }
}

/// Line-oriented front end for the Parsel workbench.
///
/// Plain input lines append to the active tab's editor buffer; commands
/// starting with ':' drive tabs, modes, pages and selections. Frame
/// output is printed by per-page tasks as results arrive, so responses
/// land without blocking the prompt.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // ===== Backend Initialization =====
    let config = ParselConfig::from_env();
    let client = Arc::new(HttpChatClient::new(config.endpoint.clone()));
    let (mut workbench, mut completions) = Workbench::new(config, client);

    for page in PageKind::all() {
        let rx = workbench.register_frame(page);
        spawn_frame_printer(page, rx);
    }
    workbench.handle_child_json(r#"{"kind":"page_identity","page":"explanation"}"#);

    // Readline blocks, so it runs on its own thread and feeds lines in.
    let (line_tx, mut line_rx) = mpsc::channel::<String>(32);
    std::thread::spawn(move || {
        let mut rl = match Editor::new() {
            Ok(rl) => rl,
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                return;
            }
        };
        rl.set_helper(Some(CliHelper::new()));

        loop {
            match rl.readline(">> ") {
                Ok(line) => {
                    let _ = rl.add_history_entry(&line);
                    if line_tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(rustyline::error::ReadlineError::Interrupted) => {
                    println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                }
                Err(rustyline::error::ReadlineError::Eof) => {
                    let _ = line_tx.blocking_send("quit".to_string());
                    break;
                }
                Err(err) => {
                    eprintln!("{}", format!("Error: {:?}", err).red());
                    break;
                }
            }
        }
    });

    println!("{}", "=== Parsel ===".bright_magenta().bold());
    println!(
        "{}",
        format!("Session {}", workbench.session_id()).bright_black()
    );
    println!(
        "{}",
        "Type code to fill the buffer, ':parse' to analyze it, or 'quit' to exit.".bright_black()
    );
    println!();

    // ===== Main Loop =====
    loop {
        tokio::select! {
            line = line_rx.recv() => {
                let Some(line) = line else { break };
                let trimmed = line.trim();

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }

                if trimmed.starts_with(':') {
                    handle_command(&mut workbench, trimmed);
                } else {
                    // Append the raw line to the live buffer.
                    let mut buffer = workbench.buffer().to_string();
                    buffer.push_str(&line);
                    buffer.push('\n');
                    workbench.set_buffer(buffer);
                }
            }
            Some(completion) = completions.recv() => {
                workbench.apply_completion(completion);
            }
        }
    }

    // The reader thread parks on stdin; process exit reaps it.
    Ok(())
}
