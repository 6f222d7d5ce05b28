use std::io::Write;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tokio_util::sync::CancellationToken;

use confidant_application::{SessionUseCase, TurnOutcome};
use confidant_core::session::SessionStore;
use confidant_infrastructure::paths::ConfidantPaths;
use confidant_infrastructure::{ConfigService, UserDirectoryLayout};
use confidant_interaction::OpenAIApiAgent;

mod cli;
mod command;
mod helper;
mod logging;

use cli::Args;
use command::{COMMANDS, ReplCommand};
use helper::CliHelper;

type Repl = Editor<CliHelper, DefaultHistory>;

const BANNER_WIDTH: usize = 60;

#[tokio::main]
async fn main() {
    if let Err(err) = run_app().await {
        eprintln!("{}", format!("\nFatal error: {err:#}").red().bold());
        std::process::exit(1);
    }
}

/// Sets up the Confidant REPL and runs it.
///
/// 1. Loads the configuration and applies command-line overrides
/// 2. Starts file logging
/// 3. Wires the session use case to an OpenAI-compatible agent
/// 4. Prepares the user's directories (fatal on failure) and runs the loop
async fn run_app() -> Result<()> {
    let args = Args::parse();

    let config_service = match &args.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new()?,
    };
    let config = args.apply_to(config_service.load()?);
    config.validate()?;

    let _log_guard = logging::init(&ConfidantPaths::logs_dir()?, &config.log_level)
        .context("Failed to initialize logging")?;
    tracing::info!(user_id = %config.user_id, model = %config.generation.model, "Starting confidant");

    let base_dir = match &config.base_dir {
        Some(dir) => dir.clone(),
        None => ConfidantPaths::user_data_dir()?,
    };

    let agent = Arc::new(
        OpenAIApiAgent::from_settings(&config.generation)?
            .with_chat_sampling(config.chat_sampling.clone())
            .with_portrait_sampling(config.portrait_sampling.clone()),
    );
    let usecase = SessionUseCase::new(
        UserDirectoryLayout::new(base_dir),
        Arc::new(SessionStore::new(config.leading_instruction())),
        config.portrait_label.clone(),
        agent.clone(),
        agent,
    );

    let user_id = config.user_id.clone();
    let status = usecase.prepare_user(&user_id).await?;

    let mut rl: Repl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    print_banner(&user_id);
    system(&status);

    let cancel = CancellationToken::new();
    let outcome = run(&mut rl, &usecase, &user_id, &cancel).await;
    if let Err(err) = &outcome {
        tracing::error!(error = %err, "REPL stopped on a fatal error");
    }
    tracing::info!("Exiting confidant");
    outcome
}

/// Runs the read loop until the operator quits or a fatal error occurs.
async fn run(
    rl: &mut Repl,
    usecase: &SessionUseCase,
    user_id: &str,
    cancel: &CancellationToken,
) -> Result<()> {
    loop {
        let line = match rl.readline("You: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\n{}", "Goodbye!".bright_green());
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let command = ReplCommand::parse(&line);
        if command != ReplCommand::Empty {
            let _ = rl.add_history_entry(line.trim());
        }

        match command {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => {
                println!("{}", "Goodbye!".bright_green());
                return Ok(());
            }
            ReplCommand::Save => system(&usecase.save_conversation(user_id).await?),
            ReplCommand::ListHistory => system(&usecase.list_history(user_id).await?),
            ReplCommand::ListPortraits => system(&usecase.list_portraits(user_id).await?),
            ReplCommand::Reset => system(&usecase.reset_session(user_id).await?),
            ReplCommand::GeneratePortrait => {
                let Some(suggested) = usecase.suggest_history_file(user_id).await else {
                    system("No saved conversation files yet. Use /save first.");
                    continue;
                };
                system(&usecase.list_history(user_id).await?);
                let Some(file) = ask_file(rl, "Conversation file", &suggested)? else {
                    println!("\n{}", "Goodbye!".bright_green());
                    return Ok(());
                };
                println!("{}", "Generating portrait, this may take a while ...".bright_black());
                let status = usecase
                    .generate_portrait(user_id, &file, |portrait| {
                        print_portrait(&portrait.content)
                    })
                    .await?;
                system(&status);
            }
            ReplCommand::InjectPortrait => {
                let Some(suggested) = usecase.suggest_portrait_file(user_id).await else {
                    system("No generated portrait files yet. Use /gen portrait first.");
                    continue;
                };
                system(&usecase.list_portraits(user_id).await?);
                let Some(file) = ask_file(rl, "Portrait file", &suggested)? else {
                    println!("\n{}", "Goodbye!".bright_green());
                    return Ok(());
                };
                system(&usecase.inject_portrait(user_id, &file).await?);
            }
            ReplCommand::Chat(input) => {
                print!("\n{}", "Assistant: ".bright_blue().bold());
                let _ = std::io::stdout().flush();

                let outcome = usecase
                    .chat(
                        user_id,
                        &input,
                        |fragment| {
                            print!("{fragment}");
                            let _ = std::io::stdout().flush();
                        },
                        cancel,
                    )
                    .await?;
                println!("\n");

                if let TurnOutcome::Failed(status) = outcome {
                    system(&status);
                }
            }
        }
    }
}

/// Prompts for a file name; an empty answer selects `suggested`.
///
/// Returns `None` when the operator interrupts the prompt.
fn ask_file(rl: &mut Repl, what: &str, suggested: &str) -> Result<Option<String>> {
    let prompt = format!("{what} (e.g. {suggested}, Enter for latest): ");
    match rl.readline(&prompt) {
        Ok(answer) => {
            let answer = answer.trim();
            Ok(Some(if answer.is_empty() {
                suggested.to_string()
            } else {
                answer.to_string()
            }))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn system(status: &str) {
    println!("\n{} {}", "[System]".yellow().bold(), status);
}

fn print_portrait(content: &str) {
    let title = " User portrait generated ";
    let side = "=".repeat((BANNER_WIDTH - title.len()) / 2);
    println!("\n{}", format!("{side}{title}{side}").bright_magenta());
    println!("{content}");
    println!("{}\n", "=".repeat(BANNER_WIDTH).bright_magenta());
}

fn print_banner(user_id: &str) {
    let rule = "=".repeat(BANNER_WIDTH);
    println!("\n{}", rule.bright_magenta());
    println!("{}", "Welcome to Confidant, a command-line counseling assistant.".bold());
    println!("{}", format!("Session user: {user_id}").bright_black());
    println!("Supported commands:");
    let descriptions = [
        "save the current conversation to the history directory",
        "list saved conversation files",
        "list generated portrait files",
        "generate a portrait from a saved conversation (prompts for a file)",
        "inject a portrait into the current conversation (prompts for a file)",
        "reset the current conversation",
        "exit the program",
    ];
    for (command, description) in COMMANDS.iter().zip(descriptions) {
        println!("  {}- {}", format!("{command:<18}").bright_cyan(), description);
    }
    println!("{}\n", rule.bright_magenta());
}
