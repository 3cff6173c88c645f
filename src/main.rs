//! CLI entry point for `chat2sql`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use chat2sql::config::Settings;
use chat2sql::executor::SqlEngine;
use chat2sql::llm::openai::OpenAiClient;
use chat2sql::logging;
use chat2sql::output::formatter;
use chat2sql::parser::schema::SchemaCatalog;
use chat2sql::pipeline::{ChatSession, QueryRunner, TurnOutcome};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "chat2sql",
    about = "Ask questions about a PostgreSQL table in plain language"
)]
struct Cli {
    /// Question to answer; questions are read from stdin, one per line, when omitted
    #[arg(long, conflicts_with = "params")]
    prompt: Option<String>,

    /// Free-text context for the model (tables, columns, business terms)
    #[arg(long, default_value = "", conflicts_with = "context_file")]
    context: String,

    /// Read the model context from a file
    #[arg(long)]
    context_file: Option<PathBuf>,

    /// Compile this parameter JSON instead of asking the model
    #[arg(long)]
    params: Option<String>,

    /// DDL file listing the tables and columns queries may use
    #[arg(long)]
    schema: Option<PathBuf>,

    #[command(flatten)]
    settings: Settings,

    /// Print debug diagnostics to stderr
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(message) => {
            eprintln!("Error: {message}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, String> {
    let mut runner = QueryRunner::new();
    if let Some(path) = &cli.schema {
        let ddl = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        let catalog = SchemaCatalog::from_ddl(&ddl).map_err(|e| e.to_string())?;
        runner = runner.with_catalog(catalog);
    }
    if let Some(engine) = build_engine(&cli.settings) {
        runner = runner.with_engine(engine);
    }
    if !runner.executes() {
        tracing::info!("no database engine attached; queries are compiled only");
    }

    if let Some(params) = &cli.params {
        let outcome = runner.process_response(params.clone());
        print!("{}", formatter::format_query_section(&outcome));
        return Ok(exit_code(&[outcome]));
    }

    let context = match &cli.context_file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?,
        None => cli.context.clone(),
    };

    let client = OpenAiClient::new(
        &cli.settings.api_base,
        cli.settings.require_api_key()?,
        &cli.settings.model,
    )
    .map_err(|e| e.to_string())?;
    let mut session = ChatSession::new(client, runner);

    let prompts: Vec<String> = match &cli.prompt {
        Some(prompt) => vec![prompt.clone()],
        None => io::stdin()
            .lock()
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("failed to read stdin: {e}"))?
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect(),
    };

    let mut outcomes = Vec::with_capacity(prompts.len());
    for prompt in &prompts {
        let mut write_error = None;
        let outcome = session
            .run_turn(prompt, &context, |token| {
                if write_error.is_some() {
                    return;
                }
                let mut stdout = io::stdout().lock();
                if let Err(e) = stdout
                    .write_all(token.as_bytes())
                    .and_then(|()| stdout.flush())
                {
                    write_error = Some(e);
                }
            })
            .map_err(|e| e.to_string())?;
        if let Some(e) = write_error {
            return Err(format!("failed to write to stdout: {e}"));
        }
        println!();
        println!();
        print!("{}", formatter::format_query_section(&outcome));
        outcomes.push(outcome);
    }

    Ok(exit_code(&outcomes))
}

#[cfg(feature = "db")]
fn build_engine(settings: &Settings) -> Option<Box<dyn SqlEngine>> {
    if settings.dry_run {
        return None;
    }
    Some(Box::new(chat2sql::executor::postgres::PostgresEngine::new(
        settings.database_url.clone(),
    )))
}

#[cfg(not(feature = "db"))]
fn build_engine(_settings: &Settings) -> Option<Box<dyn SqlEngine>> {
    tracing::debug!("built without the `db` feature; queries are compiled only");
    None
}

fn exit_code(outcomes: &[TurnOutcome]) -> ExitCode {
    if outcomes.iter().all(TurnOutcome::is_success) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
