// terminus-cli/src/main.rs

//! Interactive front end: a small REPL (or one-shot runner) that drives the
//! terminus-core tool surface with a single session.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;
use tracing_subscriber::EnvFilter;

use terminus_core::tools::shell::{get_working_directory, run_command};
use terminus_core::{CommandResult, Session, TerminalConfig};

const CONFIG_FILENAME: &str = "Terminus.toml";

#[derive(Parser, Debug)]
#[command(name = "terminus", version, about = "Session-aware terminal tool runner")]
struct Cli {
    /// Run a single command and exit instead of starting the REPL.
    #[arg(short = 'c', long = "command")]
    command: Option<String>,

    /// Override the configured command timeout, in seconds.
    #[arg(long)]
    timeout: Option<u64>,
}

fn find_config_file() -> Option<PathBuf> {
    let mut current = env::current_dir().ok()?;
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

fn load_config(cli: &Cli) -> Result<TerminalConfig> {
    let mut config = match find_config_file() {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config = TerminalConfig::from_toml_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            info!(config_path = ?path, "Loaded configuration");
            config
        }
        None => TerminalConfig::default(),
    };
    if let Some(timeout) = cli.timeout {
        ensure!(timeout > 0, "--timeout must be greater than zero");
        config.command_timeout_secs = timeout;
    }
    Ok(config)
}

fn print_result(result: &CommandResult) {
    if !result.stdout.is_empty() {
        println!("{}", result.stdout.trim_end());
    }
    if result.success {
        if !result.stderr.is_empty() {
            eprintln!("{}", result.stderr.trim_end().yellow());
        }
    } else {
        eprintln!(
            "{} {} (Return code: {})",
            "Error:".red().bold(),
            result.stderr.trim_end(),
            result.returncode
        );
    }
}

async fn repl(session: &Session, config: &TerminalConfig) -> Result<()> {
    let mut editor = DefaultEditor::new().context("Failed to initialize line editor")?;
    println!("{}", "Terminus - interactive terminal session".cyan().bold());
    println!("Type 'exit' or press Ctrl-D to quit.\n");

    loop {
        let prompt = format!("{} $ ", get_working_directory(session).display());
        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    break;
                }
                let _ = editor.add_history_entry(line);
                let result = run_command(session, config, line).await;
                print_result(&result);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input line"),
        }
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;
    let session = Session::new().context("Failed to resolve current working directory")?;

    if let Some(command) = cli.command.as_deref() {
        let result = run_command(&session, &config, command).await;
        print_result(&result);
        let code = if result.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(result.returncode.clamp(1, 255) as u8)
        };
        return Ok(code);
    }

    repl(&session, &config).await?;
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
