//! console_demo - drive the command console against a small scene
//!
//! Without flags an interactive shell starts; `--exec`, `--predict` and
//! `--list` run in batch mode and exit.

mod scene;
mod usercode;

use std::process::ExitCode;

use clap::Parser;
use console_config::{INCLUDE_PRIVATE, INTERACTIVE, MAX_CANDIDATES, PROMPT};
use console_core::{Console, ConsoleOptions, ExecutionContext};
use console_shell::{DefaultShell, default_history};
use tracing::info;
use tracing_subscriber::EnvFilter;

use scene::Scene;

#[derive(Parser, Debug)]
#[command(name = "console_demo")]
#[command(version)]
#[command(about = "Embeddable command console demo")]
#[command(after_help = "\
EXAMPLES:
    console_demo                                   Interactive shell
    console_demo -e 'call add 2 3'                 Run one line and exit
    console_demo -e '##Enemy call damage 5' -e '@@Grunt get points'
    console_demo -p '@Play'                        Show completions
    console_demo --list                            Show every command

Set RUST_LOG=console_core=debug to trace cache builds and dispatch.")]
struct Cli {
    /// Execute a command line (repeatable)
    #[arg(short, long = "exec", value_name = "LINE")]
    exec: Vec<String>,

    /// Print completions and the argument hint for a partial line
    #[arg(short, long, value_name = "PARTIAL")]
    predict: Option<String>,

    /// Register non-public members as commands too
    #[arg(long)]
    include_private: bool,

    /// Run without a selection (`select` is rejected)
    #[arg(long)]
    runtime: bool,

    /// List every command with its type information
    #[arg(short, long)]
    list: bool,
}

impl Cli {
    fn options(&self) -> ConsoleOptions {
        let context = if self.runtime || !INTERACTIVE { ExecutionContext::Runtime } else { ExecutionContext::Interactive };
        ConsoleOptions { include_private: self.include_private || INCLUDE_PRIVATE, context, max_candidates: MAX_CANDIDATES }
    }

    fn is_batch(&self) -> bool {
        !self.exec.is_empty() || self.predict.is_some() || self.list
    }
}

fn list(console: &Console<'_>) {
    let names = console.all_command_names();
    let width = names.iter().map(String::len).max().unwrap_or(0);
    for name in &names {
        let info = console.command_type_info(name).unwrap_or_default();
        println!("{name:>width$} : {info}");
    }
}

fn predict(console: &Console<'_>, partial: &str) {
    for candidate in console.predict(partial) {
        println!("{candidate}");
    }
    if let Some(hint) = console.hint(partial) {
        println!("<{hint}>");
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let scene = Scene::demo();
    let console = Console::new(console_core::global(), &scene, cli.options());
    let cache = console.rebuild(&usercode::universe());
    info!(commands = cache.total_count(), "console ready");

    if cli.list {
        list(&console);
    }
    if let Some(partial) = &cli.predict {
        predict(&console, partial);
    }
    for line in &cli.exec {
        println!("{}", console.execute_command(line));
    }
    if cli.is_batch() {
        return ExitCode::SUCCESS;
    }

    println!("Type #? for help, #q to quit.");
    let mut shell = DefaultShell::with_history(&console, PROMPT, default_history());
    match shell.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("terminal error: {err}");
            ExitCode::FAILURE
        }
    }
}

// ================= TESTS ==========================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_map_to_options() {
        let cli = Cli::parse_from(["console_demo", "--runtime", "--include-private", "-e", "call restart", "-e", "get version"]);
        let options = cli.options();
        assert_eq!(options.context, ExecutionContext::Runtime);
        assert!(options.include_private);
        assert_eq!(cli.exec, vec!["call restart", "get version"]);
        assert!(cli.is_batch());

        let interactive = Cli::parse_from(["console_demo"]);
        assert!(!interactive.is_batch());
        assert_eq!(interactive.options().context, ExecutionContext::Interactive);
    }
}
