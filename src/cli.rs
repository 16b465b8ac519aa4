use crate::interpreter::DEFAULT_MAX_DEPTH;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "archscript")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "ArchScript interpreter: evaluate one expression or start an interactive session", long_about = None)]
pub struct Args {
    /// Source to evaluate once; without it an interactive session starts.
    #[arg(value_name = "SOURCE")]
    pub source: Option<String>,

    #[arg(long = "color", value_name = "WHEN", value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[arg(long = "history", value_name = "FILE", default_value = ".archscript_history")]
    pub history: PathBuf,

    #[arg(long = "no-history", conflicts_with = "history")]
    pub no_history: bool,

    /// Nesting limit for expression evaluation.
    #[arg(long = "max-depth", value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a shell completion script.
    Complete {
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

/// When to color error output.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChoice {
    /// Color when both stdout and stderr are terminals.
    Auto,
    Always,
    Never,
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Args::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, &bin_name, &mut io::stdout());
}
