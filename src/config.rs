use crate::cli::{Args, ColorChoice};
use crate::interpreter::InterpreterConfig;
use std::path::PathBuf;

pub struct AppConfig {
    pub color_enabled: bool,
    pub verbose: bool,
    /// `None` when history is disabled.
    pub history: Option<PathBuf>,
    pub interpreter: InterpreterConfig,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Self {
        let color_enabled = match args.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => atty::is(atty::Stream::Stderr) && atty::is(atty::Stream::Stdout),
        };

        AppConfig {
            color_enabled,
            verbose: args.verbose,
            history: (!args.no_history).then(|| args.history.clone()),
            interpreter: InterpreterConfig { max_depth: args.max_depth },
        }
    }

    /// Filter directive used when `ARCHSCRIPT_LOG` is not set.
    pub fn default_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}
