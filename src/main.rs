use archscript::cli::{generate_completions, Args, Commands};
use archscript::config::AppConfig;
use archscript::repl::{print_error, Repl};
use archscript::Interpreter;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return;
    }

    let config = AppConfig::from_args(&args);
    init_tracing(&config);

    match &args.source {
        Some(source) => run_once(source, &config),
        None => match Repl::new(&config) {
            Ok(mut repl) => repl.run(),
            Err(err) => {
                print_error(config.color_enabled, &format!("Cannot start line editor: {}", err));
                std::process::exit(1);
            }
        },
    }
}

/// `ARCHSCRIPT_LOG` takes precedence over the level implied by `--verbose`.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_env("ARCHSCRIPT_LOG").unwrap_or_else(|_| EnvFilter::new(config.default_log_level()));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(config.color_enabled)
                .with_target(true),
        )
        .with(filter)
        .init();
}

fn run_once(source: &str, config: &AppConfig) {
    tracing::debug!(source, "one-shot evaluation");
    let mut interpreter = Interpreter::with_config(config.interpreter);
    match interpreter.eval_source(source) {
        Ok(value) => println!("{}", value),
        Err(err) => {
            print_error(config.color_enabled, &err.to_string());
            std::process::exit(1);
        }
    }
}
