use owo_colors::OwoColorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::interpreter::{Continuation, Interpreter};

const PROMPT: &str = "> ";

/// Interactive loop: one line in, its value (or error) out.
pub struct Repl {
    interpreter: Interpreter,
    editor: DefaultEditor,
    history: Option<PathBuf>,
    color_enabled: bool,
}

/// Supplies the parser with further lines while a form is still open.
struct EditorContinuation<'a> {
    editor: &'a mut DefaultEditor,
}

impl Continuation for EditorContinuation<'_> {
    fn more_input(&mut self, prompt: &str) -> Option<String> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                self.editor.add_history_entry(line.as_str()).ok();
                Some(line)
            }
            Err(_) => None,
        }
    }
}

impl Repl {
    pub fn new(config: &AppConfig) -> rustyline::Result<Self> {
        let mut editor = DefaultEditor::new()?;
        if let Some(path) = &config.history {
            if editor.load_history(path).is_err() {
                tracing::debug!(path = %path.display(), "no history loaded");
            }
        }
        Ok(Repl {
            interpreter: Interpreter::with_config(config.interpreter),
            editor,
            history: config.history.clone(),
            color_enabled: config.color_enabled,
        })
    }

    pub fn run(&mut self) {
        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    if let Err(err) = self.editor.add_history_entry(line.as_str()) {
                        print_error(self.color_enabled, &format!("Error adding to history: {}", err));
                    }

                    let mut more = EditorContinuation { editor: &mut self.editor };
                    match self.interpreter.eval_interactive(&line, &mut more) {
                        Ok(value) => println!("{}", value),
                        Err(err) => print_error(self.color_enabled, &err.to_string()),
                    }
                    self.save_history();
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    print_error(self.color_enabled, &format!("Error reading input: {}", err));
                    break;
                }
            }
        }
    }

    fn save_history(&mut self) {
        if let Some(path) = &self.history {
            if let Err(err) = self.editor.save_history(path) {
                print_error(self.color_enabled, &format!("Error saving history: {}", err));
            }
        }
    }
}

/// Errors go to stderr, red and bold when color is enabled.
pub fn print_error(color_enabled: bool, message: &str) {
    if color_enabled {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
