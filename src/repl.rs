// File: src/repl.rs
//
// Interactive REPL (Read-Eval-Print Loop) for the yy language.
// Provides an interactive shell with:
// - Multi-line input support for functions, loops, and yolo blocks
// - Command history with up/down arrow navigation
// - Special commands (:help, :clear, :reset, :quit)
// - Persistent interpreter state across inputs

use crate::interpreter::value::Value;
use crate::interpreter::{Interpreter, DEFAULT_FUEL};
use crate::parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// REPL session holding the line editor and a persistent interpreter
pub struct Repl {
    interpreter: Interpreter<'static>,
    editor: DefaultEditor,
}

fn stdout_sink(text: &str) {
    print!("{}", text);
}

impl Repl {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let editor = DefaultEditor::new()?;
        Ok(Repl { interpreter: Interpreter::new(stdout_sink), editor })
    }

    fn show_banner(&self) {
        println!("{}", format!("yy {} - interactive shell", env!("CARGO_PKG_VERSION")).bright_cyan());
        println!(
            "  {} {} for commands, {} or Ctrl+D to leave",
            "Use".bright_blue(),
            ":help".bright_yellow(),
            ":quit".bright_yellow()
        );
        println!("  {} End a line with unclosed braces to keep typing", "Tip:".bright_magenta());
        println!();
    }

    /// Starts the REPL loop
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.show_banner();

        let mut buffer = String::new();

        loop {
            let prompt = if buffer.is_empty() {
                "yy> ".bright_green().to_string()
            } else {
                "..> ".bright_blue().to_string()
            };

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let _ = self.editor.add_history_entry(line.as_str());

                    if buffer.is_empty() && line.trim().starts_with(':') {
                        if self.handle_command(line.trim()) {
                            continue;
                        }
                        break;
                    }

                    buffer.push_str(&line);
                    buffer.push('\n');

                    if is_input_complete(&buffer) {
                        self.eval_input(&buffer);
                        buffer.clear();
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C (input discarded, :quit to exit)".bright_yellow());
                    buffer.clear();
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "bye!".bright_cyan());
                    break;
                }
                Err(err) => {
                    eprintln!("{} {}", "Error:".bright_red(), err);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Returns true to continue the loop, false on :quit
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":help" | ":h" => {
                self.show_help();
                true
            }
            ":quit" | ":q" | ":exit" => {
                println!("{}", "bye!".bright_cyan());
                false
            }
            ":clear" | ":c" => {
                print!("\x1B[2J\x1B[1;1H");
                self.show_banner();
                true
            }
            ":reset" | ":r" => {
                self.interpreter = Interpreter::new(stdout_sink);
                println!("{}", "environment reset".bright_green());
                true
            }
            _ => {
                println!(
                    "{} unknown command {}, type {} for the list",
                    "Error:".bright_red(),
                    cmd.bright_yellow(),
                    ":help".bright_yellow()
                );
                true
            }
        }
    }

    fn show_help(&self) {
        println!();
        println!("{}", "Commands:".bright_cyan().bold());
        println!("  {}   this message", ":help".bright_yellow());
        println!("  {}  wipe the screen", ":clear".bright_yellow());
        println!("  {}  start over with a fresh environment", ":reset".bright_yellow());
        println!("  {}   leave", ":quit".bright_yellow());
        println!();
        println!("{}", "Multi-line input:".bright_cyan().bold());
        println!("  Leave braces, brackets or parentheses unclosed to continue");
        println!("  on the next line.");
        println!();
        println!("  {}", "yy> greet := \\name {".dimmed());
        println!("  {}", "..>     yap(\"hi {name}\")".dimmed());
        println!("  {}", "..> }".dimmed());
        println!("  {}", "yy> greet(\"world\")".dimmed());
        println!();
    }

    fn eval_input(&mut self, input: &str) {
        if input.trim().is_empty() {
            return;
        }

        let program = match parser::parse_source(input) {
            Ok(program) => program,
            Err(err) => {
                println!("{}", err.with_source_text(input));
                return;
            }
        };

        // Each input gets a fresh budget so one runaway loop doesn't
        // poison the rest of the session
        self.interpreter.refuel(DEFAULT_FUEL);

        match self.interpreter.run(&program) {
            Ok(value) => self.print_value(&value),
            Err(err) => println!("{}", err.with_source_text(input)),
        }
    }

    fn print_value(&self, value: &Value) {
        let arrow = "=>".bright_blue();
        match value {
            Value::Null => {}
            Value::Str(s) => println!("{} {}", arrow, format!("\"{}\"", s).bright_green()),
            Value::Bool(_) => println!("{} {}", arrow, value.render().bright_magenta()),
            Value::Number(_) => println!("{} {}", arrow, value.render().bright_white()),
            Value::Function(_) | Value::Native(_) => {
                println!("{} {}", arrow, value.render().bright_cyan())
            }
            other => println!("{} {}", arrow, other.render().bright_white()),
        }
    }
}

/// True when every brace, bracket and parenthesis outside strings and
/// comments is balanced
fn is_input_complete(input: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;
    let mut prev = '\0';
    let mut in_comment = false;

    for ch in input.chars() {
        if in_comment {
            if ch == '\n' {
                in_comment = false;
            }
            prev = ch;
            continue;
        }
        if escape_next {
            escape_next = false;
            prev = ch;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '/' if !in_string && prev == '/' => in_comment = true,
            '{' | '[' | '(' if !in_string => depth += 1,
            '}' | ']' | ')' if !in_string => depth -= 1,
            _ => {}
        }
        prev = ch;
    }

    !in_string && depth <= 0
}
