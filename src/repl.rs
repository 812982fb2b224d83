//! Line-oriented REPL.
//!
//! Each complete input is compiled onto the session's chunk and only the new
//! instructions run. Errors are reported and the loop carries on. Input with
//! unclosed brackets continues on the next line.

use std::io::{self, Write};
use std::path::PathBuf;

use colored::Colorize;

use crate::config::EngineConfig;
use crate::interpreter::{Interpreter, Value};
use crate::vm::disassemble;

const HISTORY_FILE: &str = ".ion_history";

pub struct Repl {
    interpreter: Interpreter,
    config: EngineConfig,
    history: Vec<String>,
    history_file: PathBuf,
    buffer: String,
    brackets: BracketBalance,
}

impl Repl {
    pub fn new(config: EngineConfig) -> Self {
        let mut repl = Self {
            interpreter: Interpreter::with_config(config.clone()),
            config,
            history: Vec::new(),
            history_file: Self::history_path(),
            buffer: String::new(),
            brackets: BracketBalance::default(),
        };
        repl.load_history();
        repl
    }

    /// Mirror the CLI's `--disassemble` in the session.
    pub fn set_disassemble(&mut self, on: bool) {
        self.interpreter.set_disassemble(on);
    }

    fn history_path() -> PathBuf {
        if let Some(home) = dirs::home_dir() {
            home.join(HISTORY_FILE)
        } else {
            PathBuf::from(HISTORY_FILE)
        }
    }

    fn load_history(&mut self) {
        if let Ok(content) = std::fs::read_to_string(&self.history_file) {
            self.history.extend(
                content
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(str::to_string),
            );
        }
    }

    fn save_history(&self) {
        let _ = std::fs::write(&self.history_file, self.history.join("\n"));
    }

    pub fn run(&mut self) {
        println!("ion {} - REPL", env!("CARGO_PKG_VERSION"));
        println!("Type .help for available commands.\n");

        let stdin = io::stdin();
        loop {
            print!("{}", self.prompt());
            let _ = io::stdout().flush();

            let mut line = String::new();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => {
                    self.save_history();
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {
                    let line = line.trim_end();
                    if self.buffer.is_empty() {
                        if line.trim().is_empty() {
                            continue;
                        }
                        if line == ".exit" || line == ".quit" {
                            self.history.push(line.to_string());
                            self.save_history();
                            println!("Goodbye!");
                            break;
                        }
                        if line.starts_with('.') {
                            self.history.push(line.to_string());
                            self.handle_command(line);
                            continue;
                        }
                    }
                    self.handle_input(line);
                }
            }
        }
    }

    fn prompt(&self) -> &'static str {
        if self.buffer.is_empty() {
            "ion> "
        } else {
            " ... "
        }
    }

    fn handle_input(&mut self, line: &str) {
        if !self.buffer.is_empty() && (line == ".break" || line == ".cancel") {
            self.buffer.clear();
            self.brackets = BracketBalance::default();
            println!("(cancelled)");
            return;
        }

        self.history.push(line.to_string());
        self.buffer.push_str(line);
        self.buffer.push('\n');
        self.brackets.feed(line);

        if self.brackets.is_open() {
            return;
        }

        let code = std::mem::take(&mut self.buffer);
        self.brackets = BracketBalance::default();
        self.execute(&code);
    }

    fn execute(&mut self, code: &str) {
        match self.interpreter.eval(code) {
            Ok(Value::None) => {}
            Ok(value) => println!("{} {}", "=>".dimmed(), value),
            Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
        }
    }

    fn handle_command(&mut self, line: &str) {
        match line {
            ".help" => self.cmd_help(),
            ".vars" => self.cmd_vars(),
            ".dis" => print!("{}", disassemble(self.interpreter.chunk())),
            ".history" => self.cmd_history(),
            ".clear" => {
                self.interpreter = Interpreter::with_config(self.config.clone());
                println!("Environment reset.");
            }
            ".break" | ".cancel" => println!("Not in multi-line mode."),
            _ if line.starts_with(".load ") => {
                let path = line[".load ".len()..].trim();
                self.cmd_load(path);
            }
            _ => println!(
                "Unknown command: {}. Type .help for available commands.",
                line
            ),
        }
    }

    fn cmd_help(&self) {
        println!();
        println!("REPL Commands");
        println!();
        println!(".help          - Show this help message");
        println!(".vars          - List global bindings");
        println!(".dis           - Disassemble all compiled bytecode");
        println!(".history       - Show input history");
        println!(".clear         - Reset the session");
        println!(".break         - Cancel multi-line input");
        println!(".load <file>   - Load and execute a file");
        println!(".exit / Ctrl+D - Exit the REPL");
        println!();
    }

    fn cmd_vars(&self) {
        let globals = self.interpreter.globals();
        if globals.is_empty() {
            println!("No variables defined.");
            return;
        }
        println!("Variables:");
        for (key, value) in globals.iter() {
            let name = key.as_str().map(str::to_string).unwrap_or_else(|| key.to_string());
            println!("  {} = {}", name.cyan(), value);
        }
    }

    fn cmd_history(&self) {
        println!("History:");
        for (i, entry) in self.history.iter().enumerate() {
            println!("{:4}  {}", i + 1, entry);
        }
    }

    fn cmd_load(&mut self, path: &str) {
        match std::fs::read_to_string(path) {
            Ok(content) => self.execute(&content),
            Err(e) => eprintln!("{} could not read {}: {}", "Error:".red().bold(), path, e),
        }
    }
}

/// Opens minus closes over the lines of one input, ignoring brackets inside
/// string literals. A literal may span lines.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BracketBalance {
    depth: i32,
    in_string: bool,
}

impl BracketBalance {
    pub fn feed(&mut self, line: &str) {
        for c in line.chars() {
            match c {
                '"' => self.in_string = !self.in_string,
                '(' | '[' | '{' if !self.in_string => self.depth += 1,
                ')' | ']' | '}' if !self.in_string => self.depth -= 1,
                _ => {}
            }
        }
    }

    /// Whether more lines are needed before the input can be compiled.
    pub fn is_open(&self) -> bool {
        self.in_string || self.depth > 0
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }
}
