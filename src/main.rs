//! ion CLI: run a script, evaluate a string, or start the REPL.

use std::env;
use std::fs;
use std::process;

use colored::Colorize;

use ionlang::config::{EngineConfig, Prelude};
use ionlang::error::IonError;
use ionlang::interpreter::Interpreter;
use ionlang::repl::Repl;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI command to execute.
enum Command {
    /// Run a script file
    Run { file: String },
    /// Evaluate a string
    Eval { code: String },
    /// Start the REPL
    Repl,
}

/// CLI options parsed from arguments.
struct Options {
    command: Command,
    config: EngineConfig,
    disassemble: bool,
}

fn print_usage() {
    eprintln!("ion {} - bytecode interpreter", VERSION);
    eprintln!();
    eprintln!("Usage: ion [options] [script]");
    eprintln!("       ion [options] -e <code>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -e <code>            Evaluate code and print the result");
    eprintln!("  --disassemble        Print bytecode for each compiled unit");
    eprintln!("  --trace              Trace every executed instruction");
    eprintln!("  --strict-conditions  Non-boolean conditions raise a type error");
    eprintln!("  --core-prelude       Start with the core globals only");
    eprintln!("  --version, -v        Show version");
    eprintln!("  --help, -h           Show this help message");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ION_TRACE, ION_STRICT_CONDITIONS, ION_MAX_STACK, ION_MAX_CALL_DEPTH");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  ion                           Start interactive REPL");
    eprintln!("  ion script.ion                Run a script file");
    eprintln!("  ion -e '(print (add 1 2))'    Evaluate code directly");
}

fn parse_args() -> Options {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut options = Options {
        command: Command::Repl,
        config: EngineConfig::from_env(),
        disassemble: false,
    };

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "--version" | "-v" => {
                println!("ion {}", VERSION);
                process::exit(0);
            }
            "--disassemble" => options.disassemble = true,
            "--trace" => options.config.trace = true,
            "--strict-conditions" => options.config.strict_conditions = true,
            "--core-prelude" => options.config.prelude = Prelude::Core,
            "-e" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("-e requires a code argument");
                    print_usage();
                    process::exit(64);
                }
                options.command = Command::Eval {
                    code: args[i].clone(),
                };
            }
            _ if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                print_usage();
                process::exit(64);
            }
            _ => {
                if let Command::Run { .. } = options.command {
                    eprintln!("Only one script file can be specified");
                    print_usage();
                    process::exit(64);
                }
                options.command = Command::Run { file: arg.clone() };
            }
        }
        i += 1;
    }

    options
}

fn main() {
    let options = parse_args();

    match &options.command {
        Command::Repl => run_repl(&options),
        Command::Run { file } => run_file(file, &options),
        Command::Eval { code } => run_eval(code, &options),
    }
}

fn session(options: &Options) -> Interpreter {
    let mut interpreter = Interpreter::with_config(options.config.clone());
    interpreter.set_disassemble(options.disassemble);
    interpreter
}

fn fail(e: IonError) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), e);
    process::exit(e.exit_code());
}

fn run_file(path: &str, options: &Options) {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => fail(e.into()),
    };
    if let Err(e) = session(options).eval(&source) {
        fail(e);
    }
}

fn run_eval(code: &str, options: &Options) {
    match session(options).eval(code) {
        Ok(value) => println!("{}", value),
        Err(e) => fail(e),
    }
}

fn run_repl(options: &Options) {
    let mut repl = Repl::new(options.config.clone());
    repl.set_disassemble(options.disassemble);
    repl.run();
}
