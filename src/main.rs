use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::{Builder, Env};
use log::{debug, info};
use memmap2::Mmap;

use rox::ast_printer::AstPrinter;
use rox::parser::Parser;
use rox::scanner::{scan, ScanOutput};
use rox::{Interpreter, LoxError, Session};

/// Exit status for malformed command lines.
const EXIT_USAGE: i32 = 64;
/// Exit status for lexing and syntax errors.
const EXIT_DATA: i32 = 65;
/// Exit status for runtime errors.
const EXIT_SOFTWARE: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to rox.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the token stream as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Parses a Lox program and prints each statement's AST
    Parse { filename: PathBuf },

    /// Evaluates a file holding a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs a Lox program; starts a REPL when no file is given
    Run { filename: Option<PathBuf> },
}

/// Maps the script into memory and checks that it is UTF‑8.
fn read_source(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let file: File =
        File::open(filename).with_context(|| format!("Failed to open file {:?}", filename))?;

    let len: u64 = file
        .metadata()
        .with_context(|| format!("Failed to stat file {:?}", filename))?
        .len();

    // Zero-length files cannot be mapped on every platform.
    if len == 0 {
        info!("{:?} is empty", filename);
        return Ok(String::new());
    }

    // SAFETY: the mapping is copied into an owned String and dropped here.
    let mmap: Mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to map file {:?}", filename))?;

    let source: &str = std::str::from_utf8(&mmap)
        .with_context(|| format!("File {:?} is not valid UTF-8", filename))?;

    info!("Read {} bytes from {:?}", source.len(), filename);

    Ok(source.to_owned())
}

fn init_logger(to_file: bool) -> Result<()> {
    if !to_file {
        // Silent unless RUST_LOG says otherwise.
        Builder::from_env(Env::default().default_filter_or("off")).init();
        return Ok(());
    }

    let log_file: File = File::create("rox.log").context("Failed to create rox.log")?;

    Builder::from_env(Env::default().default_filter_or("debug"))
        .format(|buf, record| {
            let module_path: &str = record.module_path().unwrap_or("<unnamed>");
            let module: &str = module_path.strip_prefix("rox::").unwrap_or(module_path);

            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    info!("Logger initialized, writing to rox.log");

    Ok(())
}

fn report(errors: &[LoxError]) {
    for e in errors {
        debug!("Reporting error on line {:?}: {}", e.line(), e.message());
        eprintln!("{}", e);
    }
}

/// Exit status for a failed run: runtime failures win over syntax ones.
fn exit_code(errors: &[LoxError]) -> i32 {
    if errors.iter().any(LoxError::is_runtime) {
        EXIT_SOFTWARE
    } else {
        EXIT_DATA
    }
}

fn tokenize(filename: &Path, json: bool) -> Result<i32> {
    info!("Running Tokenize subcommand");

    let source: String = read_source(filename)?;
    let ScanOutput { tokens, errors } = scan(&source);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&tokens).context("Failed to serialize tokens")?
        );
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    report(&errors);

    Ok(if errors.is_empty() { 0 } else { EXIT_DATA })
}

fn parse(filename: &Path) -> Result<i32> {
    info!("Running Parse subcommand");

    let source: String = read_source(filename)?;
    let ScanOutput { tokens, errors } = scan(&source);

    if !errors.is_empty() {
        report(&errors);
        return Ok(EXIT_DATA);
    }

    let mut failed: bool = false;

    for result in Parser::new(&tokens) {
        match result {
            Ok(stmt) => {
                let printed: String = AstPrinter::print_stmt(&stmt);
                debug!("AST: {}", printed);
                println!("{}", printed);
            }
            Err(e) => {
                failed = true;
                report(&[e]);
            }
        }
    }

    Ok(if failed { EXIT_DATA } else { 0 })
}

fn evaluate(filename: &Path) -> Result<i32> {
    info!("Running Evaluate subcommand");

    let source: String = read_source(filename)?;
    let ScanOutput { tokens, errors } = scan(&source);

    if !errors.is_empty() {
        report(&errors);
        return Ok(EXIT_DATA);
    }

    let expr = match Parser::new(&tokens).parse_expression() {
        Ok(expr) => expr,
        Err(e) => {
            report(&[e]);
            return Ok(EXIT_DATA);
        }
    };

    match Interpreter::new().evaluate(&expr) {
        Ok(value) => {
            debug!("Evaluated to: {}", value);
            println!("{}", value);
            Ok(0)
        }
        Err(e) => {
            report(&[e]);
            Ok(EXIT_SOFTWARE)
        }
    }
}

fn run_file(filename: &Path) -> Result<i32> {
    info!("Running Run subcommand");

    let source: String = read_source(filename)?;
    let mut session: Session = Session::new();

    match session.run(&source) {
        Ok(()) => {
            info!("Program executed successfully");
            Ok(0)
        }
        Err(errors) => {
            report(&errors);
            Ok(exit_code(&errors))
        }
    }
}

/// Line-at-a-time prompt over one session. Errors are reported and the
/// loop continues; end of input leaves it.
fn run_prompt() -> Result<i32> {
    info!("Starting REPL");

    let mut session: Session = Session::new();
    let stdin = io::stdin();
    let mut line: String = String::new();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush stdout")?;

        line.clear();
        let read: usize = stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;

        if read == 0 {
            println!();
            break;
        }

        let trimmed: &str = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Err(errors) = session.run(trimmed) {
            report(&errors);
        }
    }

    info!("REPL finished");

    Ok(0)
}

fn main() -> Result<()> {
    let args: Cli = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            eprint!("{}", e);
            std::process::exit(EXIT_USAGE);
        }
        // --help / --version
        Err(e) => e.exit(),
    };

    init_logger(args.log)?;

    info!("CLI arguments: {:?}", args);

    let code: i32 = match &args.commands {
        Commands::Tokenize { filename, json } => tokenize(filename, *json)?,
        Commands::Parse { filename } => parse(filename)?,
        Commands::Evaluate { filename } => evaluate(filename)?,
        Commands::Run {
            filename: Some(filename),
        } => run_file(filename)?,
        Commands::Run { filename: None } => run_prompt()?,
    };

    if code != 0 {
        debug!("Exiting with code {}", code);
        std::process::exit(code);
    }

    Ok(())
}
