use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use funk::Program;
use funk::ast::printer;
use funk::interpreter::{DEFAULT_MAX_CALL_DEPTH, Interpreter, InterpreterConfig};

#[derive(Parser, Debug)]
#[command(name = "funk", about = "Evaluate Funk programs supplied as JSON syntax trees")]
struct Cli {
    /// JSON program to run (reads stdin when omitted)
    file: Option<PathBuf>,

    /// Dump AST and exit
    #[arg(long)]
    dump_ast: bool,

    /// AST output format
    #[arg(long, default_value = "sexp", value_parser = ["sexp", "json"])]
    ast_format: String,

    /// Stop with an error after this many top-level statements
    #[arg(long, value_name = "N")]
    step_limit: Option<usize>,

    /// Maximum nesting depth of function calls
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,

    /// Log evaluator activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "funk=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_program(cli: &Cli) -> Result<Program> {
    let text = match &cli.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read program file '{}'", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read program from stdin")?;
            buf
        }
    };
    serde_json::from_str(&text).context("decode program JSON")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let program = read_program(&cli)?;

    if cli.dump_ast {
        match cli.ast_format.as_str() {
            "json" => println!("{}", printer::to_json(&program).context("encode AST as JSON")?),
            _ => print!("{}", printer::to_sexp(&program)),
        }
        return Ok(());
    }

    let config = InterpreterConfig {
        step_limit: cli.step_limit,
        max_call_depth: cli.max_call_depth,
        capture_output: false,
    };
    let mut interpreter = Interpreter::with_config(config);
    if let Err(e) = interpreter.interpret(&program) {
        eprintln!("{:?}", miette::Report::new(e));
        bail!("program halted with an error");
    }
    Ok(())
}
