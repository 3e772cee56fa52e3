use clap::{Parser, Subcommand};
use colored::Colorize;
use spreadsheet_calc::cli::{self, EvalOptions};
use spreadsheet_calc::error::CalcResult;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "calc")]
#[command(about = "Evaluate spreadsheet-style formulas against JSON/YAML data")]
#[command(long_about = "calc - Spreadsheet-style formula evaluator

Numeric text in the data is read with a locale convention
(European by default: '1.234,56' is 1234.56) and dates are parsed
from ISO 8601, German, European, US and Asian layouts.

COMMANDS:
  eval        - Evaluate an expression
  check       - Parse expressions without evaluating them
  functions   - List the function library

EXAMPLES:
  calc eval \"price * qty\" --arg price=10,99 --arg qty=3
  calc eval \"order.items[0].price + tax\" --local order.json --arg tax=12.5
  calc eval \"DATEADD(start, 2, 'months')\" --arg start=15.06.2025
  calc eval \"TODAY('Europe/Helsinki')\"
  calc check \"SUM(a, b)\" \"ROUND(x,\"")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression and print the result
    Eval {
        /// Formula to evaluate
        expression: String,

        /// Root context file (JSON, or YAML by .yaml/.yml extension)
        #[arg(short, long)]
        context: Option<PathBuf>,

        /// Local context file, overrides the root context
        #[arg(short, long)]
        local: Option<PathBuf>,

        /// Named argument KEY=VALUE (VALUE is JSON when it parses, else text)
        #[arg(short, long = "arg", value_name = "KEY=VALUE")]
        args: Vec<String>,

        /// Result to print when evaluation fails
        #[arg(short, long)]
        default: Option<String>,

        /// Default timezone for date functions
        #[arg(short, long, env = "CALC_TIMEZONE")]
        timezone: Option<String>,

        /// YAML configuration file
        #[arg(long, env = "CALC_CONFIG")]
        config: Option<PathBuf>,

        /// Print {"result": ...} instead of the bare value
        #[arg(long)]
        json: bool,

        /// Show inputs before evaluating
        #[arg(short, long)]
        verbose: bool,
    },

    /// Parse expressions and report syntax errors
    Check {
        /// Formulas to check
        #[arg(required = true)]
        expressions: Vec<String>,
    },

    /// List available functions
    Functions,
}

fn run(cli: Cli) -> CalcResult<()> {
    match cli.command {
        Commands::Eval {
            expression,
            context,
            local,
            args,
            default,
            timezone,
            config,
            json,
            verbose,
        } => cli::eval(
            expression,
            EvalOptions {
                context,
                local,
                args,
                default,
                timezone,
                config,
                json,
                verbose,
            },
        ),

        Commands::Check { expressions } => cli::check(expressions),

        Commands::Functions => cli::functions(),
    }
}

fn main() {
    let cli = Cli::parse();

    // --verbose shows the evaluator's own debug events
    let verbose = matches!(cli.command, Commands::Eval { verbose: true, .. });
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("spreadsheet_calc=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "spreadsheet_calc=warn".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{}", format!("calc: {e}").red());
        std::process::exit(1);
    }
}
