//! Calc API Server binary
//!
//! HTTP REST API for spreadsheet-style formula evaluation.

use clap::Parser;
use spreadsheet_calc::api::{run_api_server, ApiConfig};
use spreadsheet_calc::{CalcConfig, Calculator};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "calc-server")]
#[command(version)]
#[command(about = "Calc API Server - HTTP REST API for formula evaluation")]
#[command(long_about = r#"
Calc API Server - HTTP REST API for formula evaluation

Endpoints:
  - POST /api/v1/evaluate  - Evaluate a formula against context data
  - POST /api/v1/check     - Parse a formula without evaluating it
  - GET  /api/v1/functions - List the function library
  - GET  /health           - Health check
  - GET  /version          - Server version and evaluator settings
  - GET  /                 - API documentation

Example usage:
  calc-server                                  # Start on localhost:8080
  calc-server --host 0.0.0.0 --port 3000 --timezone Europe/Berlin

  curl -X POST http://localhost:8080/api/v1/evaluate \
    -H "Content-Type: application/json" \
    -d '{"expression": "price * qty", "local": {"price": "10,99", "qty": 3}}'
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "CALC_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "CALC_PORT")]
    port: u16,

    /// YAML configuration file (number format, default timezone)
    #[arg(short, long, env = "CALC_CONFIG")]
    config: Option<PathBuf>,

    /// Default timezone for date functions, overrides the config file
    #[arg(short, long, env = "CALC_TIMEZONE")]
    timezone: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut calc_config = match &args.config {
        Some(path) => CalcConfig::from_yaml_file(path)?,
        None => CalcConfig::default(),
    };
    if let Some(timezone) = args.timezone {
        calc_config = calc_config.with_timezone(timezone);
    }
    let calculator = Calculator::with_config(calc_config)?;

    let config = ApiConfig {
        host: args.host,
        port: args.port,
    };

    run_api_server(config, calculator).await
}
