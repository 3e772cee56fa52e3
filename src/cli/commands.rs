use crate::config::CalcConfig;
use crate::core::functions::{FunctionCategory, FunctionLibrary};
use crate::core::{CalcInput, Calculator};
use crate::error::{CalcError, CalcResult, EvaluationError};
use colored::Colorize;
use serde_json::{json, Map, Value as Json};
use std::fs;
use std::path::{Path, PathBuf};

/// Inputs of the `eval` command
#[derive(Debug, Default)]
pub struct EvalOptions {
    /// Root context file (JSON or YAML)
    pub context: Option<PathBuf>,
    /// Local context file (JSON or YAML)
    pub local: Option<PathBuf>,
    /// Named arguments as `key=value`
    pub args: Vec<String>,
    /// Result used when evaluation fails
    pub default: Option<String>,
    pub timezone: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub verbose: bool,
}

/// Evaluate one expression and print its result
pub fn eval(expression: String, options: EvalOptions) -> CalcResult<()> {
    let mut config = match &options.config {
        Some(path) => CalcConfig::from_yaml_file(path)?,
        None => CalcConfig::default(),
    };
    if let Some(timezone) = &options.timezone {
        config = config.with_timezone(timezone.clone());
    }
    let calculator = Calculator::with_config(config)?;

    let root = options.context.as_deref().map(load_data).transpose()?;
    let local = options.local.as_deref().map(load_data).transpose()?;

    let mut hash = Map::new();
    for arg in &options.args {
        let (key, value) = parse_arg(arg)?;
        hash.insert(key, value);
    }
    if let Some(default) = &options.default {
        hash.insert("default".to_string(), Json::String(default.clone()));
    }

    if options.verbose {
        eprintln!("{}", "🧮 Evaluating formula".bold().green());
        eprintln!("   Expression: {}", expression.bright_yellow());
        if let Some(path) = &options.context {
            eprintln!("   Context:    {}", path.display());
        }
        if let Some(path) = &options.local {
            eprintln!("   Local:      {}", path.display());
        }
        for (key, value) in &hash {
            eprintln!("   Arg:        {} = {}", key.cyan(), value);
        }
        eprintln!(
            "   Format:     decimal '{}', thousands '{}'",
            calculator.config().number_format.decimal,
            calculator.config().number_format.thousands
        );
        eprintln!("   Timezone:   {}", calculator.zone());
        eprintln!();
    }

    let mut input = CalcInput::new();
    if let Some(root) = &root {
        input = input.with_root(root);
    }
    if let Some(local) = &local {
        input = input.with_local(local);
    }
    if !hash.is_empty() {
        input = input.with_hash(&hash);
    }

    let result = calculator
        .evaluate(&expression, &input)
        .map_err(EvaluationError::into_inner)?;

    if options.json {
        println!("{}", json!({ "result": result }));
    } else {
        println!("{}", result);
    }
    Ok(())
}

/// Parse expressions without evaluating them
pub fn check(expressions: Vec<String>) -> CalcResult<()> {
    let calculator = Calculator::new();
    let mut failures = 0;

    for expression in &expressions {
        match calculator.compile(expression) {
            Ok(_) => println!("{} {}", "✅".green(), expression),
            Err(e) => {
                failures += 1;
                println!("{} {}", "❌".red(), expression);
                println!("   {}", e.to_string().red());
            }
        }
    }

    if failures > 0 {
        return Err(CalcError::Parse(format!(
            "{} of {} expression(s) failed to parse",
            failures,
            expressions.len()
        )));
    }
    Ok(())
}

/// List the function library
pub fn functions() -> CalcResult<()> {
    let library = FunctionLibrary::standard();
    println!(
        "{}",
        format!("📚 Function library ({} functions)", library.len())
            .bold()
            .green()
    );

    for category in [
        FunctionCategory::Arithmetic,
        FunctionCategory::Logical,
        FunctionCategory::Statistical,
        FunctionCategory::Date,
    ] {
        println!();
        println!("   {}", category.to_string().to_uppercase().cyan().bold());
        for entry in library.entries().filter(|e| e.category == category) {
            println!(
                "      {} {}",
                format!("{:<36}", entry.signature).bright_yellow(),
                entry.summary
            );
        }
    }
    Ok(())
}

/// Read a context file; `.yaml`/`.yml` is YAML, anything else JSON.
pub fn load_data(path: &Path) -> CalcResult<Json> {
    let content = fs::read_to_string(path)?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        Ok(serde_yaml::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}

/// `key=value`; the value is JSON when it parses as JSON, else a string.
pub fn parse_arg(arg: &str) -> CalcResult<(String, Json)> {
    let (key, raw) = arg
        .split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .ok_or_else(|| {
            CalcError::Parse(format!("invalid argument '{}': expected KEY=VALUE", arg))
        })?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Json::String(raw.to_string()));
    Ok((key.trim().to_string(), value))
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
