mod calculator;
mod config;
mod pipeline;
mod server;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::Config;
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "webcalc", version, about = "A tiny web calculator with a build-and-push delivery pipeline")]
struct Cli {
    /// Path to the config file (default: ./webcalc.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the calculator web server.
    Serve {
        /// Bind address, overriding the config file and WEBCALC_BIND.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Evaluate a single expression and print the result.
    Eval {
        expression: String,

        /// Emit the API JSON shape instead of the display string.
        #[arg(long)]
        json: bool,
    },
    /// Run the delivery pipeline: checkout, build, login, push.
    Pipeline {
        /// Print the planned commands without executing anything.
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            run_server(&config)
        }
        Command::Eval { expression, json } => eval_once(&expression, json),
        Command::Pipeline { dry_run } => {
            pipeline::run(&config, dry_run)?;
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run_server(config: &Config) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?
        .block_on(server::serve(config))
}

fn eval_once(expression: &str, as_json: bool) -> anyhow::Result<()> {
    if !calculator::is_math_input(expression) {
        anyhow::bail!("not a calculator expression: {expression}");
    }
    let result = calculator::evaluate_expression(expression)
        .ok_or_else(|| anyhow::anyhow!("invalid expression: {expression}"))?;

    if as_json {
        let body = match &result {
            calculator::CalcResult::Success {
                expression,
                value,
                display_result,
                raw_result,
            } => json!({
                "expression": expression,
                "value": value,
                "display": display_result,
                "raw": raw_result,
            }),
            calculator::CalcResult::Error {
                expression,
                message,
            } => json!({
                "expression": expression,
                "error": message,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("{}", result.display());
    }
    Ok(())
}
