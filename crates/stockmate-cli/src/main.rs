//! StockMate command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Serve the tools to an MCP client over stdio (default)
//! stockmate serve
//!
//! # List the registered tools
//! stockmate list
//!
//! # Run one tool and print its report
//! stockmate call get_stock_report '{"symbol": "005930.KS"}'
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::sync::Arc;
use stockmate_market::{MarketConfig, YahooFinanceClient, register_market_tools};
use stockmate_mcp::{McpServer, transport};
use stockmate_tools::ToolRegistry;
use stockmate_utils::{Config, LogFormat, init_tracing};
use tracing::info;

const INSTRUCTIONS: &str = "Stock quotes, exchange rates, news and profit/loss cards. \
     Korean stocks need a .KS or .KQ suffix (e.g. 005930.KS).";

#[derive(Parser, Debug)]
#[command(name = "stockmate", version)]
#[command(about = "Stock and exchange-rate tools for MCP clients", long_about = None)]
struct Args {
    /// Rate used when the live conversion rate is unavailable
    #[arg(long, global = true)]
    fallback_rate: Option<f64>,

    /// Currency pair used to convert foreign quotes, e.g. USDKRW=X
    #[arg(long, global = true)]
    fx_pair: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Serve the tools over stdio
    Serve,
    /// List the registered tools
    List,
    /// Call one tool and print its report
    Call {
        /// Tool name
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut app = Config::default().with_env()?;
    if args.log_json {
        app.log_format = LogFormat::Json;
    }
    init_tracing(&app);

    let market = Arc::new(market_config(&args)?);
    let provider = Arc::new(YahooFinanceClient::new(&market)?);

    let mut registry = ToolRegistry::new();
    register_market_tools(&mut registry, provider, market)?;
    let registry = Arc::new(registry);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!(version = env!("CARGO_PKG_VERSION"), "Starting {}", app.app_name);
            let server = McpServer::new(&app.app_name, env!("CARGO_PKG_VERSION"), registry)
                .with_instructions(INSTRUCTIONS);
            transport::serve_stdio(&server).await?;
        }
        Command::List => {
            for tool in registry.list_tools() {
                println!("{:<26}{}", tool.name(), tool.description());
            }
        }
        Command::Call { tool, args } => {
            let params: Value = serde_json::from_str(&args)
                .with_context(|| format!("arguments for {tool} are not valid JSON"))?;
            let report = registry.call(&tool, params).await?;
            println!("{report}");
        }
    }

    Ok(())
}

/// Defaults, then environment, then command-line flags
fn market_config(args: &Args) -> anyhow::Result<MarketConfig> {
    let mut config = MarketConfig::default().with_env()?;

    if let Some(rate) = args.fallback_rate {
        config.fallback_conversion_rate = rate;
    }
    if let Some(pair) = &args.fx_pair {
        config.fx_pair.clone_from(pair);
    }

    config.validate()?;
    Ok(config)
}
