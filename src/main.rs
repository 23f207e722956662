//! plancore demo binary
//!
//! Builds a table of generated timestamps and runs
//! `Project <- Limit <- Offset <- Sort <- Values` over it.

use std::sync::Arc;

use chrono::TimeDelta;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use plancore::auth::NoneAuth;
use plancore::config::{ExecConfig, DEFAULT_CANCEL_CHECK_INTERVAL};
use plancore::executor::{Client, Context, Datum, ExecutorEngine, Row, Session};
use plancore::expression::{DatePartKind, ExprRef, FunctionRegistry, GetField};
use plancore::plan::{Limit, NodeRef, Offset, Project, Sort, SortField, Values};
use plancore::types::DataType;

/// 1 day, 1 hour, 1 minute and 1 second
const STEP_SECS: i64 = 90_061;

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run a demo plan over generated timestamps")]
struct Cli {
    /// Rows to generate
    #[arg(long, default_value_t = 10, env = "PLANCORE_ROWS")]
    rows: i64,

    /// Rows to skip after sorting
    #[arg(long, default_value_t = 2, env = "PLANCORE_OFFSET")]
    offset: u64,

    /// Rows to return
    #[arg(long, default_value_t = 5, env = "PLANCORE_LIMIT")]
    limit: u64,

    /// First generated timestamp
    #[arg(long, default_value = "2024-01-01 00:00:00", env = "PLANCORE_START")]
    start: String,

    #[arg(long, default_value_t = DEFAULT_CANCEL_CHECK_INTERVAL, env = "PLANCORE_CANCEL_CHECK_INTERVAL")]
    cancel_check_interval: u64,

    /// Skip per-row latency measurement
    #[arg(long, env = "PLANCORE_NO_ROW_TIMINGS")]
    no_row_timings: bool,
}

fn build_plan(cli: &Cli) -> Result<NodeRef, Box<dyn std::error::Error>> {
    let start = DataType::Timestamp
        .convert(&Datum::from(cli.start.as_str()))?
        .as_timestamp()
        .ok_or("start is not a timestamp")?;

    let mut rows = Vec::new();
    for i in 0..cli.rows {
        let ts = start
            .checked_add_signed(TimeDelta::seconds(STEP_SECS * i))
            .ok_or("generated timestamp out of range")?;
        rows.push(Row::new(vec![Datum::Int(i), Datum::Timestamp(ts)]));
    }

    let id: ExprRef = GetField::new(0, "id", DataType::BigInt, false).into_ref();
    let ts: ExprRef = GetField::new(1, "ts", DataType::Timestamp, false).into_ref();

    let registry = FunctionRegistry::new();
    let mut exprs = vec![id];
    for kind in DatePartKind::ALL {
        exprs.push(registry.build(kind.name(), vec![ts.clone()])?);
    }

    let values: NodeRef = Arc::new(Values::new(rows));
    let sort: NodeRef = Arc::new(Sort::new(vec![SortField::desc(ts)], values));
    let offset: NodeRef = Arc::new(Offset::new(cli.offset, sort));
    let limit: NodeRef = Arc::new(Limit::new(cli.limit, offset));
    Ok(Arc::new(Project::new(exprs, limit)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = ExecConfig::new()
        .with_cancel_check_interval(cli.cancel_check_interval)
        .with_row_timings(!cli.no_row_timings);

    let plan = build_plan(&cli)?;
    print!("{}", plan);

    let session = Arc::new(Session::new(Client::new("local", "127.0.0.1")));
    let ctx = Context::with_config(session, config);
    let engine = ExecutorEngine::new(Arc::new(NoneAuth));

    tracing::info!(rows = cli.rows, offset = cli.offset, limit = cli.limit, "Running plan");
    for row in engine.query(&ctx, &plan).await? {
        println!("{}", row);
    }

    Ok(())
}
