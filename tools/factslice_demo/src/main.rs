use anyhow::{anyhow, bail, Context};
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use factslice::metrics::{period_delta, ratio_column, series};
use factslice::{
    parser, AggregationSpec, CancelToken, DateRange, Delta, Engine, MeasureSpec, Outcome, ResultTable,
    SelectionEvent, Session, SummaryFields, Value,
};

#[derive(Parser)]
#[command(name = "factslice-demo")]
#[command(about = "List dimension options and run filtered aggregations over a fact table")]
#[command(version)]
struct Args {
    /// Engine configuration (fact model and store)
    #[arg(long, short)]
    config: PathBuf,

    /// Per-request deadline in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the options of every dimension, or of one
    Options {
        #[arg(long)]
        dimension: Option<String>,

        /// Restrict listings by the selection of these dimensions
        #[arg(long = "context")]
        context: Vec<String>,

        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Run a grouped aggregation under a selection
    Query {
        /// Group-by field; repeat for several
        #[arg(long = "group")]
        group: Vec<String>,

        /// Measure as field:op, e.g. value:sum; repeat for several
        #[arg(long = "measure", required = true)]
        measures: Vec<MeasureSpec>,

        /// Keep the n largest groups by a measure column, as column:n
        #[arg(long)]
        top: Option<String>,

        /// Append ratio_column = numerator / denominator, as name=num/den
        #[arg(long)]
        ratio: Option<String>,

        /// Report period deltas of this column against the first group field
        #[arg(long)]
        delta: Option<String>,

        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Print visits, procedures, total value and average ticket
    Summary {
        #[arg(long, default_value = "id")]
        visit_field: String,

        #[arg(long, default_value = "item")]
        procedure_field: String,

        #[arg(long, default_value = "value")]
        value_field: String,

        #[command(flatten)]
        selection: SelectionArgs,
    },
}

#[derive(ClapArgs)]
struct SelectionArgs {
    /// JSON file holding an array of selection events
    #[arg(long)]
    events: Option<PathBuf>,

    /// First day, YYYY-MM-DD or DD/MM/YYYY
    #[arg(long)]
    from: Option<String>,

    /// Last day, YYYY-MM-DD or DD/MM/YYYY
    #[arg(long)]
    to: Option<String>,
}

#[derive(Serialize)]
struct QueryOutput {
    table: ResultTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    deltas: Option<Vec<(Value, Delta)>>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = parser::parse_file(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    let mut engine = Engine::open(&config)?;
    if let Some(ms) = args.timeout_ms {
        engine = engine.with_query_timeout(Duration::from_millis(ms));
    }

    match args.command {
        Commands::Options { dimension, context, selection } => {
            let mut session = start(&engine, &selection)?;
            if !context.is_empty() {
                let context: Vec<&str> = context.iter().map(String::as_str).collect();
                ready(session.refresh_catalog_in_context(&context, &engine.cancel_token())?)?;
            }
            let catalog = session.catalog();
            for warning in catalog.warnings() {
                eprintln!("warning: {}", warning);
            }
            match dimension {
                Some(name) => {
                    let options = catalog
                        .dimension(&name)
                        .ok_or_else(|| anyhow!("Unknown dimension '{}'", name))?;
                    print_json(options)
                }
                None => print_json(&catalog.dimensions().collect::<Vec<_>>()),
            }
        }
        Commands::Query { group, measures, top, ratio, delta, selection } => {
            let session = start(&engine, &selection)?;
            let mut spec = AggregationSpec { group_fields: group, measures, top: None };
            if let Some(top) = top {
                let (measure, n) = top
                    .rsplit_once(':')
                    .ok_or_else(|| anyhow!("--top expects column:n, got '{}'", top))?;
                spec = spec.top(measure, n.parse().context("--top count")?);
            }
            info!(%spec, "running query");

            let mut table = ready(session.run_aggregation(&spec, &engine.cancel_token())?)?;
            if let Some(ratio) = ratio {
                let (name, rest) = ratio
                    .split_once('=')
                    .ok_or_else(|| anyhow!("--ratio expects name=num/den, got '{}'", ratio))?;
                let (num, den) = rest
                    .split_once('/')
                    .ok_or_else(|| anyhow!("--ratio expects name=num/den, got '{}'", ratio))?;
                ratio_column(&mut table, name, num, den)?;
            }
            let deltas = match delta {
                Some(column) => {
                    let key = spec.group_fields.first().ok_or_else(|| anyhow!("--delta needs a --group field"))?;
                    Some(period_delta(&series(&table, key, &column)?))
                }
                None => None,
            };
            print_json(&QueryOutput { table, deltas })
        }
        Commands::Summary { visit_field, procedure_field, value_field, selection } => {
            let session = start(&engine, &selection)?;
            let fields = SummaryFields { visit: visit_field, procedure: procedure_field, value: value_field };
            print_json(&ready(session.summary(&fields, &engine.cancel_token())?)?)
        }
    }
}

/// Start a session and replay the requested selection
fn start(engine: &Engine, args: &SelectionArgs) -> anyhow::Result<Session> {
    let mut session = ready(engine.start_session(&engine.cancel_token())?)?;
    if let Some(path) = &args.events {
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let events: Vec<SelectionEvent> = serde_json::from_str(&text)?;
        for event in &events {
            session.apply(event)?;
        }
    }
    let range = DateRange::parse(args.from.as_deref(), args.to.as_deref())?;
    if !range.is_unbounded() {
        session.set_date_range(Some(range));
    }
    Ok(session)
}

fn ready<T>(outcome: Outcome<T>) -> anyhow::Result<T> {
    match outcome {
        Outcome::Ready(value) => Ok(value),
        Outcome::Cancelled => bail!("Request cancelled (deadline reached)"),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
