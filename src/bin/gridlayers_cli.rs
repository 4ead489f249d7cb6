//! CLI tool for gridlayers - restores a saved grid state and prints it as JSON
//!
//! Usage:
//!   gridlayers_cli <state.properties> <columns> [rows] [--prefix name]
//!
//! Builds data -> reorder -> hide/show -> column groups, loads the properties
//! file into it and writes the visible order, groups and header spans to
//! stdout. Logging goes to stderr and is controlled by `RUST_LOG`.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use gridlayers::persistence::parse_properties;
use gridlayers::{
    Axis, DataLayer, DataLayerConfig, GridError, GroupLayer, HideShowLayer, Layer, ReorderLayer,
    StackSnapshot,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Fallback filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_LEVEL: &str = "gridlayers=info";
const DEFAULT_PREFIX: &str = "grid";
const USAGE: &str = "Usage: gridlayers_cli <state.properties> <columns> [rows] [--prefix name]";

struct Args {
    path: String,
    columns: usize,
    rows: usize,
    prefix: String,
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_LEVEL))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    // A second subscriber (e.g. under a test harness) is not an error here.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

fn parse_count(value: &str, what: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| format!("Invalid {what} count: {value}"))
}

fn parse_args(raw: &[String]) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut prefix = DEFAULT_PREFIX.to_string();
    let mut iter = raw.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--prefix" {
            prefix = iter.next().ok_or("--prefix needs a value")?.clone();
        } else {
            positional.push(arg.as_str());
        }
    }
    match positional.as_slice() {
        [path, columns] => Ok(Args {
            path: (*path).to_string(),
            columns: parse_count(columns, "column")?,
            rows: 1,
            prefix,
        }),
        [path, columns, rows] => Ok(Args {
            path: (*path).to_string(),
            columns: parse_count(columns, "column")?,
            rows: parse_count(rows, "row")?,
            prefix,
        }),
        _ => Err(USAGE.to_string()),
    }
}

fn run(args: &Args) -> Result<String, GridError> {
    let text = fs::read_to_string(&args.path)?;
    let properties = parse_properties(&text);

    let data = DataLayer::new(DataLayerConfig {
        column_count: args.columns,
        row_count: args.rows,
        ..DataLayerConfig::default()
    });
    let mut grid = GroupLayer::new(HideShowLayer::new(ReorderLayer::new(data)), Axis::Column);
    let events = grid.load_state(&args.prefix, &properties);
    tracing::info!(path = %args.path, events = events.len(), "state loaded");

    let spans: Vec<serde_json::Value> = (0..grid.count(Axis::Column))
        .filter(|&p| grid.group_cell_start(p) == Some(p))
        .filter_map(|p| {
            let index = grid.index_at(Axis::Column, p)?;
            Some(serde_json::json!({
                "position": p,
                "index": index,
                "group": grid.group_at(p).map(|g| g.name()),
                "span": grid.span_for(index),
            }))
        })
        .collect();

    let output = serde_json::json!({
        "snapshot": StackSnapshot::capture(&grid),
        "groups": grid.model(),
        "hidden_columns": grid.inner().hidden_indexes(Axis::Column),
        "hidden_rows": grid.inner().hidden_indexes(Axis::Row),
        "header_cells": spans,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

fn main() -> ExitCode {
    init_logging();

    let raw: Vec<String> = env::args().collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(json) => {
            let mut stdout = io::stdout();
            if let Err(e) = stdout.write_all(json.as_bytes()).and_then(|()| writeln!(stdout)) {
                eprintln!("Error writing output: {e}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
