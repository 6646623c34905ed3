//! The `translate` subcommand.

use std::fs;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use serde_json::{json, Map, Value as Json};
use tracing::debug;

use pvl::{Encoder, Module, PvlDateTime, PvlTime, Value};

use crate::error::{PvltError, Result};

/// Arguments for the translate subcommand.
#[derive(Args, Debug)]
pub struct TranslateArgs {
    /// Label to convert
    pub input: PathBuf,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Pds3)]
    pub format: OutputFormat,

    /// Write to a file instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

/// Formats `translate` can emit.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    Pvl,
    Odl,
    Pds3,
    Isis,
    Json,
}

pub fn run_translate(args: TranslateArgs) -> Result<()> {
    debug!(input = %args.input.display(), "loading label");
    let bytes = fs::read(&args.input).map_err(|source| PvltError::ReadInput {
        path: args.input.clone(),
        source,
    })?;
    let module = pvl::load_bytes(&bytes)?;

    let text = match args.format {
        OutputFormat::Pvl => pvl::dumps_with(&module, &Encoder::pvl())?,
        OutputFormat::Odl => pvl::dumps_with(&module, &Encoder::odl())?,
        OutputFormat::Pds3 => pvl::dumps_with(&module, &Encoder::pds3())?,
        OutputFormat::Isis => pvl::dumps_with(&module, &Encoder::isis())?,
        OutputFormat::Json => {
            let mut rendered = serde_json::to_string_pretty(&module_to_json(&module))?;
            rendered.push('\n');
            rendered
        }
    };

    match &args.output {
        Some(path) => fs::write(path, &text).map_err(|source| PvltError::WriteOutput {
            path: path.clone(),
            source,
        })?,
        None => print!("{text}"),
    }
    Ok(())
}

fn module_to_json(module: &Module) -> Json {
    let mut map = Map::new();
    for (key, value) in module.iter() {
        let rendered = value_to_json(value);
        match map.get_mut(key.as_str()) {
            // JSON objects cannot repeat keys, so duplicate parameters
            // collapse into an array.
            Some(Json::Array(existing)) => existing.push(rendered),
            Some(existing) => {
                let first = existing.take();
                *existing = Json::Array(vec![first, rendered]);
            }
            None => {
                map.insert(key.clone(), rendered);
            }
        }
    }
    Json::Object(map)
}

fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Empty { .. } | Value::Null => Json::Null,
        Value::Boolean(b) => json!(b),
        Value::Integer(i) => json!(i),
        Value::BasedInteger(b) => json!(b.value),
        Value::Real(r) => serde_json::Number::from_f64(*r)
            .map(Json::Number)
            .unwrap_or_else(|| json!(r.to_string())),
        Value::String(s) | Value::Symbol(s) => json!(s),
        Value::Date(d) => json!(d.to_string()),
        Value::Time(t) => json!(time_to_string(t)),
        Value::DateTime(dt) => json!(datetime_to_string(dt)),
        Value::Quantity(q) => json!({
            "value": value_to_json(&q.value),
            "units": q.units,
        }),
        Value::Set(items) | Value::Sequence(items) => {
            Json::Array(items.iter().map(value_to_json).collect())
        }
        Value::Block(block) => module_to_json(&block.body),
    }
}

fn time_to_string(time: &PvlTime) -> String {
    match time {
        PvlTime::Naive(t) => t.to_string(),
        PvlTime::Aware { time, offset } => format!("{time}{offset}"),
    }
}

fn datetime_to_string(datetime: &PvlDateTime) -> String {
    match datetime {
        PvlDateTime::Naive(naive) => naive.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        PvlDateTime::Aware(aware) => aware.to_rfc3339(),
    }
}
