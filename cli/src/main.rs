use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use jsonschema_canon_core::{normalize, BooleanForm, Draft, EquivalenceOracle, NormalizeOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "jsonschema-canon")]
#[command(about = "Canonicalize JSON Schema documents into a validation-equivalent normal form")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a JSON Schema to its canonical form
    Normalize {
        /// Input JSON Schema file (stdin if omitted or `-`)
        input: Option<PathBuf>,

        /// Output file (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Indent the output over multiple lines
        #[arg(long)]
        pretty: bool,

        /// Keep annotation keywords (title, description, ...)
        #[arg(long)]
        no_strip_meta: bool,

        /// Print every rule application to stderr
        #[arg(long)]
        explain: bool,

        /// Encoding of boolean schemas in the output
        #[arg(long, value_enum, default_value_t = BooleanFormArg::Literal)]
        boolean_form: BooleanFormArg,

        /// Fail on schemas nested deeper than this
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Compare two JSON Schemas by canonical form
    Compare {
        /// First JSON Schema file
        left: PathBuf,

        /// Second JSON Schema file
        right: PathBuf,

        /// JSON array of instances to validate against both schemas
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Draft used to validate the corpus
        #[arg(long, value_enum, default_value_t = DraftArg::Draft202012)]
        draft: DraftArg,

        /// Keep annotation keywords when comparing
        #[arg(long)]
        no_strip_meta: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum BooleanFormArg {
    Literal,
    Object,
}

impl From<BooleanFormArg> for BooleanForm {
    fn from(val: BooleanFormArg) -> Self {
        match val {
            BooleanFormArg::Literal => BooleanForm::Literal,
            BooleanFormArg::Object => BooleanForm::Object,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum DraftArg {
    #[value(name = "4")]
    Draft4,
    #[value(name = "6")]
    Draft6,
    #[value(name = "7")]
    Draft7,
    #[value(name = "2019-09")]
    Draft201909,
    #[value(name = "2020-12")]
    Draft202012,
}

impl From<DraftArg> for Draft {
    fn from(val: DraftArg) -> Self {
        match val {
            DraftArg::Draft4 => Draft::Draft4,
            DraftArg::Draft6 => Draft::Draft6,
            DraftArg::Draft7 => Draft::Draft7,
            DraftArg::Draft201909 => Draft::Draft201909,
            DraftArg::Draft202012 => Draft::Draft202012,
        }
    }
}

/// Outcome of `compare`, written to stdout.
#[derive(Serialize)]
struct Comparison {
    identical: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    disagreements: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    left: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    right: Option<Value>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing: logs go to stderr so stdout stays clean for JSON
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Normalize {
            input,
            output,
            pretty,
            no_strip_meta,
            explain,
            boolean_form,
            max_depth,
        } => {
            let schema = read_json(input.as_deref())?;

            // All fields set explicitly; clippy enforces exhaustiveness
            let options = NormalizeOptions {
                strip_metadata: !no_strip_meta,
                max_depth,
                boolean_form: boolean_form.into(),
            };

            let result = normalize(&schema, &options)
                .map_err(|e| anyhow::Error::from(e).context("Normalization failed"))?;

            if explain {
                let mut stderr = io::stderr().lock();
                for step in &result.applied {
                    writeln!(stderr, "{} at {}", step.rule, step.path)
                        .context("Failed to write trace")?;
                }
            }

            write_json(&result.schema, output.as_ref(), pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Compare {
            left,
            right,
            corpus,
            draft,
            no_strip_meta,
        } => {
            let left_schema = read_json(Some(&left))?;
            let right_schema = read_json(Some(&right))?;
            let options = NormalizeOptions {
                strip_metadata: !no_strip_meta,
                ..NormalizeOptions::default()
            };

            let left_canonical = normalize(&left_schema, &options)
                .with_context(|| format!("Failed to normalize {}", left.display()))?
                .schema;
            let right_canonical = normalize(&right_schema, &options)
                .with_context(|| format!("Failed to normalize {}", right.display()))?
                .schema;
            let identical = left_canonical == right_canonical;

            let disagreements = match corpus {
                Some(path) => {
                    let Value::Array(instances) = read_json(Some(&path))? else {
                        bail!("Corpus {} must be a JSON array of instances", path.display());
                    };
                    let oracle = EquivalenceOracle::new(draft.into());
                    Some(
                        oracle
                            .disagreements(&left_schema, &right_schema, &instances)
                            .context("Failed to validate corpus")?,
                    )
                }
                None => None,
            };
            let equivalent = identical || disagreements.as_ref().is_some_and(Vec::is_empty);

            let report = Comparison {
                identical,
                disagreements,
                left: (!identical).then_some(left_canonical),
                right: (!identical).then_some(right_canonical),
            };
            write_json(&report, None, true)?;

            Ok(if equivalent {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

/// Read one JSON document from `path`, or from stdin for `None` and `-`.
fn read_json(path: Option<&Path>) -> Result<Value> {
    let (reader, source): (Box<dyn Read>, String) = match path {
        Some(p) if p != Path::new("-") => {
            let file = File::open(p)
                .with_context(|| format!("Failed to open input file: {}", p.display()))?;
            (Box::new(BufReader::new(file)), p.display().to_string())
        }
        _ => (Box::new(io::stdin().lock()), "<stdin>".to_string()),
    };

    // Deeply nested schemas are valid input; nesting is bounded by the stack only.
    let mut de = serde_json::Deserializer::from_reader(reader);
    de.disable_recursion_limit();
    let value = Value::deserialize(&mut de)
        .with_context(|| format!("Failed to parse JSON from: {source}"))?;
    de.end()
        .with_context(|| format!("Trailing characters after JSON in: {source}"))?;
    Ok(value)
}

fn write_json<T: Serialize>(val: &T, path: Option<&PathBuf>, pretty: bool) -> Result<()> {
    let mut writer: Box<dyn Write> = if let Some(p) = path {
        let file = File::create(p)
            .with_context(|| format!("Failed to create output file: {}", p.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    if pretty {
        serde_json::to_writer_pretty(&mut writer, val).context("Failed to write JSON")?;
    } else {
        serde_json::to_writer(&mut writer, val).context("Failed to write JSON")?;
    }

    // Ensure trailing newline
    writeln!(writer).context("Failed to write trailing newline")?;
    writer.flush().context("Failed to flush output")?;

    Ok(())
}
