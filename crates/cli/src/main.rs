// truthgrid CLI - headless truth-model evaluation

mod exit_codes;
mod table;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use truthgrid_model::canonical::canonical_model;
use truthgrid_model::snapshot::{Status, Value};
use truthgrid_model::TruthModel;

use exit_codes::{
    model_exit_code, EXIT_CLAIMS_FAILING, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "truthgrid-cli")]
#[command(about = "Deterministic truth-model evaluation (headless)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a model and print its value table
    #[command(after_help = "\
Examples:
  tgrid eval model.toml
  tgrid eval --json
  tgrid eval model.toml --set C_me=9.2e-31")]
    Eval {
        /// Schema file (omit to use the built-in canonical model)
        schema: Option<PathBuf>,

        /// Emit the snapshot as a single JSON value on stdout
        #[arg(long)]
        json: bool,

        /// What-if edit applied before evaluation (repeatable)
        #[arg(long = "set", value_name = "ID=VALUE")]
        set: Vec<String>,
    },

    /// Evaluate claims; exit 3 if any fail
    #[command(after_help = "\
Examples:
  tgrid check model.toml
  tgrid check --set C_me=9.2e-31 && echo 'still holds'")]
    Check {
        /// Schema file (omit to use the built-in canonical model)
        schema: Option<PathBuf>,

        /// Emit results as a single JSON value on stdout
        #[arg(long)]
        json: bool,

        /// What-if edit applied before evaluation (repeatable)
        #[arg(long = "set", value_name = "ID=VALUE")]
        set: Vec<String>,
    },

    /// Print question answers with their explanations
    Questions {
        /// Schema file (omit to use the built-in canonical model)
        schema: Option<PathBuf>,

        /// Emit answers as a single JSON value on stdout
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Eval { schema, json, set } => cmd_eval(schema.as_deref(), json, &set),
        Commands::Check { schema, json, set } => cmd_check(schema.as_deref(), json, &set),
        Commands::Questions { schema, json } => cmd_questions(schema.as_deref(), json),
    };
    ExitCode::from(code)
}

/// Load a model from a schema file, or the built-in canonical model when no
/// path is given. Returns the exit code on failure.
fn load_model(schema: Option<&std::path::Path>) -> Result<TruthModel, u8> {
    let Some(path) = schema else {
        return Ok(canonical_model());
    };
    let input = std::fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read {}: {e}", path.display());
        EXIT_USAGE
    })?;
    TruthModel::from_toml(&input).map_err(|e| {
        eprintln!("error: {e}");
        model_exit_code(&e)
    })
}

/// Apply `--set ID=VALUE` edits through the writer path. Constants first,
/// then literal instances.
fn apply_sets(model: &mut TruthModel, sets: &[String]) -> Result<(), u8> {
    for edit in sets {
        let Some((id, raw)) = edit.split_once('=') else {
            eprintln!("error: --set expects ID=VALUE, got '{edit}'");
            return Err(EXIT_USAGE);
        };
        let value: f64 = raw.parse().map_err(|_| {
            eprintln!("error: --set {id}: '{raw}' is not a number");
            EXIT_USAGE
        })?;
        let result = match model.set_constant_value(id, value) {
            Err(truthgrid_model::ModelError::UnknownConstant(_)) => {
                model.set_instance_value(id, value)
            }
            other => other,
        };
        result.map_err(|e| {
            eprintln!("error: --set {id}: {e}");
            EXIT_USAGE
        })?;
    }
    Ok(())
}

fn cmd_eval(schema: Option<&std::path::Path>, json: bool, sets: &[String]) -> u8 {
    let mut model = match load_model(schema) {
        Ok(m) => m,
        Err(code) => return code,
    };
    if let Err(code) = apply_sets(&mut model, sets) {
        return code;
    }

    let snapshot = model.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot).unwrap_or_default());
    } else {
        println!("{}: {}", model.name(), snapshot.summary_line());
        println!();
        print!("{}", table::render(&snapshot));
    }
    EXIT_SUCCESS
}

#[derive(Serialize)]
struct CheckReport {
    model: String,
    passed: usize,
    failed: usize,
    failing: Vec<FailingClaim>,
}

#[derive(Serialize)]
struct FailingClaim {
    id: String,
    text: String,
    truth_source: &'static str,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<f64>,
    tolerance: f64,
}

fn cmd_check(schema: Option<&std::path::Path>, json: bool, sets: &[String]) -> u8 {
    let mut model = match load_model(schema) {
        Ok(m) => m,
        Err(code) => return code,
    };
    if let Err(code) = apply_sets(&mut model, sets) {
        return code;
    }

    let snapshot = model.snapshot();
    let mut failing = Vec::new();
    for entry in &snapshot.entries {
        if entry.kind != truthgrid_model::snapshot::EntityKind::Claim {
            continue;
        }
        let failed = !matches!(entry.value, Some(Value::Bool(true)))
            || matches!(entry.status, Status::Error(_));
        if failed {
            let def = model.claim_def(&entry.id);
            failing.push(FailingClaim {
                id: entry.id.clone(),
                text: def.map(|c| c.text.clone()).unwrap_or_default(),
                truth_source: def.map(|c| c.kind.truth_source()).unwrap_or(""),
                status: entry.status.to_string(),
                range: entry.range,
                tolerance: def.map(|c| c.tolerance).unwrap_or(0.0),
            });
        }
    }

    let report = CheckReport {
        model: model.name().to_string(),
        passed: snapshot.summary.claims_passed,
        failed: failing.len(),
        failing,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else if report.failing.is_empty() {
        println!("{}: all {} claims pass", report.model, report.passed);
    } else {
        println!(
            "{}: {} of {} claims failing",
            report.model,
            report.failed,
            report.passed + report.failed
        );
        for claim in &report.failing {
            println!("  {} [{}] {}", claim.id, claim.status, claim.text);
        }
    }

    if report.failed > 0 {
        EXIT_CLAIMS_FAILING
    } else {
        EXIT_SUCCESS
    }
}

#[derive(Serialize)]
struct QuestionAnswer {
    id: String,
    text: String,
    answer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
}

fn cmd_questions(schema: Option<&std::path::Path>, json: bool) -> u8 {
    let model = match load_model(schema) {
        Ok(m) => m,
        Err(code) => return code,
    };

    let mut answers = Vec::new();
    for question in model.questions() {
        match model.question(&question.id) {
            Ok(answer) => answers.push(QuestionAnswer {
                id: question.id.clone(),
                text: question.text.clone(),
                answer,
                explanation: question.explanation.clone(),
            }),
            Err(e) => {
                eprintln!("error: question {}: {e}", question.id);
                return model_exit_code(&e);
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&answers).unwrap_or_default());
    } else {
        for qa in &answers {
            println!("{}  {}  {}", qa.id, if qa.answer { "TRUE " } else { "FALSE" }, qa.text);
            if let Some(explanation) = &qa.explanation {
                println!("      {explanation}");
            }
        }
    }
    EXIT_SUCCESS
}
