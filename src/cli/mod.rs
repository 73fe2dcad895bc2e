//! Readmission risk CLI module
//!
//! Command-line interface for feature engineering, training, one-off
//! prediction, serving and artifact inspection.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::export::ModelArtifact;
use crate::inference::{InferenceAdapter, InferenceStrategy, PatientRequest};
use crate::preprocessing::{FeaturePipeline, PipelineConfig, ScalerType};
use crate::schema::AlignmentMode;
use crate::training::{TrainEngine, TrainingConfig};
use crate::utils::data_loader::{load_raw_records, write_feature_table};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn row(key: &str, val: &str) {
    println!("  {:<20} {}", muted(key), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Replay the fitted feature pipeline
    Replay,
    /// Build the vector from tables extracted from the artifact
    Direct,
}

impl From<StrategyArg> for InferenceStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Replay => InferenceStrategy::PipelineReplay,
            StrategyArg::Direct => InferenceStrategy::DirectSynthesis,
        }
    }
}

#[derive(Parser)]
#[command(name = "readmit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hospital readmission risk: feature engineering, training and serving")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean and encode the historical CSV into a feature table
    Engineer {
        /// Historical patient CSV
        #[arg(short, long)]
        data: PathBuf,

        /// Output feature table (CSV)
        #[arg(short, long, default_value = "data/features.csv")]
        output: PathBuf,

        /// Output fitted pipeline (JSON)
        #[arg(short, long, default_value = "models/pipeline.json")]
        pipeline: PathBuf,

        /// Scaler (standard, minmax)
        #[arg(long, default_value = "standard")]
        scaler: String,

        /// Zero-fill and drop schema differences instead of rejecting them
        #[arg(long)]
        lenient: bool,
    },

    /// Train the classifier and write the model artifact
    Train {
        /// Engineered feature table (CSV)
        #[arg(short, long, default_value = "data/features.csv")]
        features: PathBuf,

        /// Fitted pipeline (JSON)
        #[arg(short, long, default_value = "models/pipeline.json")]
        pipeline: PathBuf,

        /// Output model artifact
        #[arg(short, long, default_value = "models/readmission_model.json")]
        output: PathBuf,

        /// Held-out fraction per class
        #[arg(long, default_value = "0.2")]
        test_size: f64,

        /// Split seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Gradient descent iteration cap
        #[arg(long, default_value = "5000")]
        max_iter: usize,
    },

    /// Predict for one JSON request
    Predict {
        /// Model artifact
        #[arg(short, long, default_value = "models/readmission_model.json")]
        model: PathBuf,

        /// Request JSON file; reads the inline --json value when absent
        #[arg(short, long)]
        request: Option<PathBuf>,

        /// Inline request JSON
        #[arg(long, default_value = "{}")]
        json: String,

        #[arg(long, value_enum, default_value = "replay")]
        strategy: StrategyArg,
    },

    /// Start the prediction server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "API_PORT", default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Model artifact
        #[arg(short, long, env = "MODEL_PATH", default_value = "models/readmission_model.json")]
        model: PathBuf,

        #[arg(long, value_enum, default_value = "replay")]
        strategy: StrategyArg,
    },

    /// Show the contents of a model artifact
    Info {
        /// Model artifact
        #[arg(short, long, default_value = "models/readmission_model.json")]
        model: PathBuf,
    },
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub fn cmd_engineer(
    data_path: &Path,
    output: &Path,
    pipeline_path: &Path,
    scaler: &str,
    lenient: bool,
) -> anyhow::Result<()> {
    section("Engineer features");

    let scaler_type = ScalerType::parse(scaler)
        .ok_or_else(|| anyhow::anyhow!("Invalid scaler: {} (expected standard or minmax)", scaler))?;
    let mode = if lenient { AlignmentMode::Lenient } else { AlignmentMode::Strict };

    step_run("Loading records");
    let start = Instant::now();
    let records = load_raw_records(data_path)?;
    step_done(&format!("{} rows in {:?}", records.len(), start.elapsed()));

    step_run("Fitting pipeline");
    let start = Instant::now();
    let mut pipeline = FeaturePipeline::new(
        PipelineConfig::new().with_scaler(scaler_type).with_alignment_mode(mode),
    );
    let table = pipeline.fit_transform(&records)?;
    step_done(&format!("{} rows × {} features in {:?}", table.n_rows(), table.n_columns(), start.elapsed()));

    step_run("Writing outputs");
    ensure_parent(output)?;
    ensure_parent(pipeline_path)?;
    write_feature_table(&table, output)?;
    pipeline.save(pipeline_path)?;
    step_done("");

    println!();
    row("Feature table", &output.display().to_string());
    row("Pipeline", &pipeline_path.display().to_string());
    if let Some(median) = pipeline.cleaner().satisfaction_median() {
        row("Satisfaction median", &format!("{}", median));
    }
    println!();
    Ok(())
}

pub fn cmd_train(
    features: &Path,
    pipeline: &Path,
    output: &Path,
    test_size: f64,
    seed: u64,
    max_iter: usize,
) -> anyhow::Result<()> {
    section("Train");

    let config = TrainingConfig::new()
        .with_test_size(test_size)
        .with_random_state(seed)
        .with_max_iter(max_iter);

    step_run("Training logistic regression");
    let start = Instant::now();
    let artifact = TrainEngine::new(config).train_from_files(features, pipeline)?;
    step_done(&format!("{:?}", start.elapsed()));

    step_run("Saving artifact");
    artifact.save(output)?;
    step_done(&output.display().to_string());

    let m = &artifact.metrics;
    let [[tn, fp], [fn_, tp]] = m.confusion_matrix.as_rows();
    println!();
    row("Accuracy", &format!("{:.4}", m.accuracy).bold().to_string());
    row("Precision", &format!("{:.4}", m.precision));
    row("Recall", &format!("{:.4}", m.recall));
    row("F1", &format!("{:.4}", m.f1_score));
    row("Confusion [0]", &format!("{:>5} {:>5}", tn, fp));
    row("Confusion [1]", &format!("{:>5} {:>5}", fn_, tp));
    row("Features", &m.n_features.to_string());
    row("Train / test rows", &format!("{} / {}", m.n_train_samples, m.n_test_samples));
    println!();
    Ok(())
}

pub fn cmd_predict(
    model: &Path,
    request_path: Option<&Path>,
    inline: &str,
    strategy: StrategyArg,
) -> anyhow::Result<()> {
    let body = match request_path {
        Some(path) => std::fs::read(path)?,
        None => inline.as_bytes().to_vec(),
    };
    let request = PatientRequest::from_json(&body)?;
    let adapter = InferenceAdapter::load(model, strategy.into())?;
    let prediction = adapter.predict(&request)?;

    let response = serde_json::json!({
        "readmission_prediction": prediction.label,
        "message": prediction.message,
        "probability": prediction.probability,
        "defaults_applied": prediction.defaults_applied,
    });
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

pub async fn cmd_serve(host: &str, port: u16, model: &Path, strategy: StrategyArg) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Readmission Risk".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Predict", &format!("POST http://{}:{}/predict", host, port)));
    line_box(&kv("Health ", &format!("GET  http://{}:{}/health", host, port)));
    line_box(&kv("Model  ", &model.display().to_string()));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    let config = ServerConfig {
        host: host.to_string(),
        port,
        ..Default::default()
    }
    .with_model_path(model)
    .with_strategy(strategy.into());

    run_server(config).await
}

pub fn cmd_info(model: &Path) -> anyhow::Result<()> {
    section("Model artifact");

    let artifact = ModelArtifact::load(model)?;
    let pipeline = &artifact.pipeline;

    row("Path", &model.display().to_string());
    row("Created", &artifact.created_at.to_rfc3339());
    row("Producer", &artifact.producer_version);
    row("Target", &artifact.target_column);
    row("Schema version", &artifact.schema.version().to_string());
    row("Fingerprint", artifact.schema.fingerprint());
    row("Features", &artifact.schema.len().to_string());
    row("Training rows", &pipeline.n_training_records().to_string());
    row("Accuracy", &format!("{:.4}", artifact.metrics.accuracy));

    section("Categories");
    for block in pipeline.encoder().blocks() {
        row(block.field.column_name(), &block.categories.join(", "));
    }

    section("Scaling");
    for p in pipeline.scaler().all_params() {
        row(p.field.column_name(), &format!("center {:.4}  scale {:.4}", p.center, p.scale));
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_serve_reads_server_env() {
        let cli = Cli::command();
        let serve = cli.find_subcommand("serve").unwrap();
        let env_of = |id: &str| {
            serve
                .get_arguments()
                .find(|a| a.get_id() == id)
                .and_then(|a| a.get_env())
                .map(|e| e.to_string_lossy().into_owned())
        };
        assert_eq!(env_of("host").as_deref(), Some("API_HOST"));
        assert_eq!(env_of("port").as_deref(), Some("API_PORT"));
        assert_eq!(env_of("model").as_deref(), Some("MODEL_PATH"));
    }

    #[test]
    fn test_serve_flags_parse() {
        let cli = Cli::try_parse_from(["readmit", "serve", "--port", "8081", "--host", "127.0.0.1"]).unwrap();
        match cli.command {
            Commands::Serve { port, host, .. } => {
                assert_eq!(port, 8081);
                assert_eq!(host, "127.0.0.1");
            }
            _ => panic!("expected serve"),
        }
    }
}
