//! Readmission risk - main entry point

use clap::Parser;
use readmission_risk::cli::{cmd_engineer, cmd_info, cmd_predict, cmd_serve, cmd_train, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "readmission_risk=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Engineer { data, output, pipeline, scaler, lenient } => {
            cmd_engineer(&data, &output, &pipeline, &scaler, lenient)?;
        }
        Commands::Train { features, pipeline, output, test_size, seed, max_iter } => {
            cmd_train(&features, &pipeline, &output, test_size, seed, max_iter)?;
        }
        Commands::Predict { model, request, json, strategy } => {
            cmd_predict(&model, request.as_deref(), &json, strategy)?;
        }
        Commands::Serve { port, host, model, strategy } => {
            cmd_serve(&host, port, &model, strategy).await?;
        }
        Commands::Info { model } => {
            cmd_info(&model)?;
        }
    }

    Ok(())
}
