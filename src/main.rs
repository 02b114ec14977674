//! emissions-ml — Main Entry Point
//!
//! Three ML experiments over the vehicle-emissions dataset, one subcommand
//! each.

use clap::Parser;
use emissions_ml::cli::{cmd_knn, cmd_linear, cmd_logistic, Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emissions_ml=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Knn { data, neighbors } => {
            cmd_knn(&data.to_string_lossy(), neighbors)?;
        }
        Commands::Logistic { data } => {
            cmd_logistic(&data.to_string_lossy())?;
        }
        Commands::Linear {
            data,
            model_dir,
            batch_limit,
            epoch_limit,
        } => {
            cmd_linear(
                &data.to_string_lossy(),
                &model_dir.to_string_lossy(),
                batch_limit,
                epoch_limit,
            )?;
        }
    }

    Ok(())
}
