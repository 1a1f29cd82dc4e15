//! Activation Forecast CLI
//!
//! Hourly per-device activation prediction.

use activation_forecast::{
    config::Config,
    core::{predict_activations, resample_hourly, ClassifierAdapter},
    data::{read_readings_from_path, write_hourly, write_predictions, DeviceRegistry},
    VERSION,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "activation-forecast")]
#[command(version = VERSION)]
#[command(about = "Predict hourly device activation from sensor readings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the next 24 hours for every device seen in the input
    Predict {
        /// Current time, e.g. 2020-01-01T23:30:00
        current_time: String,

        /// CSV of past readings (time, device[, device_activated])
        input: PathBuf,

        /// CSV to write predictions to
        output: PathBuf,
    },

    /// Resample raw readings into an hourly activation table
    Resample {
        /// CSV of past readings
        input: PathBuf,

        /// CSV to write the hourly table to
        output: PathBuf,
    },

    /// Serve model-backed predictions over HTTP
    #[cfg(feature = "server")]
    Serve {
        /// Port to bind (defaults to the configured port)
        #[arg(long)]
        port: Option<u16>,

        /// Model bundle (defaults to the configured model path)
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Show configuration
    Config {
        /// Write the default configuration file if none exists
        #[arg(long)]
        init: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Predict {
            current_time,
            input,
            output,
        } => cmd_predict(&current_time, &input, &output),
        Commands::Resample { input, output } => cmd_resample(&input, &output),
        #[cfg(feature = "server")]
        Commands::Serve { port, model } => cmd_serve(port, model),
        Commands::Config { init } => cmd_config(init),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn cmd_predict(current_time: &str, input: &Path, output: &Path) -> anyhow::Result<()> {
    let readings = read_readings_from_path(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let devices = DeviceRegistry::from_readings(&readings);
    tracing::info!(
        readings = readings.len(),
        devices = devices.len(),
        "Loaded readings"
    );

    let classifier = ClassifierAdapter::baseline(readings.len(), &devices);
    let predictions = predict_activations(current_time, &devices, &classifier)?;

    let file = File::create(output).with_context(|| format!("creating {}", output.display()))?;
    write_predictions(BufWriter::new(file), &predictions)?;

    tracing::info!(
        predictions = predictions.len(),
        output = %output.display(),
        "Wrote predictions"
    );
    Ok(())
}

fn cmd_resample(input: &Path, output: &Path) -> anyhow::Result<()> {
    let readings = read_readings_from_path(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let devices = DeviceRegistry::from_readings(&readings);
    let table = resample_hourly(&readings, &devices)?;

    let file = File::create(output).with_context(|| format!("creating {}", output.display()))?;
    write_hourly(BufWriter::new(file), &table)?;

    tracing::info!(rows = table.len(), output = %output.display(), "Wrote hourly table");
    Ok(())
}

#[cfg(feature = "server")]
fn cmd_serve(port: Option<u16>, model: Option<PathBuf>) -> anyhow::Result<()> {
    use activation_forecast::core::ModelBundle;
    use activation_forecast::server::{run, ServerConfig};

    let config = Config::load()?;
    let model_path = model
        .or_else(|| config.model_path.clone())
        .context("no model bundle given; pass --model or set model_path in the config")?;

    let bundle = ModelBundle::load(&model_path)
        .with_context(|| format!("loading model {}", model_path.display()))?;

    let devices = config.device_registry();
    for device in devices.iter() {
        if bundle.vocabulary.device.index_of(device).is_none() {
            tracing::warn!(device, "Configured device is not in the model vocabulary");
        }
    }

    let server_config = ServerConfig::new(
        port.unwrap_or(config.port),
        devices,
        ClassifierAdapter::from_bundle(bundle),
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (addr, shutdown_tx) = run(server_config).await?;
        println!("Serving predictions on http://{addr}");
        println!("Press Ctrl+C to stop");

        tokio::signal::ctrl_c().await?;
        let _ = shutdown_tx.send(());
        Ok::<(), anyhow::Error>(())
    })
}

fn cmd_config(init: bool) -> anyhow::Result<()> {
    let path = Config::config_path();
    if init && !path.exists() {
        Config::default().save()?;
        println!("Wrote default configuration");
    }

    let config = Config::load()?;

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {path:?}");
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
