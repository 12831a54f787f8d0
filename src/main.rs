use std::fs::OpenOptions;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use tracing::info;

use procdiag::config::{Config, OutputConfig, OutputFormat, load_config, load_config_from_path};
use procdiag::diagnostics::{JsonPublisher, LogPublisher, Publisher};
use procdiag::logging;
use procdiag::monitor::ProcessMonitor;
use procdiag::reporter::Reporter;
use procdiag::system::host;
use procdiag::system::sampler::{Sampler, TopSampler};

#[derive(Parser)]
#[command(
    name = "procdiag",
    about = "Report task counts and top CPU/memory processes as diagnostic checks"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Publish period in milliseconds
    #[arg(long)]
    refresh_rate: Option<u64>,

    /// Number of top processes tracked per ranking
    #[arg(long)]
    monitored_process_num: Option<usize>,

    /// Output format: log, json
    #[arg(long)]
    format: Option<String>,

    /// File to append JSON diagnostics to (default: stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Run a single update/publish cycle and exit.
    #[arg(long, default_value_t = false)]
    once: bool,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init(&cli.log_level)?;
    let config = load_config_for_cli(&cli)?;

    // Missing reporting infrastructure is not treated as a failure.
    let Some(hardware_id) = host::hardware_id() else {
        eprintln!("Process monitor is unable to initialize: hostname is unavailable.");
        return Ok(());
    };
    let publisher = match build_publisher(&config.output) {
        Ok(publisher) => publisher,
        Err(err) => {
            eprintln!("Process monitor is unable to initialize: {err}");
            return Ok(());
        }
    };

    let process_num = config.general.monitored_process_num;
    info!(
        node = %host::node_name(&hardware_id),
        monitored_process_num = process_num,
        refresh_rate_ms = config.general.refresh_rate_ms,
        "process monitor started"
    );

    let sampler = TopSampler::new(
        config.sampler.command.as_str(),
        config.sampler.delay.as_str(),
        process_num,
    );
    let monitor = ProcessMonitor::new(sampler, process_num);
    let mut reporter = Reporter::new(monitor, hardware_id, publisher);

    if cli.once {
        reporter.tick()?;
        return Ok(());
    }

    let period = Duration::from_millis(config.general.refresh_rate_ms.max(1));
    run(reporter, period).await
}

async fn run<S: Sampler + 'static>(mut reporter: Reporter<S>, period: Duration) -> Result<()> {
    reporter
        .run_until(period, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
    info!("shutdown requested");
    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(rate) = cli.refresh_rate {
        config.general.refresh_rate_ms = rate;
    }
    if let Some(num) = cli.monitored_process_num {
        config.general.monitored_process_num = num;
    }
    if let Some(ref format) = cli.format {
        config.output.format = OutputFormat::parse(format)
            .ok_or_else(|| eyre!("unknown output format `{format}` (expected log or json)"))?;
    }
    if let Some(ref path) = cli.output {
        config.output.path = path.display().to_string();
    }

    config.validate()?;
    Ok(config)
}

fn build_publisher(output: &OutputConfig) -> Result<Box<dyn Publisher>> {
    let publisher: Box<dyn Publisher> = match output.format {
        OutputFormat::Log => Box::new(LogPublisher),
        OutputFormat::Json => json_publisher(output)?,
    };
    Ok(publisher)
}

fn json_publisher(output: &OutputConfig) -> Result<Box<dyn Publisher>> {
    match output.path() {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| eyre!("cannot open {}: {e}", path.display()))?;
            Ok(Box::new(JsonPublisher::new(file)))
        }
        None => Ok(Box::new(JsonPublisher::new(std::io::stdout()))),
    }
}
