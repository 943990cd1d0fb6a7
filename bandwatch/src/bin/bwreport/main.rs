/*
 *     Copyright 2025 The Bandwatch Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use bandwatch::accounting::Decision;
use bandwatch::monitor::Monitor;
use bandwatch::notifier::Notifier;
use bandwatch::tracing::init_tracing;
use bandwatch_config::bwdaemon::{default_bandwatch_config_path, Config};
use bandwatch_config::bwreport::{default_bwreport_log_dir, NAME};
use bandwatch_storage::Storage;
use bandwatch_util::fmt::format_bytes;
use bandwatch_util::net::CounterSource;
use bandwatch_util::shutdown;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, Level};

#[derive(Debug, Parser)]
#[command(
    name = NAME,
    author,
    version,
    about = "bwreport runs one accounting pass and reports the usage",
    long_about = "Runs a single accounting pass against the persisted baseline: on the first run \
    it records the baseline, on later runs it posts the usage accrued in the current month to the \
    configured Discord webhook."
)]
struct Args {
    #[arg(
        short = 'c',
        long = "config",
        default_value_os_t = default_bandwatch_config_path(),
        help = "Specify config file to use")
    ]
    config: PathBuf,

    #[arg(
        short = 'l',
        long,
        default_value = "error",
        help = "Set the logging level [trace, debug, info, warn, error]"
    )]
    log_level: Level,

    #[arg(
        long,
        default_value_os_t = default_bwreport_log_dir(),
        help = "Specify the log directory"
    )]
    log_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Parse command line arguments.
    let args = Args::parse();

    // Initialize tracing.
    let _guards = init_tracing(NAME, &args.log_dir, args.log_level);

    // Run the accounting pass.
    if let Err(err) = run(&args).await {
        error!("accounting pass failed: {}", err);
        eprintln!("{}: {}", NAME, err);
        std::process::exit(1);
    }

    Ok(())
}

/// run executes one accounting pass and prints the outcome.
async fn run(args: &Args) -> bandwatch_core::Result<()> {
    let config = Arc::new(Config::load(&args.config).await?);

    let shutdown = shutdown::Shutdown::default();
    let (shutdown_complete_tx, _shutdown_complete_rx) = mpsc::unbounded_channel();

    let storage = Arc::new(Storage::new(&config.stats_file));
    let counter_source = CounterSource::new(&config.interface);
    let notifier = Arc::new(Notifier::new(config.clone())?);
    let monitor = Monitor::new(
        config.clone(),
        storage,
        counter_source,
        notifier,
        shutdown,
        shutdown_complete_tx,
    )?;

    let now = monitor.now();
    match monitor.run_once(now).await? {
        Decision::Skip => {
            println!("started accounting {} from now", config.interface);
        }
        Decision::ResetDetected => {
            println!(
                "counter reset detected on {}, accounting restarted from now",
                config.interface
            );
        }
        Decision::Report(report) => {
            println!(
                "{}: rx {}, tx {}, total {}",
                config.interface,
                format_bytes(report.used_rx),
                format_bytes(report.used_tx),
                format_bytes(report.used_total)
            );
        }
    }

    Ok(())
}
