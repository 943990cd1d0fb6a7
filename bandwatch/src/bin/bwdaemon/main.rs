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

use bandwatch::monitor::Monitor;
use bandwatch::notifier::Notifier;
use bandwatch::tracing::init_tracing;
use bandwatch_config::bwdaemon::{
    default_bandwatch_config_path, default_bwdaemon_log_dir, Config, NAME,
};
use bandwatch_storage::Storage;
use bandwatch_util::net::CounterSource;
use bandwatch_util::shutdown;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, Level};

#[derive(Debug, Parser)]
#[command(
    name = NAME,
    author,
    version,
    about = "bwdaemon is a monthly network usage digest daemon",
    long_about = "A daemon that accounts the traffic of a network interface per calendar month. \
    It keeps a baseline of the interface's cumulative counters, survives counter resets across \
    reboots, and posts each month's received, transmitted and total usage to a Discord webhook."
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
        default_value = "info",
        help = "Set the logging level [trace, debug, info, warn, error]"
    )]
    log_level: Level,

    #[arg(
        long,
        default_value_os_t = default_bwdaemon_log_dir(),
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

    // Load config.
    let config = Config::load(&args.config).await.map_err(|err| {
        error!("failed to load config: {}", err);
        err
    })?;
    let config = Arc::new(config);
    info!(
        "accounting interface {} into {}",
        config.interface,
        config.stats_file.display()
    );

    // Initialize the channels to drain tasks on shutdown.
    let shutdown = shutdown::Shutdown::default();
    let (shutdown_complete_tx, mut shutdown_complete_rx) = mpsc::unbounded_channel();

    // Initialize the accounting monitor.
    let storage = Arc::new(Storage::new(&config.stats_file));
    let counter_source = CounterSource::new(&config.interface);
    let notifier = Arc::new(Notifier::new(config.clone())?);
    let monitor = Monitor::new(
        config,
        storage,
        counter_source,
        notifier,
        shutdown.clone(),
        shutdown_complete_tx.clone(),
    )?;

    // Start the accounting monitor.
    let monitor_handle = tokio::spawn(async move { monitor.run().await });

    // Wait for the monitor to exit or a shutdown signal.
    tokio::select! {
        _ = monitor_handle => {
            info!("monitor exited");
        }
        _ = shutdown::shutdown_signal() => {}
    }

    // Trigger shutdown and wait for the tasks to drain.
    shutdown.trigger();
    drop(shutdown_complete_tx);
    let _ = shutdown_complete_rx.recv().await;

    Ok(())
}
