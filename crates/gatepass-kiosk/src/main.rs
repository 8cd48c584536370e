//! # gatepass
//!
//! Maintenance entry point for a kiosk's local store. See [`Cli`] for the
//! available commands.

use clap::Parser;
use gatepass_kiosk::cli::{Cli, Command};
use gatepass_kiosk::{init_tracing, report, GateService, KioskConfig, StatsPoller};
use tracing::info;

/// Audit user id for actions taken from the command line.
const CLI_USER: &str = "cli";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = KioskConfig::from_env();
    if let Some(db) = cli.db.clone() {
        config.db_path = Some(db);
    }
    info!(?config, "Loaded configuration");

    let service = GateService::open(&config)?;

    match cli.selected() {
        Command::Stats => {
            let poller = StatsPoller::spawn(service, config.stats_interval);
            let mut rx = poller.subscribe();
            loop {
                let changed = tokio::select! {
                    changed = rx.changed() => changed,
                    _ = tokio::signal::ctrl_c() => {
                        info!("Received Ctrl+C, shutting down");
                        break;
                    }
                };
                if changed.is_err() {
                    break;
                }

                let stats = *rx.borrow_and_update();
                println!(
                    "today={} active={} pending_sync={}",
                    stats.today, stats.active, stats.pending_sync
                );
            }
            poller.stop();
        }
        Command::Active => {
            for v in service.get_active_visitors().await? {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    v.pass_id,
                    v.name,
                    v.visitor_type,
                    v.host_name,
                    v.check_in_time.with_timezone(&chrono::Local).format("%H:%M")
                );
            }
        }
        Command::Export { today } => {
            let csv = if today {
                service.export_today(CLI_USER).await?
            } else {
                service.export_all(CLI_USER).await?
            };
            match csv {
                Some(csv) => print!("{csv}"),
                None => eprintln!("No visitors to export"),
            }
        }
        Command::Summary => {
            let visitors = service.todays_visitors().await?;
            print!("{}", report::daily_summary_csv(&visitors)?);
        }
        Command::Logs => {
            for log in service.get_logs().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    log.timestamp.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S"),
                    log.action,
                    log.user_id,
                    log.details
                );
            }
        }
    }

    Ok(())
}
