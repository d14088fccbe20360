use std::sync::Arc;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use colored::*;

use framehud::core::engine::{MetricsEngine, MetricsSnapshot};
use framehud::core::modules::{ModuleId, ModuleSet, ModuleToggles};
use framehud::shell::{ShellChannel, DEFAULT_HELPER};

#[tokio::main]
async fn main() -> Result<()> {
    framehud::init_logging();

    let matches = Command::new("framehud")
        .version("0.1.0")
        .about("On-device performance metrics engine for overlay HUDs")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Run the metrics engine and print snapshot updates")
                .arg(
                    Arg::new("modules")
                        .short('m')
                        .long("modules")
                        .value_name("LIST")
                        .help("Comma-separated modules to enable (cpu,ram,net,temp,thermal,ping)")
                        .default_value("cpu,ram,net,temp,thermal,ping"),
                )
                .arg(
                    Arg::new("helper")
                        .long("helper")
                        .value_name("PROGRAM")
                        .help("Helper program used for privileged commands")
                        .default_value(DEFAULT_HELPER),
                )
                .arg(
                    Arg::new("privileged")
                        .long("privileged")
                        .help("Authorize privileged helper commands")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print snapshots as JSON lines")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("modules").about("List toggleable module identifiers"))
        .get_matches();

    match matches.subcommand() {
        Some(("run", sub)) => run(sub).await,
        Some(("modules", _)) => {
            for id in ModuleId::ALL {
                println!("{id}");
            }
            Ok(())
        }
        _ => unreachable!("subcommand required"),
    }
}

async fn run(args: &clap::ArgMatches) -> Result<()> {
    let modules = parse_modules(args.get_one::<String>("modules").unwrap())?;
    let helper = args.get_one::<String>("helper").unwrap();
    let privileged = args.get_flag("privileged");
    let json = args.get_flag("json");

    let channel = Arc::new(ShellChannel::new(helper));
    channel.init();
    if privileged {
        channel.set_permitted(true);
    }
    let state = channel.state();
    log::info!(
        "helper '{}': available={} permitted={}",
        helper,
        state.available,
        state.permitted
    );

    let toggles = ModuleToggles::new(modules);
    let engine = MetricsEngine::start(Arc::clone(&channel), toggles.subscribe());
    let mut snapshot_rx = engine.snapshot();

    loop {
        tokio::select! {
            changed = snapshot_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = *snapshot_rx.borrow_and_update();
                if json {
                    println!("{}", serde_json::to_string(&snapshot)?);
                } else {
                    print_snapshot(&snapshot);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("shutting down");
                engine.shutdown();
                break;
            }
        }
    }
    Ok(())
}

fn parse_modules(list: &str) -> Result<ModuleSet> {
    let mut set = ModuleSet::new();
    for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        set.insert(token.parse::<ModuleId>()?);
    }
    Ok(set)
}

fn print_snapshot(s: &MetricsSnapshot) {
    println!(
        "{} {:>3}  {} {:>4} MHz  {} {:>4.1}/{:<4.1} GB  {} {:>7.1}/{:<7.1} KB/s  {} {:>4.1} C  {} {:>3} ms  {}",
        "FPS".bold(),
        s.fps,
        "CPU".bold(),
        s.cpu_mhz,
        "RAM".bold(),
        s.ram_used_gb,
        s.ram_total_gb,
        "NET".bold(),
        s.net_rx_kbps,
        s.net_tx_kbps,
        "TEMP".bold(),
        s.battery_temp_c,
        "PING".bold(),
        s.ping_ms,
        if s.thermal_throttling {
            "THROTTLING".red().bold()
        } else {
            "".normal()
        },
    );
}
