//! parkwatch-replay: run a recorded sensor trace through the parking
//! controller and print each state change as a JSON line on stdout.

mod player;
mod trace;

use anyhow::Context;
use clap::Parser;
use parkwatch_controller::ControllerConfig;
use parkwatch_events::{event_names, ParkingStateEvent, TracingLogger};
use player::Rig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "parkwatch-replay", version, about)]
struct Args {
    /// JSON-lines trace of location, transition and activity samples
    trace: PathBuf,

    /// Controller configuration (JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sleep between entries according to their at_ms offsets
    #[arg(long, default_value_t = false)]
    realtime: bool,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ControllerConfig> {
    let Some(path) = path else {
        return Ok(ControllerConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,parkwatch=debug")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let entries = trace::load_trace(&args.trace)?;
    tracing::info!(
        trace = %args.trace.display(),
        entries = entries.len(),
        realtime = args.realtime,
        "replaying trace"
    );

    let rig = Rig::new(config, Arc::new(TracingLogger)).context("invalid configuration")?;
    rig.controller.set_state_callback(|state| {
        let event = ParkingStateEvent::now(state);
        match serde_json::to_string(&event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::error!(
                event = event_names::PARKING_STATE_CHANGED,
                "failed to encode event: {e}"
            ),
        }
    });
    rig.controller.start().context("failed to start controller")?;

    let delivered = player::play(&rig, &entries, args.realtime);
    let final_state = rig.controller.current_state();
    rig.controller.stop();

    tracing::info!(
        delivered,
        %final_state,
        broadcasts = rig.broadcast.published().len(),
        notification_updates = rig.notifications.updates().len(),
        foreground_exits = rig.lifecycle.exit_count(),
        "replay finished"
    );
    Ok(())
}
