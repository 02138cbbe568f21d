use crate::gate::Overlay;
use crate::state::Retention;
use clap::{Args, Parser, Subcommand};
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "overlay-live", about = "Live broadcast overlay feed client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one overlay session and log what it would render.
    Watch(WatchArgs),
    /// Serve a scripted live feed for overlay testing.
    Demo(DemoArgs),
}

#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    #[arg(long, value_enum, default_value = "dota-stats")]
    pub overlay: Overlay,

    /// Streamer auth token; also used as the channel key.
    #[arg(long, env = "OVERLAY_AUTH")]
    pub auth: String,

    #[arg(long, env = "OVERLAY_WS_BASE", default_value = "ws://127.0.0.1:9002")]
    pub ws_base: String,

    #[arg(long, env = "OVERLAY_API_BASE", default_value = "http://127.0.0.1:9002")]
    pub api_base: String,

    /// Keep only the newest N messages instead of the whole session log.
    #[arg(
        long,
        conflicts_with = "latest_only",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub max_messages: Option<u64>,

    /// Keep only the newest message of each kind.
    #[arg(long)]
    pub latest_only: bool,
}

impl WatchArgs {
    pub fn retention(&self) -> Retention {
        match (self.max_messages, self.latest_only) {
            (Some(cap), _) => Retention::MaxMessages(cap as usize),
            (None, true) => Retention::LatestPerType,
            (None, false) => Retention::Unbounded,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct DemoArgs {
    #[arg(long, default_value = "127.0.0.1:9002")]
    pub bind: String,

    /// Delay between scripted frames.
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,
}

impl DemoArgs {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
