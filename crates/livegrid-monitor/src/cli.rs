use clap::Parser;

/// LiveGrid realtime monitor — tails a realtime endpoint and logs events.
#[derive(Parser, Debug)]
#[command(name = "livegrid-monitor", version, about)]
pub struct Args {
    /// Realtime endpoint URL (e.g. ws://localhost:8080/realtime).
    #[arg(short, long)]
    pub endpoint: String,

    /// User identity to connect as.
    #[arg(short, long)]
    pub user_id: String,

    /// Table to join and watch.
    #[arg(short, long)]
    pub table: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
