use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;

mod cmd;
mod config;
mod repl;
mod session;
mod sink;
mod transport;
mod utils;

use cmd::format::{StyleOptions, banner, emoji};
use config::Overrides;
use sink::StdoutSink;
use transport::HttpTransport;

/// infiltr8 - terminal client for the infiltr8 intrusion game.
///
/// Reads one command per line from stdin, sends it to the game service and
/// prints the reply. Commands:
///   scan | whoami | whois <ip> | spoof <ip> | unspoof | cloak | uncloak
///   connect <ip> | pivot <ip> | ls | status | download <file> | cat <file> | help
///
/// Global flags / env:
///   -s / --server   Game service URL (or INFILTR8_SERVER; default http://127.0.0.1:5000)
///   -u / --handle   Hacker handle (or INFILTR8_HANDLE; prompted when absent)
///   -H / --header   Extra HTTP header KEY=VALUE (repeatable)
///   -c / --config   Profile file (JSON or YAML)
///   --json          Emit the terminal log as JSON lines
///   -v / -vv        Increase verbosity (stderr)
///   -q / --quiet    Errors only
///
/// Examples:
///   infiltr8 -u neo
///   infiltr8 -s http://10.1.1.1:5000 -H X-Team=red
///   printf 'scan\nwhoami\n' | infiltr8 -u neo --json
#[derive(Parser, Debug)]
#[command(
    name = "infiltr8",
    version,
    author,
    about = "infiltr8 - terminal client for the infiltr8 network intrusion game"
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all non-error diagnostics
    #[arg(short, long)]
    quiet: bool,

    /// Game service base URL
    #[arg(short = 's', long = "server", value_name = "URL")]
    server: Option<String>,

    /// Hacker handle (prompted when omitted)
    #[arg(short = 'u', long = "handle", value_name = "NAME")]
    handle: Option<String>,

    /// Extra header(s) for every request (repeatable KEY=VALUE)
    #[arg(short = 'H', long = "header", value_name = "KEY=VALUE")]
    headers: Vec<String>,

    /// Profile file with server / handle / headers
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output the terminal log as JSON lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            server: self.server.clone(),
            handle: self.handle.clone(),
            headers: self.headers.clone(),
            config: self.config.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let style = StyleOptions::detect();

    // Flags > env > profile > defaults
    let settings = match config::resolve(cli.overrides(), |k| std::env::var(k).ok()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{} Invalid configuration: {e:#}", emoji("error", &style));
            std::process::exit(2);
        }
    };

    let transport = HttpTransport::new(settings.server.clone(), &settings.headers)?;

    if !cli.json {
        let title = format!("{} infiltr8", emoji("skull", &style));
        let subtitle = format!("server={}", transport.base());
        eprintln!("{}", banner(title.trim(), Some(subtitle), &style));
    }

    let sink = StdoutSink::new(style, cli.json);
    let stdin = BufReader::new(tokio::io::stdin());
    repl::run(stdin, settings.handle, Arc::new(transport), sink).await?;
    Ok(())
}
