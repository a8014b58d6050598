mod config;
mod session;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use jyotish_store::{MessageStore, seed};
use jyotish_types::ChatCommand;

use config::Config;
use session::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging; stdout carries the event stream
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jyotish=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;

    let history = match &config.seed_path {
        Some(path) => seed::load_seed_file(path)?,
        None => seed::seed_messages(),
    };
    let store = MessageStore::new(history, config.event_capacity);
    let mut session = Session::new(store, config.astrologer.clone());

    info!(
        "Session with {} started ({} messages in history)",
        config.astrologer,
        session.store().len()
    );
    for line in session.transcript() {
        debug!("{}", line);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command: ChatCommand = match serde_json::from_str(line) {
            Ok(command) => command,
            Err(e) => {
                warn!("Skipping malformed command: {}", e);
                continue;
            }
        };

        for event in session.apply(command) {
            let mut out = serde_json::to_string(&event)?;
            out.push('\n');
            stdout.write_all(out.as_bytes()).await?;
        }
        stdout.flush().await?;
    }

    info!("Session ended with {} messages", session.store().len());
    Ok(())
}
