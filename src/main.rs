//! `ceremony`: run a meeting session over stdin.
//!
//! Each input line is either an utterance or a `/command`; each reply is
//! printed as one JSON document per line.
//!
//! Usage: `ceremony [--config <path>] [--item <KEY>]`

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use ceremony_lib::pipeline::Pipeline;
use ceremony_lib::queue::SuggestionQueue;
use ceremony_lib::session::{initial_state, Session};
use ceremony_lib::state::{default_config_path, load_config};
use ceremony_lib::tracker::jira::JiraClient;
use ceremony_lib::tracker::{Tracker, Unconfigured};

struct Args {
    config: Option<PathBuf>,
    item: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        config: None,
        item: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                args.config = Some(iter.next().ok_or("--config requires a path")?.into());
            }
            "--item" => {
                args.item = Some(iter.next().ok_or("--item requires an issue key")?);
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }
    Ok(args)
}

async fn run() -> Result<(), String> {
    let args = parse_args()?;
    let config_path = match args.config {
        Some(p) => p,
        None => default_config_path().map_err(|e| e.to_string())?,
    };
    let config = load_config(&config_path).map_err(|e| e.to_string())?;
    let state = initial_state(&config.project_key, args.item.as_deref())?;

    let tracker: Arc<dyn Tracker> = match JiraClient::new(&config.jira) {
        Ok(client) => {
            match client.fetch_project(&config.project_key).await {
                Ok(project) => log::info!("Session project: {} ({})", project.name, project.key),
                Err(e) => log::warn!("Could not confirm project {}: {}", config.project_key, e),
            }
            Arc::new(client)
        }
        Err(e) => {
            log::warn!("Jira unavailable, suggestions will not validate: {}", e);
            Arc::new(Unconfigured::new(e.to_string()))
        }
    };

    let pipeline = Pipeline::new(tracker, Arc::new(SuggestionQueue::new()), &config.phrases);
    let mut session = Session::new(state, pipeline);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| format!("Failed to read input: {}", e))?
    {
        if let Some(reply) = session.handle_line(&line).await {
            let json = serde_json::to_string(&reply)
                .map_err(|e| format!("Failed to serialize reply: {}", e))?;
            println!("{}", json);
        }
    }

    log::info!(
        "Session ended after {} utterance(s)",
        session.state().transcript_history().len()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
