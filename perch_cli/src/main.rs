mod command;
mod config;
mod error;
mod state;
mod util;

use dotenvy::dotenv;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use std::process::ExitCode;
use std::sync::Arc;

use insta_client::InstagramClient;
use perch_core::IdentityCache;
use perch_instagram::InstagramSource;

use crate::{command::Command, config::Config, error::ErrorKind, state::AppState};

const QUIET_TARGETS: &[&str] = &["hyper=info", "reqwest=info", "rustls=info"];

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    // 1. Initialize logger
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    for target in QUIET_TARGETS {
        if let Ok(directive) = target.parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run().await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{}", err);
            if err.kind() == ErrorKind::Usage {
                eprintln!("{}", command::USAGE);
            }
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run() -> error::Result<String> {
    // 2. Parse command and configuration
    let command = Command::parse(std::env::args().skip(1))?;
    let config = Config::from_env()?;

    // 3. Initialize client and cache
    let client = InstagramClient::new(config.session_cookie)?;
    let source = InstagramSource::new(client)
        .with_page_delay(config.page_delay)
        .with_max_pages(config.max_pages);
    let own_id = source.own_user_id();
    let state = AppState {
        cache: IdentityCache::shared(),
        source: Arc::new(source),
        own_id,
        bot_filter: Arc::new(config.bot_filter),
        request_delay: config.page_delay,
        max_profile_fetches: config.max_profile_fetches,
    };
    tracing::debug!("Logged in as account {}", own_id);

    // 4. Run
    command::run(&state, command).await
}
