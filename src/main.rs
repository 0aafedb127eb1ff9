mod app;
mod cli;
mod config;
mod db;
mod error;
mod feed;
mod models;
mod services;

#[cfg(test)]
mod test_support;

use app::App;
use cli::Command;
use config::Config;
use error::{AppError, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (info and above unless RUST_LOG says otherwise)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => exit_with(e),
    };

    if command == Command::Help {
        println!("{}", cli::USAGE);
        return Ok(());
    }

    // Load configuration
    let config = Config::load()?;
    tracing::debug!("Using database at {}", config.db_path);

    let app = App::new(config).await?;
    match app.handle(command).await {
        Err(e) if e.user_exit_code().is_some() => exit_with(e),
        result => result,
    }
}

fn exit_with(e: AppError) -> ! {
    eprintln!("{}", e);
    std::process::exit(e.user_exit_code().unwrap_or(1));
}
