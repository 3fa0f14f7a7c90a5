// src/logging.rs

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` from the config applies,
/// raised one step per `-v`.
pub fn init(level: &str, verbosity: u8) -> anyhow::Result<()> {
    let level = raise(level.parse()?, verbosity);
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!("git_scrolly={}", level.as_str().to_lowercase()))?,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

fn raise(level: Level, steps: u8) -> Level {
    const ORDER: [Level; 5] = [
        Level::ERROR,
        Level::WARN,
        Level::INFO,
        Level::DEBUG,
        Level::TRACE,
    ];
    let at = ORDER.iter().position(|l| *l == level).unwrap_or(2);
    ORDER[(at + steps as usize).min(ORDER.len() - 1)]
}
