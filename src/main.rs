//! Agromate - terminal dashboard for agricultural market sentiment.

use agromate::{App, Config, config};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The terminal belongs to the UI, so logs go to a daily file
    let log_dir = config::log_dir()?;
    std::fs::create_dir_all(&log_dir)?;
    let (writer, _guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, "agromate.log"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agromate=info".into()),
        )
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    let config = Config::load_or_default()?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting agromate");

    let mut app = App::new(config)?;
    app.run().await?;

    Ok(())
}
