//! CalcVault - scientific calculator with notes, history and a file vault.

use calcvault_app::{run, Config, Session};
use tokio::io::{stdin, stdout, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with the calculator screen
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calcvault=info,calcvault_app=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!(
        data_dir = %config.data_dir.display(),
        angle_mode = %config.angle_mode,
        "Starting CalcVault"
    );

    let (session, timeouts) = Session::open(&config)?;
    run(session, timeouts, BufReader::new(stdin()), stdout()).await?;

    Ok(())
}
