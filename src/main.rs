use tokio::net::TcpListener;

use itranswarp::config::load_from_env;
use itranswarp::controllers;
use itranswarp::lifecycle::{signals, Shutdown};
use itranswarp::observability::{logging, metrics};
use itranswarp::AppServer;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_from_env()?;
    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = ?config.environment,
        bind_address = %config.listener.bind_address,
        theme = %config.theme,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = AppServer::builder(config)
        .modules(controllers::registry())
        .build()?;

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    tokio::spawn(signals::trigger_on_signal(shutdown));

    server.run(listener, stop).await?;
    Ok(())
}
