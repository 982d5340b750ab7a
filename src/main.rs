use hustle_ledger::config::Config;
use hustle_ledger::server;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hustle_ledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(
        "Starting hustle-ledger {} on {}",
        hustle_ledger::VERSION,
        config.address()
    );

    let (host, port) = (config.host.clone(), config.port);
    let (_state, app) = server::build_app(config).expect("Failed to build application");

    let (actual_port, handle) = server::serve(app, &host, port)
        .await
        .expect("Failed to bind address");
    tracing::info!("Listening on http://{}:{}", host, actual_port);

    handle.await.expect("Server task panicked");
}
