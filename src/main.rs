use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tracing::error;

use mailrelay::config::RelayConfig;
use mailrelay::error::ConfigError;
use mailrelay::relay::Relay;
use mailrelay::storage::HttpObjectStore;
use mailrelay::transport::{ApiTransport, SmtpRelay, Transport};

#[derive(Clone)]
struct AppState {
    relay: Arc<Relay>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = RelayConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let listen_port: u16 = std::env::var("RELAY_LISTEN_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    eprintln!("📧 Mail Relay v{}", env!("CARGO_PKG_VERSION"));

    let transport: Arc<dyn Transport> = if let Some(smtp) = &config.smtp {
        eprintln!("   Transport: SMTP ({}:{})", smtp.host, smtp.port);
        Arc::new(SmtpRelay::new(smtp)?)
    } else if let Some(api) = &config.api {
        eprintln!("   Transport: API ({})", api.endpoint);
        Arc::new(ApiTransport::new(api))
    } else {
        return Err(ConfigError::MissingRequired {
            key: "RELAY_SMTP_HOST or RELAY_API_ENDPOINT".into(),
            hint: "Configure an SMTP relay or an outbound email API".into(),
        }
        .into());
    };

    eprintln!("   Store: {}", config.store_endpoint);
    eprintln!(
        "   Destinations: {}",
        if config.filter.destinations.is_empty() {
            "none (forwarding disabled)".to_string()
        } else {
            config.filter.destinations.join(", ")
        }
    );
    eprintln!("   Events: http://0.0.0.0:{listen_port}/events\n");

    let store = Arc::new(HttpObjectStore::new(config.store_endpoint.clone()));
    let relay = Arc::new(Relay::new(store, transport, config.filter.clone()));

    let app = Router::new()
        .route("/events", post(handle_events))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(AppState { relay });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{listen_port}")).await?;
    tracing::info!(port = listen_port, "Relay listening");
    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_events(State(state): State<AppState>, body: String) -> (StatusCode, &'static str) {
    match state.relay.handle_event(&body).await {
        Ok(()) => (StatusCode::OK, "Executed"),
        Err(e) => {
            error!(error = %e, "Event handling failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error on execution")
        }
    }
}
