use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use quiz_backend::{
    config::{get_config, init_config, Config, LogFormat, StoreBackend},
    database::pool::create_pool,
    routes,
    services::session_service::SessionSettings,
    store::{InMemoryQuizStore, PgQuizStore, QuizStore, RestQuizStore},
    AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SWEEP_EVERY: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    init_tracing(config.log_format);

    let store = build_store(config).await?;
    let settings = SessionSettings {
        default_time_limit_secs: config.question_time_limit_secs,
        idle_ttl: Duration::from_secs(config.session_ttl_minutes.max(1) as u64 * 60),
        ..SessionSettings::default()
    };
    let app_state = AppState::new(store, settings);
    app_state.session_service.spawn_sweeper(SWEEP_EVERY);

    let app = routes::build_router(
        app_state,
        config.public_rps,
        config.cors_allowed_origin.as_deref(),
    );

    let listener = TcpListener::bind(&config.server_address)
        .await
        .with_context(|| format!("failed to bind {}", config.server_address))?;
    info!(address = %config.server_address, backend = ?config.store_backend, "server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quiz_backend=info,tower_http=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn QuizStore>> {
    let store: Arc<dyn QuizStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            Arc::new(PgQuizStore::new(create_pool(url).await?))
        }
        StoreBackend::Rest => {
            let url = config
                .data_api_url
                .as_deref()
                .context("DATA_API_URL is required for the rest backend")?;
            let key = config
                .data_api_key
                .clone()
                .context("DATA_API_KEY is required for the rest backend")?;
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()?;
            Arc::new(RestQuizStore::new(client, url, key)?)
        }
        StoreBackend::Memory => {
            info!("using in-memory store with sample quizzes");
            Arc::new(InMemoryQuizStore::seeded())
        }
    };
    Ok(store)
}
