//! racha-back binary entrypoint wiring the request gate, the store and the HTTP routes.

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use racha_back::{
    config::{AppConfig, SupabaseConfig},
    dao::racha_store::{RachaStore, memory::MemoryRachaStore},
    gate::RequestGate,
    identity::IdentityProvider,
    routes,
    state::{AppState, SharedState},
};

/// JSON seed loaded into the in-memory store when no database is configured.
const SEED_PATH_ENV: &str = "RACHA_BACK_SEED_PATH";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let (identity, store) = build_backends()?;
    if identity.is_none() {
        warn!(
            policy = ?config.on_missing_config,
            "identity provider not configured; gate follows the missing-config policy"
        );
    }

    let gate = RequestGate::new(identity, config.routes, config.on_missing_config);
    let app_state = AppState::new(store, gate);
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

type Backends = (Option<Arc<dyn IdentityProvider>>, Arc<dyn RachaStore>);

/// Pick the identity provider and the store. Without backend credentials the server
/// runs on an in-memory store and nobody can sign in.
#[cfg(feature = "supabase")]
fn build_backends() -> anyhow::Result<Backends> {
    use racha_back::{
        dao::racha_store::postgrest::PostgrestRachaStore, identity::supabase::SupabaseAuth,
    };

    match SupabaseConfig::from_env() {
        Ok(supabase) => {
            info!(url = %supabase.url, "using managed backend for identity and storage");
            let auth = SupabaseAuth::new(&supabase).context("building auth client")?;
            let store = PostgrestRachaStore::new(&supabase).context("building REST client")?;
            Ok((Some(Arc::new(auth)), Arc::new(store)))
        }
        Err(err) => {
            warn!(error = %err, "managed backend not configured");
            Ok((None, memory_store()?))
        }
    }
}

#[cfg(not(feature = "supabase"))]
fn build_backends() -> anyhow::Result<Backends> {
    if let Err(err) = SupabaseConfig::from_env() {
        warn!(error = %err, "managed backend not configured");
    } else {
        warn!("managed backend configured but the `supabase` feature is disabled");
    }
    Ok((None, memory_store()?))
}

fn memory_store() -> anyhow::Result<Arc<dyn RachaStore>> {
    let store = match env::var(SEED_PATH_ENV) {
        Ok(path) => {
            let path = PathBuf::from(path);
            info!(path = %path.display(), "seeding in-memory store");
            MemoryRachaStore::from_seed_file(&path)
                .with_context(|| format!("loading seed file {}", path.display()))?
        }
        Err(_) => MemoryRachaStore::new(),
    };
    Ok(Arc::new(store))
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "SIGTERM handler unavailable; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
