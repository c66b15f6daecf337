mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::bail;
use axum::http::{
    Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use clap::{Parser, Subcommand};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use skills_api::{AppStateInner, routes};
use skills_clients::local_auth::sign_token;
use skills_clients::{GeminiClient, GoTrueIdentity, LocalIdentity};
use skills_core::feed::FeedHub;
use skills_core::ports::IdentityProvider;
use skills_db::{Database, SqliteStore};

use crate::config::{Config, IdentityConfig};

#[derive(Parser)]
#[command(name = "skills", about = "SkillsConnect API server", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Print an access token signed with SKILLS_JWT_SECRET
    MintToken {
        user_id: Uuid,
        email: String,

        /// Role claim, e.g. admin or service_role
        #[arg(long, default_value = "admin")]
        role: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skills=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    if let Some(Command::MintToken {
        user_id,
        email,
        role,
    }) = cli.command
    {
        let IdentityConfig::Local { jwt_secret } = &config.identity else {
            bail!("mint-token needs the built-in identity provider; unset SKILLS_AUTH_URL");
        };
        println!("{}", sign_token(jwt_secret, user_id, &email, &role)?);
        return Ok(());
    }

    // Init database, publishing committed inserts to the in-process feed
    let feed = FeedHub::new();
    let db = Database::open(&config.db_path)?.with_feed(feed.clone());
    let store = Arc::new(SqliteStore::new(Arc::new(db)));

    let identity: Arc<dyn IdentityProvider> = match &config.identity {
        IdentityConfig::Local { jwt_secret } => {
            info!("Using built-in identity provider");
            Arc::new(LocalIdentity::new(store.clone(), jwt_secret.clone()))
        }
        IdentityConfig::Hosted {
            url,
            anon_key,
            service_key,
        } => {
            info!("Using hosted identity provider at {}", url);
            if service_key.is_none() {
                warn!("SKILLS_AUTH_SERVICE_KEY is not set; token checks use the anon key");
            }
            Arc::new(GoTrueIdentity::new(url.clone(), anon_key.clone()).with_service_key(service_key.clone()))
        }
    };

    let api_key = config.gemini_api_key.clone().unwrap_or_else(|| {
        warn!("GEMINI_API_KEY is not set; AI matching requests will fail");
        String::new()
    });
    let generator = GeminiClient::new(api_key, config.ai_model.clone());
    info!("AI matching uses model {}", generator.model());

    let state = AppStateInner::new(store, Arc::new(feed), identity, Arc::new(generator))
        .with_heartbeat(config.heartbeat);

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(false);

    let app = routes::router(Arc::new(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("SkillsConnect listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
