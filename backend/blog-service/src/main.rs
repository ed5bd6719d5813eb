use actix_cors::Cors;
use actix_middleware::{AuthorizationGate, Logging};
use actix_web::{http::header::HeaderName, App, HttpServer};
use blog_service::db::{
    CommentRepository, InMemoryStore, PgCommentRepository, PgPostRepository, PostRepository,
    MIGRATOR,
};
use blog_service::{AppState, Config};
use crypto_core::jwt::{Identity, TokenSigner, TokenVerifier};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// `issue-token <user-id> <name> [ttl-secs]`: print a token signed with JWT_SECRET
fn issue_token(args: &[String]) -> io::Result<()> {
    let usage = || {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "usage: blog-service issue-token <user-id> <name> [ttl-secs]",
        )
    };

    let id: Uuid = args.first().and_then(|v| v.parse().ok()).ok_or_else(usage)?;
    let name = args.get(1).ok_or_else(usage)?;
    let ttl = match args.get(2) {
        Some(v) => Some(chrono::Duration::seconds(v.parse().map_err(|_| usage())?)),
        None => None,
    };

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "JWT_SECRET must be set"))?;
    let token = TokenSigner::from_secret(&secret)
        .sign(&Identity::new(id, name.as_str()), ttl)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    println!("{}", token);
    Ok(())
}

/// `healthcheck`: probe the local health endpoint, for container healthchecks
async fn healthcheck() -> io::Result<()> {
    let port = std::env::var("BLOG_SERVICE_PORT").unwrap_or_else(|_| "8080".to_string());
    let url = format!("http://127.0.0.1:{}/api/health", port);
    match reqwest::Client::new().get(&url).send().await {
        Ok(resp) if resp.status().is_success() => Ok(()),
        Ok(resp) => {
            eprintln!("healthcheck HTTP status: {}", resp.status());
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck failed"))
        }
        Err(e) => {
            eprintln!("healthcheck HTTP error: {}", e);
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck error"))
        }
    }
}

async fn build_storage(
    config: &Config,
) -> anyhow::Result<(Arc<dyn PostRepository>, Arc<dyn CommentRepository>)> {
    match &config.database.url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await?;
            MIGRATOR.run(&pool).await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                "connected to database"
            );

            Ok((
                Arc::new(PgPostRepository::new(pool.clone())),
                Arc::new(PgCommentRepository::new(pool)),
            ))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory storage");
            let store = InMemoryStore::new();
            Ok((Arc::new(store.clone()), Arc::new(store)))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("issue-token") => return issue_token(&args[1..]),
        Some("healthcheck") => return healthcheck().await,
        _ => {}
    }

    init_tracing();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let header = HeaderName::from_bytes(config.jwt.header.as_bytes()).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid JWT_HEADER '{}': {}", config.jwt.header, e),
        )
    })?;
    let verifier = Arc::new(
        TokenVerifier::from_secret(&config.jwt.secret).with_leeway(config.jwt.leeway_secs),
    );
    let gate = AuthorizationGate::new(verifier).with_header(header);

    let (posts, comments) = match build_storage(&config).await {
        Ok(repos) => repos,
        Err(e) => {
            tracing::error!("Storage initialization failed: {:#}", e);
            eprintln!("ERROR: Failed to initialize storage: {}", e);
            std::process::exit(1);
        }
    };
    let state = AppState::new(posts, comments, gate);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let origins = config.cors_origins();
    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in &origins {
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let state = state.clone();
        App::new()
            .wrap(cors)
            .wrap(Logging)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(|cfg| state.configure(cfg))
    })
    .bind(&bind_address)?
    .run()
    .await
}
