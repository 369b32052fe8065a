use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mealbridge::store::postgres::PgStore;
use mealbridge::{api, auth, cli, config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "mealbridge=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => run_server(cfg, port).await,
        Some(cli::Commands::Account { command }) => {
            let db = PgStore::connect(&cfg.database_url).await?;
            handle_account_command(&db, command).await
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Connecting to database...");
    let db = PgStore::connect(&cfg.database_url).await?;

    tracing::info!("Running migrations...");
    db.migrate().await?;

    let state = Arc::new(AppState { db, config: cfg });

    let app = axum::Router::new()
        // Health endpoint (no auth)
        .route("/healthz", axum::routing::get(|| async { "ok" }))
        .nest("/api", api::api_router(state.clone()))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        // Restrict CORS origins (reads FRONTEND_ORIGIN env var, defaults to localhost for dev)
        .layer({
            use axum::http::{HeaderName, Method};
            use tower_http::cors::AllowOrigin;
            let frontend_origin = std::env::var("FRONTEND_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string());
            CorsLayer::new()
                .allow_origin(AllowOrigin::predicate(move |origin, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str == frontend_origin
                        || origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                }))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    HeaderName::from_static("content-type"),
                    HeaderName::from_static("authorization"),
                ])
        })
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn(security_headers_middleware));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("mealbridge listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Middleware: injects a unique X-Request-Id into every response.
/// This allows clients to correlate errors with server logs.
async fn request_id_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = axum::http::HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}

/// Middleware: injects security headers into every response.
async fn security_headers_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();

    headers.insert("X-Content-Type-Options", "nosniff".parse().unwrap());
    headers.insert("X-Frame-Options", "DENY".parse().unwrap());
    headers.insert("Cache-Control", "no-store".parse().unwrap());
    headers.insert("Referrer-Policy", "no-referrer".parse().unwrap());
    headers.remove("Server");

    resp
}

async fn handle_account_command(
    db: &PgStore,
    cmd: cli::AccountCommands,
) -> anyhow::Result<()> {
    use mealbridge::models::account::{NewAccount, Role};

    match cmd {
        cli::AccountCommands::Create {
            name,
            email,
            password,
            role,
            phone,
            address,
            organization,
        } => {
            let role = Role::parse(&role)
                .ok_or_else(|| anyhow::anyhow!("invalid role: {}. Must be 'donor' or 'recipient'", role))?;
            let password_hash = auth::password::hash(&password)?;

            let account = db
                .insert_account(&NewAccount {
                    name,
                    email,
                    password_hash,
                    role,
                    phone,
                    address,
                    organization_name: organization,
                })
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;

            println!(
                "Account created:\n  ID:    {}\n  Email: {}\n  Role:  {}",
                account.id, account.email, account.role
            );
        }
        cli::AccountCommands::List => {
            let accounts = db.list_accounts().await.map_err(|e| anyhow::anyhow!("{}", e))?;
            if accounts.is_empty() {
                println!("No accounts found.");
            } else {
                println!("{:<38} {:<28} {:<10} CREATED", "ID", "EMAIL", "ROLE");
                for a in accounts {
                    println!(
                        "{:<38} {:<28} {:<10} {}",
                        a.id,
                        a.email,
                        a.role,
                        a.created_at.format("%Y-%m-%d")
                    );
                }
            }
        }
    }
    Ok(())
}
