use anyhow::Context;
use axum::Router;
use axum::extract::State;
use axum::routing::get;
use dotenv::dotenv;
use log::info;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;
use tokio::net::TcpListener;

mod api;
mod app_env;
mod domain;
mod dto;
mod external_connections;
mod logging;
mod persistence;
mod routing_utils;

/// Contains clients for external systems, shared across request handlers
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
}

type AppState = State<Arc<SharedData>>;

/// The port the server listens on when [app_env::PORT] isn't set
const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();
    logging::setup_logging(logging::init_env_filter());

    let db_url = env::var(app_env::DB_URL)
        .with_context(|| format!("reading {} from the environment", app_env::DB_URL))?;
    let port = match env::var(app_env::PORT) {
        Ok(raw_port) => raw_port
            .parse::<u16>()
            .with_context(|| format!("parsing {} as a port number", app_env::PORT))?,
        Err(_) => DEFAULT_PORT,
    };

    let db_pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&db_url)
        .await
        .context("connecting to the database")?;
    let ext_cxn = persistence::ExternalConnectivity::new(db_pool);
    let shared_data = Arc::new(SharedData { ext_cxn });

    let router = Router::new()
        .route("/", get(|| async { "Todo API Root" }))
        .merge(api::todo::todo_routes())
        .merge(api::user::user_routes())
        .merge(api::swagger_main::build_documentation())
        .with_state(shared_data);
    let router = logging::attach_tracing_http(router);

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("binding to port {port}"))?;
    info!("Starting server on port {port}.");
    axum::serve(listener, router)
        .await
        .context("running the HTTP server")?;

    Ok(())
}
