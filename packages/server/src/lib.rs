#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the proximity dashboard.
//!
//! Loads the proximity tables once at startup, hosts a single
//! [`InteractionController`], and exposes its view models and event entry
//! point over a small JSON API. The frontend's static files are served from
//! the same process.

mod handlers;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use proximity_crossfilter::InteractionController;
use proximity_dataset::DatasetStore;
use proximity_dataset::loader::{self, DatasetPaths};

/// Shared application state.
pub struct AppState {
    /// The loaded tables, read-only for the life of the process.
    pub store: Arc<DatasetStore>,
    /// Owner of the selection. The lock makes each event batch run to
    /// completion before the next one starts.
    pub controller: Mutex<InteractionController>,
}

impl AppState {
    /// Wraps a store and a controller built from it.
    #[must_use]
    pub fn new(store: Arc<DatasetStore>, controller: InteractionController) -> Self {
        Self {
            store,
            controller: Mutex::new(controller),
        }
    }

    /// Locks the controller.
    ///
    /// # Panics
    ///
    /// Panics if the `Mutex` is poisoned.
    pub fn controller(&self) -> MutexGuard<'_, InteractionController> {
        self.controller
            .lock()
            .expect("Interaction controller mutex poisoned")
    }
}

/// Server settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind (`BIND_ADDR`, default `127.0.0.1`).
    pub bind_addr: String,
    /// Port to bind (`PORT`, default `8080`).
    pub port: u16,
    /// Directory holding the dataset files (`DATA_DIR`, default `data`).
    pub data_dir: PathBuf,
    /// Directory holding the built frontend (`STATIC_DIR`, default
    /// `app/dist`).
    pub static_dir: PathBuf,
}

impl ServerConfig {
    /// Reads settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            data_dir: lookup("DATA_DIR").map_or_else(|| PathBuf::from("data"), PathBuf::from),
            static_dir: lookup("STATIC_DIR")
                .map_or_else(|| PathBuf::from("app/dist"), PathBuf::from),
        }
    }
}

/// Registers the `/api` routes.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/amenities", web::get().to(handlers::amenities))
            .route("/selection", web::get().to(handlers::selection))
            .route("/map", web::get().to(handlers::map))
            .route("/distribution", web::get().to(handlers::distribution))
            .route("/blocks", web::get().to(handlers::blocks))
            .route("/events", web::post().to(handlers::events)),
    );
}

/// Starts the proximity API server.
///
/// Loads the dataset from `DATA_DIR`, builds the initial view models, and
/// starts the Actix-Web HTTP server. This is a regular async function;
/// the caller is responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if the dataset cannot be loaded or cannot produce the initial
/// view models.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env();

    log::info!("Loading dataset from {}...", config.data_dir.display());
    let store = Arc::new(
        loader::load(&DatasetPaths::in_dir(&config.data_dir)).expect("Failed to load dataset"),
    );

    log::info!("Building initial view models...");
    let controller = InteractionController::new(Arc::clone(&store))
        .expect("Dataset cannot produce the initial view models");

    let state = web::Data::new(AppState::new(store, controller));
    let static_dir = config.static_dir.clone();

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
            // Serve frontend static files (production)
            .service(Files::new("/", &static_dir).index_file("index.html"))
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
