// src/admin/mod.rs
//! Local admin dashboard: dataset status plus pull and push buttons.

mod error;
mod handlers;

pub use error::AdminError;
pub use handlers::{ActionForm, DatasetCard};

use crate::error::AppError;
use crate::sync::SyncService;
use axum::routing::{get, post};
use axum::Router;
use handlebars::Handlebars;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

const DASHBOARD_TEMPLATE: &str = "admin";
const MAX_MESSAGES: usize = 20;

/// State shared by all admin handlers.
pub struct AdminState {
    sync: SyncService,
    templates: Handlebars<'static>,
    /// Outcomes of recent actions, newest first.
    messages: Mutex<VecDeque<String>>,
}

impl AdminState {
    pub fn new(sync: SyncService) -> Result<Self, AppError> {
        let mut templates = Handlebars::new();
        templates.set_strict_mode(false);
        templates.register_template_string(
            DASHBOARD_TEMPLATE,
            include_str!("../../templates/admin.hbs"),
        )?;

        Ok(Self {
            sync,
            templates,
            messages: Mutex::new(VecDeque::new()),
        })
    }

    async fn record_message(&self, message: String) {
        let mut messages = self.messages.lock().await;
        messages.push_front(message);
        messages.truncate(MAX_MESSAGES);
    }
}

/// Builds the admin router.
pub fn router(state: Arc<AdminState>) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/admin", get(handlers::dashboard))
        .route("/status", get(handlers::status))
        .route("/action", post(handlers::run_action))
        .with_state(state)
}

/// Serves the dashboard until Ctrl-C.
pub async fn serve(state: Arc<AdminState>, host: &str, port: u16) -> Result<(), AppError> {
    let address = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    log::info!("Admin dashboard listening on http://{}", address);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Could not install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received, stopping admin server");
}
