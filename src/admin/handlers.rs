// src/admin/handlers.rs
use super::{AdminError, AdminState, DASHBOARD_TEMPLATE};
use crate::datasets::{select_datasets, DatasetSpec, DATASETS};
use crate::sync::DatasetStatus;
use axum::extract::{Form, State};
use axum::response::{Html, Redirect};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Body of `POST /action`.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionForm {
    pub action: String,
    pub dataset: String,
    /// Present (as `on`) when the reset checkbox is ticked.
    #[serde(default)]
    pub reset: Option<String>,
}

/// One dataset as shown on the dashboard and in `/status`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DatasetCard {
    Ready(DatasetStatus),
    Failed {
        key: &'static str,
        label: &'static str,
        description: &'static str,
        notes: &'static [&'static str],
        export_path: String,
        error: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdminAction {
    Pull,
    Push,
    Rehost,
}

pub(crate) async fn dashboard(
    State(state): State<Arc<AdminState>>,
) -> Result<Html<String>, AdminError> {
    let cards = collect_cards(&state).await;
    let messages: Vec<String> = state.messages.lock().await.iter().cloned().collect();

    let html = state.templates.render(
        DASHBOARD_TEMPLATE,
        &json!({
            "datasets": cards,
            "messages": messages,
            "images_hosted": !state.sync.resolver().is_passthrough(),
        }),
    )?;
    Ok(Html(html))
}

pub(crate) async fn status(State(state): State<Arc<AdminState>>) -> Json<Vec<DatasetCard>> {
    Json(collect_cards(&state).await)
}

pub(crate) async fn run_action(
    State(state): State<Arc<AdminState>>,
    Form(form): Form<ActionForm>,
) -> Result<Redirect, AdminError> {
    let action = match form.action.as_str() {
        "pull" => AdminAction::Pull,
        "push" => AdminAction::Push,
        "rehost" => AdminAction::Rehost,
        other => return Err(AdminError::BadRequest(format!("unknown action '{}'", other))),
    };
    let datasets =
        select_datasets(&form.dataset).map_err(|e| AdminError::BadRequest(e.to_string()))?;
    let reset = form.reset.is_some_and(|value| !value.is_empty());

    for spec in datasets {
        let message = run_one(&state, action, spec, reset).await;
        state.record_message(message).await;
    }

    Ok(Redirect::to("/"))
}

async fn run_one(state: &AdminState, action: AdminAction, spec: &DatasetSpec, reset: bool) -> String {
    match action {
        AdminAction::Pull => match state.sync.pull(spec, None).await {
            Ok(report) => format!(
                "[{}] pulled {} records into {}",
                spec.key,
                report.records,
                report.path.display()
            ),
            Err(e) => {
                log::error!("Pull failed for {}: {}", spec.key, e);
                format!("[{}] pull failed: {}", spec.key, e)
            }
        },
        AdminAction::Push => match state.sync.push(spec, None, reset).await {
            Ok(report) => format!(
                "[{}] pushed: {} created, {} updated, {} archived",
                spec.key, report.created, report.updated, report.archived
            ),
            Err(e) => {
                log::error!("Push failed for {}: {}", spec.key, e);
                format!("[{}] push failed: {}", spec.key, e)
            }
        },
        AdminAction::Rehost => match state.sync.rehost(spec, None).await {
            Ok(report) => format!(
                "[{}] rehosted images in {} of {} records",
                spec.key, report.updated, report.records
            ),
            Err(e) => {
                log::error!("Rehost failed for {}: {}", spec.key, e);
                format!("[{}] rehost failed: {}", spec.key, e)
            }
        },
    }
}

async fn collect_cards(state: &AdminState) -> Vec<DatasetCard> {
    let mut cards = Vec::with_capacity(DATASETS.len());
    for spec in DATASETS {
        let card = match state.sync.status(spec).await {
            Ok(status) => DatasetCard::Ready(status),
            Err(e) => {
                log::warn!("Status unavailable for {}: {}", spec.key, e);
                DatasetCard::Failed {
                    key: spec.key,
                    label: spec.label,
                    description: spec.description,
                    notes: spec.notes,
                    export_path: state.sync.export_path(spec).display().to_string(),
                    error: e.to_string(),
                }
            }
        };
        cards.push(card);
    }
    cards
}
