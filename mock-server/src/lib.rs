use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

const KNOWN_KINDS: [&str; 5] = ["card", "sticker", "shape", "text", "line"];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Assignee {
    pub user_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    pub background_color: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Actor {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub editable: bool,
}

/// A widget as stored and served by the mock.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Value>,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale: f64,
    pub assignee: Assignee,
    pub style: Style,
    pub created_at: DateTime<Utc>,
    pub created_by: Actor,
    pub modified_at: DateTime<Utc>,
    pub modified_by: Actor,
    pub capabilities: Capabilities,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WidgetCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub size: usize,
    pub data: Vec<Widget>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    pub code: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Deserialize)]
#[serde(default)]
pub struct CreateWidget {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub assignee: Assignee,
    pub style: Style,
}

impl Default for CreateWidget {
    fn default() -> Self {
        Self {
            kind: "card".to_string(),
            title: String::new(),
            description: String::new(),
            date: String::new(),
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            assignee: Assignee::default(),
            style: Style::default(),
        }
    }
}

/// Partial update. Metadata entries are merged per application ID.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct UpdateWidget {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<Assignee>,
    pub style: Option<Style>,
    pub metadata: Option<Map<String, Value>>,
}

pub type Db = Arc<RwLock<HashMap<String, Vec<Widget>>>>;

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorBody>)>;

fn error(status: StatusCode, code: &str, message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            status: status.as_u16(),
            code: code.to_string(),
            message: message.into(),
            kind: "error".to_string(),
        }),
    )
}

fn widget_not_found(widget_id: &str) -> (StatusCode, Json<ErrorBody>) {
    error(
        StatusCode::NOT_FOUND,
        "widgetNotFound",
        format!("Widget {widget_id} not found"),
    )
}

fn bad_body(rejection: JsonRejection) -> (StatusCode, Json<ErrorBody>) {
    error(StatusCode::BAD_REQUEST, "invalidParameters", rejection.body_text())
}

fn mock_user() -> Actor {
    Actor {
        kind: "user".to_string(),
        name: "Mock User".to_string(),
        id: "3074457345618265000".to_string(),
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/boards/{board_id}/widgets", get(list_widgets).post(create_widget))
        .route(
            "/boards/{board_id}/widgets/{widget_id}",
            get(get_widget).patch(update_widget),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_widgets(State(db): State<Db>, Path(board_id): Path<String>) -> Json<WidgetCollection> {
    let boards = db.read().await;
    let data = boards.get(&board_id).cloned().unwrap_or_default();
    Json(WidgetCollection {
        kind: "collection".to_string(),
        size: data.len(),
        data,
    })
}

async fn create_widget(
    State(db): State<Db>,
    Path(board_id): Path<String>,
    input: Result<Json<CreateWidget>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Widget>)> {
    let Json(input) = input.map_err(bad_body)?;
    if !KNOWN_KINDS.contains(&input.kind.as_str()) {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "invalidParameters",
            format!("Unsupported widget type: {}", input.kind),
        ));
    }

    let now = Utc::now();
    let card = (input.kind == "card").then(|| serde_json::json!({ "customFields": [] }));
    let widget = Widget {
        id: Uuid::new_v4().simple().to_string(),
        kind: input.kind,
        title: input.title,
        description: input.description,
        date: input.date,
        card,
        x: input.x,
        y: input.y,
        rotation: 0.0,
        scale: input.scale,
        assignee: input.assignee,
        style: input.style,
        created_at: now,
        created_by: mock_user(),
        modified_at: now,
        modified_by: mock_user(),
        capabilities: Capabilities { editable: true },
        metadata: Map::new(),
    };
    log::debug!("created {} widget {} on board {board_id}", widget.kind, widget.id);
    db.write()
        .await
        .entry(board_id)
        .or_default()
        .push(widget.clone());
    Ok((StatusCode::CREATED, Json(widget)))
}

async fn get_widget(
    State(db): State<Db>,
    Path((board_id, widget_id)): Path<(String, String)>,
) -> ApiResult<Json<Widget>> {
    let boards = db.read().await;
    boards
        .get(&board_id)
        .and_then(|widgets| widgets.iter().find(|w| w.id == widget_id))
        .cloned()
        .map(Json)
        .ok_or_else(|| widget_not_found(&widget_id))
}

async fn update_widget(
    State(db): State<Db>,
    Path((board_id, widget_id)): Path<(String, String)>,
    input: Result<Json<UpdateWidget>, JsonRejection>,
) -> ApiResult<Json<Widget>> {
    let Json(input) = input.map_err(bad_body)?;
    let mut boards = db.write().await;
    let widget = boards
        .get_mut(&board_id)
        .and_then(|widgets| widgets.iter_mut().find(|w| w.id == widget_id))
        .ok_or_else(|| widget_not_found(&widget_id))?;

    if let Some(title) = input.title {
        widget.title = title;
    }
    if let Some(description) = input.description {
        widget.description = description;
    }
    if let Some(assignee) = input.assignee {
        widget.assignee = assignee;
    }
    if let Some(style) = input.style {
        widget.style = style;
    }
    if let Some(metadata) = input.metadata {
        for (app_id, entry) in metadata {
            if !entry.is_object() {
                return Err(error(
                    StatusCode::BAD_REQUEST,
                    "invalidParameters",
                    format!("Metadata for application {app_id} must be an object"),
                ));
            }
            widget.metadata.insert(app_id, entry);
        }
    }
    widget.modified_at = Utc::now();
    widget.modified_by = mock_user();
    log::debug!("updated widget {widget_id} on board {board_id}");
    Ok(Json(widget.clone()))
}
