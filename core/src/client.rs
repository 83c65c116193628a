//! Stateless HTTP request builder and response parser for the widgets API.
//!
//! # Design
//! `WidgetsClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The round-trip itself happens elsewhere (see
//! `WidgetsService`), keeping this layer deterministic and free of I/O.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::metadata::{MetadataRecord, WidgetMetadata};
use crate::types::{AssigneeUpdate, Card, ErrorEnvelope, SimpleCard, WidgetDetail, WidgetList};

const WIDGETS_PATH: &str = "widgets";

/// Synchronous, stateless client for the board widgets API.
#[derive(Debug, Clone)]
pub struct WidgetsClient {
    base_url: String,
}

impl WidgetsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn widgets_path(&self, board_id: &str) -> String {
        format!("{}/boards/{board_id}/{WIDGETS_PATH}", self.base_url)
    }

    fn widget_path(&self, board_id: &str, widget_id: &str) -> String {
        format!("{}/boards/{board_id}/{WIDGETS_PATH}/{widget_id}", self.base_url)
    }

    pub fn build_list_widgets(&self, board_id: &str) -> HttpRequest {
        HttpRequest::get(self.widgets_path(board_id))
    }

    pub fn build_create_card(&self, board_id: &str, card: &Card) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::post_json(self.widgets_path(board_id), to_body(card)?))
    }

    pub fn build_create_simple_card(
        &self,
        board_id: &str,
        card: &SimpleCard,
    ) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::post_json(self.widgets_path(board_id), to_body(card)?))
    }

    pub fn build_update_assignee(
        &self,
        board_id: &str,
        widget_id: &str,
        update: &AssigneeUpdate,
    ) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::patch_json(
            self.widget_path(board_id, widget_id),
            to_body(update)?,
        ))
    }

    pub fn build_get_metadata(&self, board_id: &str, widget_id: &str) -> HttpRequest {
        HttpRequest::get(self.widget_path(board_id, widget_id))
    }

    pub fn build_update_metadata(
        &self,
        board_id: &str,
        widget_id: &str,
        metadata: &WidgetMetadata,
    ) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::patch_json(
            self.widget_path(board_id, widget_id),
            to_body(metadata)?,
        ))
    }

    pub fn parse_list_widgets(&self, response: HttpResponse) -> Result<WidgetList, ApiError> {
        check_status(&response, 200)?;
        from_body(&response)
    }

    pub fn parse_create_card(&self, response: HttpResponse) -> Result<WidgetDetail, ApiError> {
        check_status(&response, 201)?;
        from_body(&response)
    }

    /// Simple cards come back in the same envelope as full cards.
    pub fn parse_create_simple_card(
        &self,
        response: HttpResponse,
    ) -> Result<WidgetDetail, ApiError> {
        self.parse_create_card(response)
    }

    pub fn parse_update_assignee(&self, response: HttpResponse) -> Result<WidgetDetail, ApiError> {
        check_status(&response, 200)?;
        from_body(&response)
    }

    pub fn parse_get_metadata(&self, response: HttpResponse) -> Result<MetadataRecord, ApiError> {
        check_status(&response, 200)?;
        from_body(&response)
    }

    pub fn parse_update_metadata(
        &self,
        response: HttpResponse,
    ) -> Result<MetadataRecord, ApiError> {
        check_status(&response, 200)?;
        from_body(&response)
    }
}

fn to_body<T: Serialize>(payload: &T) -> Result<String, ApiError> {
    serde_json::to_string(payload).map_err(ApiError::Serialization)
}

fn from_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(ApiError::MalformedResponse)
}

/// Map a status other than `expected` to `UnexpectedStatus`, carrying the
/// message from the service's error envelope. An undecodable envelope is
/// reported as `MalformedResponse` rather than inventing a message.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    let envelope: ErrorEnvelope = from_body(response)?;
    Err(ApiError::UnexpectedStatus {
        status: response.status,
        message: envelope.message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::types::{Assignee, CardPayload, Style, WidgetKind};

    const BASE: &str = "https://api.miro.com/v1";

    fn client() -> WidgetsClient {
        WidgetsClient::new(BASE)
    }

    fn body_json(req: &HttpRequest) -> serde_json::Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn build_list_widgets_produces_correct_request() {
        let req = client().build_list_widgets("o9J_kzlUDmo=");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "https://api.miro.com/v1/boards/o9J_kzlUDmo=/widgets");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_create_card_produces_correct_request() {
        let card = Card {
            title: "Fix login".to_string(),
            description: "Users get logged out".to_string(),
            assignee: Assignee {
                user_id: "42".to_string(),
            },
            style: Style {
                background_color: "#ff0000".to_string(),
            },
            ..Card::default()
        };
        let req = client().build_create_card("b1", &card).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "https://api.miro.com/v1/boards/b1/widgets");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body = body_json(&req);
        assert_eq!(body["type"], "card");
        assert_eq!(body["title"], "Fix login");
        assert_eq!(body["assignee"]["userId"], "42");
        assert_eq!(body["style"]["backgroundColor"], "#ff0000");
        assert_eq!(body["date"], "");
    }

    #[test]
    fn build_create_simple_card_only_sends_three_fields() {
        let req = client()
            .build_create_simple_card("b1", &SimpleCard::new("Title", "Desc"))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            body_json(&req),
            serde_json::json!({"type": "card", "title": "Title", "description": "Desc"})
        );
    }

    #[test]
    fn build_update_assignee_targets_widget() {
        let req = client()
            .build_update_assignee("b1", "w7", &AssigneeUpdate::new("42"))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.path, "https://api.miro.com/v1/boards/b1/widgets/w7");
        assert_eq!(body_json(&req), serde_json::json!({"assignee": {"userId": "42"}}));
    }

    #[test]
    fn build_get_metadata_produces_correct_request() {
        let req = client().build_get_metadata("b1", "w7");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "https://api.miro.com/v1/boards/b1/widgets/w7");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_update_metadata_uses_dynamic_key_body() {
        let metadata = WidgetMetadata::new("Fix login", "3074457", "STP-346");
        let req = client().build_update_metadata("b1", "w7", &metadata).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(
            req.body.as_deref(),
            Some(r#"{"title":"Fix login","metadata":{"3074457":{"issue":"STP-346"}}}"#)
        );
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = WidgetsClient::new("https://api.miro.com/v1/");
        let req = client.build_list_widgets("b1");
        assert_eq!(req.path, "https://api.miro.com/v1/boards/b1/widgets");
    }

    #[test]
    fn parse_list_widgets_success() {
        let response = HttpResponse::new(
            200,
            r#"{"type":"collection","size":2,"data":[
                {"id":"1","type":"card","title":"A","card":{"customFields":[]}},
                {"id":"2","type":"shape","card":{"raw":true}}
            ]}"#,
        );
        let list = client().parse_list_widgets(response).unwrap();
        assert_eq!(list.kind, "collection");
        assert_eq!(list.size, list.data.len());
        assert_eq!(list.data[0].title, "A");
        assert!(matches!(list.data[0].card, Some(CardPayload::Card(_))));
        assert_eq!(list.data[1].kind, WidgetKind::Shape);
    }

    #[test]
    fn parse_not_found_carries_service_message() {
        let response = HttpResponse::new(404, r#"{"status":404,"message":"not found"}"#);
        let err = client().parse_list_widgets(response).unwrap_err();
        match err {
            ApiError::UnexpectedStatus { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_not_found_with_null_message_is_unexpected_status() {
        let response = HttpResponse::new(404, r#"{"message":null}"#);
        let err = client().parse_list_widgets(response).unwrap_err();
        match err {
            ApiError::UnexpectedStatus { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_list_widgets_keeps_records_with_null_fields() {
        let response = HttpResponse::new(
            200,
            r#"{"type":"collection","size":2,"data":[
                {"id":"1","type":"card","title":"A","date":null,"assignee":null,"style":null},
                {"id":"2","type":"card","description":null,"card":null}
            ]}"#,
        );
        let list = client().parse_list_widgets(response).unwrap();
        assert_eq!(list.data.len(), 2);
        assert_eq!(list.data[0].date, "");
        assert_eq!(list.data[0].assignee, Assignee::default());
        assert_eq!(list.data[0].style, Style::default());
        assert_eq!(list.data[1].description, "");
        assert!(list.data[1].card.is_none());
    }

    #[test]
    fn parse_create_card_with_null_description() {
        let response = HttpResponse::new(
            201,
            r#"{"id":"3074457","type":"card","title":"New","description":null}"#,
        );
        let detail = client().parse_create_card(response).unwrap();
        assert_eq!(detail.widget.description, "");
        assert!(!detail.capabilities.editable);
    }

    #[test]
    fn parse_get_metadata_rejects_null_title() {
        let response = HttpResponse::new(200, r#"{"title":null,"id":"1"}"#);
        let err = client().parse_get_metadata(response).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }

    #[test]
    fn parse_error_status_with_undecodable_envelope_is_malformed() {
        let response = HttpResponse::new(500, "internal error");
        let err = client().parse_get_metadata(response).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }

    #[test]
    fn parse_create_card_success() {
        let response = HttpResponse::new(
            201,
            r#"{"id":"3074457","type":"card","title":"New","capabilities":{"editable":true}}"#,
        );
        let detail = client().parse_create_card(response).unwrap();
        assert_eq!(detail.widget.id, "3074457");
        assert!(detail.capabilities.editable);
    }

    #[test]
    fn parse_create_card_rejects_200() {
        let response = HttpResponse::new(200, r#"{"message":"wrong code"}"#);
        let err = client().parse_create_simple_card(response).unwrap_err();
        assert_eq!(err.status(), Some(200));
    }

    #[test]
    fn parse_update_assignee_success() {
        let response = HttpResponse::new(
            200,
            r#"{"id":"w7","type":"card","assignee":{"userId":"42"},"capabilities":{"editable":false}}"#,
        );
        let detail = client().parse_update_assignee(response).unwrap();
        assert_eq!(detail.widget.assignee.user_id, "42");
        assert!(!detail.capabilities.editable);
    }

    #[test]
    fn parse_get_metadata_success() {
        let response = HttpResponse::new(
            200,
            r#"{"type":"card","id":"w7","title":"T","metadata":{"3074457":{"issue":"STP-1"}}}"#,
        );
        let record = client().parse_get_metadata(response).unwrap();
        assert_eq!(record.widget_type, "card");
        assert_eq!(record.metadata, WidgetMetadata::new("T", "3074457", "STP-1"));
    }

    #[test]
    fn parse_update_metadata_rejects_non_object_body() {
        let response = HttpResponse::new(200, r#""just a string""#);
        let err = client().parse_update_metadata(response).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }

    #[test]
    fn parse_list_widgets_bad_json() {
        let response = HttpResponse::new(200, "not json");
        let err = client().parse_list_widgets(response).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }
}
