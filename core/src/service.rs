//! Async operations over a `RequestExecutor`.
//!
//! Each method is one round trip: build the request, run it under the
//! caller's `Context`, parse the response. Nothing is retried, paginated or
//! cached, and no state is shared between calls.

use crate::client::WidgetsClient;
use crate::config::ClientConfig;
use crate::context::Context;
use crate::error::{ApiError, ConfigError};
use crate::executor::{HttpExecutor, RequestExecutor};
use crate::http::{HttpRequest, HttpResponse};
use crate::metadata::{MetadataRecord, WidgetMetadata};
use crate::types::{AssigneeUpdate, Card, SimpleCard, WidgetDetail, WidgetList};

#[derive(Debug, Clone)]
pub struct WidgetsService<E> {
    client: WidgetsClient,
    executor: E,
}

impl WidgetsService<HttpExecutor> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            WidgetsClient::new(&config.base_url),
            HttpExecutor::new(config)?,
        ))
    }
}

impl<E: RequestExecutor> WidgetsService<E> {
    pub fn new(client: WidgetsClient, executor: E) -> Self {
        Self { client, executor }
    }

    pub fn client(&self) -> &WidgetsClient {
        &self.client
    }

    async fn round_trip(&self, ctx: &Context, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        log::debug!("{} {}", request.method, request.path);
        let response = ctx.run(self.executor.execute(request)).await?;
        log::debug!("response status {}", response.status);
        Ok(response)
    }

    pub async fn list_widgets(&self, ctx: &Context, board_id: &str) -> Result<WidgetList, ApiError> {
        let request = self.client.build_list_widgets(board_id);
        let response = self.round_trip(ctx, request).await?;
        self.client.parse_list_widgets(response)
    }

    pub async fn create_card(
        &self,
        ctx: &Context,
        board_id: &str,
        card: &Card,
    ) -> Result<WidgetDetail, ApiError> {
        let request = self.client.build_create_card(board_id, card)?;
        let response = self.round_trip(ctx, request).await?;
        self.client.parse_create_card(response)
    }

    pub async fn create_simple_card(
        &self,
        ctx: &Context,
        board_id: &str,
        card: &SimpleCard,
    ) -> Result<WidgetDetail, ApiError> {
        let request = self.client.build_create_simple_card(board_id, card)?;
        let response = self.round_trip(ctx, request).await?;
        self.client.parse_create_simple_card(response)
    }

    pub async fn update_assignee(
        &self,
        ctx: &Context,
        board_id: &str,
        widget_id: &str,
        update: &AssigneeUpdate,
    ) -> Result<WidgetDetail, ApiError> {
        let request = self.client.build_update_assignee(board_id, widget_id, update)?;
        let response = self.round_trip(ctx, request).await?;
        self.client.parse_update_assignee(response)
    }

    pub async fn get_metadata(
        &self,
        ctx: &Context,
        board_id: &str,
        widget_id: &str,
    ) -> Result<MetadataRecord, ApiError> {
        let request = self.client.build_get_metadata(board_id, widget_id);
        let response = self.round_trip(ctx, request).await?;
        self.client.parse_get_metadata(response)
    }

    pub async fn update_metadata(
        &self,
        ctx: &Context,
        board_id: &str,
        widget_id: &str,
        metadata: &WidgetMetadata,
    ) -> Result<MetadataRecord, ApiError> {
        let request = self.client.build_update_metadata(board_id, widget_id, metadata)?;
        let response = self.round_trip(ctx, request).await?;
        self.client.parse_update_metadata(response)
    }
}
