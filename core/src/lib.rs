//! Client core for the Miro board widgets API.
//!
//! # Overview
//! Lists, creates and updates widgets on a board, and reads or writes the
//! per-widget integration metadata keyed by a third-party application ID.
//!
//! # Design
//! - `WidgetsClient` is stateless: it holds only `base_url` and splits every
//!   operation into `build_*` (produces an `HttpRequest`) and `parse_*`
//!   (consumes an `HttpResponse`), so the I/O boundary is explicit.
//! - `WidgetsService` composes build, execute and parse on top of any
//!   `RequestExecutor`, honoring the caller's `Context` for cancellation.
//! - Metadata uses a dynamic-key wire shape and has its own codec in
//!   `metadata`.
//! - Every failure is one of `ApiError::{Transport, UnexpectedStatus,
//!   MalformedResponse}` (plus `Serialization` for request bodies).

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod http;
pub mod metadata;
pub mod service;
pub mod types;

pub use client::WidgetsClient;
pub use config::ClientConfig;
pub use context::{CancelHandle, Context};
pub use error::{ApiError, ConfigError, TransportError};
pub use executor::{HttpExecutor, RequestExecutor};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use metadata::{MetadataRecord, WidgetMetadata};
pub use service::WidgetsService;
pub use types::{
    Actor, Assignee, AssigneeUpdate, Capabilities, Card, CardDetails, CardPayload, SimpleCard,
    Style, WidgetDetail, WidgetKind, WidgetList, WidgetRecord,
};
