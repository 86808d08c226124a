//! Core of the todo app: store client, list/form view-models, sharing.
//!
//! # Overview
//! Everything here is UI-agnostic state and logic. A mobile host renders the
//! screens, forwards user input, and provides the platform services
//! (contacts, SMS, mail composer, toasts) through the traits in `platform`.
//!
//! # Design
//! - `TodoClient` is stateless; each store operation is a `build_*` /
//!   `parse_*` pair so the I/O boundary is explicit (host-does-IO).
//! - `RemoteStore` is the seam the view-models depend on. `HttpStore` runs
//!   the client over a `Transport`; `MemoryStore` replaces it in tests.
//! - View-models receive their store at construction. Nothing is global.
//! - All calls are synchronous and single-threaded; list refreshes carry a
//!   ticket so out-of-order results are discarded.

pub mod client;
pub mod error;
pub mod form;
pub mod http;
pub mod list;
pub mod memory;
pub mod message;
pub mod platform;
pub mod share;
pub mod store;
pub mod types;

pub use client::TodoClient;
pub use error::{ApiError, FormError, PlatformError, ShareError};
pub use form::{FormField, FormFields, FormMode, FormPhase, FormViewModel};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use list::{FilterKind, ListState, ListViewModel, RefreshOutcome, RefreshTicket};
pub use memory::{MemoryStore, StoreOp};
pub use platform::{Contact, DeviceServices, EmailDraft, NoticeLog, Notifier, SmsStatus};
pub use share::{Channel, ShareFlow, ShareOutcome};
pub use store::{HttpStore, RemoteStore};
pub use types::{AssetUpload, ImageRef, NewTodo, TodoItem, TodoPatch, UploadedAsset};
