//! Typed client for restaurant menus, ordering operations and service-fee rules.
//!
//! Every entity goes through the same [`transport::Backend`] seam, so the
//! [`memory::InMemoryBackend`] that ships here behaves exactly like a remote
//! service: revisions, keyset cursors, bulk item results and domain events.
//!
//! ```no_run
//! use menukit::{Client, ClientConfig, domain::{Menu, MenuField}};
//!
//! # async fn run() -> menukit::SdkResult<()> {
//! let (client, _backend) = Client::in_memory(ClientConfig::default());
//! let dinner = client.menus().create(&Menu::named("Dinner")).await?;
//! let page = client.menus().query().eq(MenuField::Name, "Dinner").find().await?;
//! assert_eq!(page.items()[0].meta.id, dinner.meta.id);
//! # Ok(())
//! # }
//! ```

pub mod bulk;
pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod entity;
pub mod errors;
pub mod events;
pub mod memory;
pub mod query;
pub mod transport;
pub mod types;
pub mod utils;

pub use bulk::{ApplicationError, BulkActionMetadata, BulkItemResult, BulkResponse, ItemMetadata};
pub use client::{Client, EntityClient, ListResponse};
pub use config::ClientConfig;
pub use entity::{Entity, EntityDescriptor, EntityMeta, FieldCaps, QueryField};
pub use errors::{SdkError, SdkResult};
pub use events::{DomainEvent, DomainEventBody, EventSequenceGuard};
pub use memory::InMemoryBackend;
pub use query::{CursorPaging, Filter, Order, PagingMetadata, QueryBuilder, QueryDescriptor, ResultPage, SortSpec};
pub use transport::{Backend, RawPage};
pub use types::{CursorToken, EntityId, Revision};
