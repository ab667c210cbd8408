//! Entity trait, read-only metadata and per-entity queryable field sets.

use crate::errors::{SdkError, SdkResult};
use crate::types::{EntityId, Revision};
use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire names of the server-owned metadata keys.
pub const ID_PATH: &str = "_id";
pub const REVISION_PATH: &str = "revision";
pub const CREATED_PATH: &str = "_createdDate";
pub const UPDATED_PATH: &str = "_updatedDate";

pub const READ_ONLY_PATHS: [&str; 4] = [ID_PATH, REVISION_PATH, CREATED_PATH, UPDATED_PATH];

/// Server-assigned identity, revision and timestamps shared by every entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<Revision>,
    #[serde(rename = "_createdDate", default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(rename = "_updatedDate", default, skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<DateTime<Utc>>,
}

impl EntityMeta {
    #[must_use]
    pub fn with_id(id: impl Into<EntityId>) -> Self {
        Self { id: Some(id.into()), ..Self::default() }
    }
}

bitflags! {
    /// Operators a field may take part in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldCaps: u8 {
        /// `$eq`, `$ne`, `$in`, `$nin`.
        const EQ = 0b0000_0001;
        /// `$gt`, `$gte`, `$lt`, `$lte`.
        const RANGE = 0b0000_0010;
        const SORT = 0b0000_0100;
        /// `$startsWith`, `$contains`.
        const TEXT = 0b0000_1000;
        /// `$hasSome`, `$hasAll`.
        const ARRAY = 0b0001_0000;
    }
}

/// A closed set of filterable/sortable field names for one entity.
pub trait QueryField: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    fn path(self) -> &'static str;
    fn caps(self) -> FieldCaps;
    fn all() -> &'static [Self];

    fn lookup(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|f| f.path() == name)
    }
}

/// Declares a field enum together with its wire paths and capabilities.
///
/// ```ignore
/// query_fields! {
///     pub enum LabelField {
///         Id => "_id": [EQ | SORT],
///         Name => "name": [EQ | SORT | TEXT],
///     }
/// }
/// ```
#[macro_export]
macro_rules! query_fields {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $path:literal : [$($cap:ident)|+]),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::entity::QueryField for $name {
            fn path(self) -> &'static str {
                match self {
                    $(Self::$variant => $path),+
                }
            }

            fn caps(self) -> $crate::entity::FieldCaps {
                match self {
                    $(Self::$variant => $($crate::entity::FieldCaps::$cap)|+),+
                }
            }

            fn all() -> &'static [Self] {
                &[$(Self::$variant),+]
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::errors::SdkError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <Self as $crate::entity::QueryField>::lookup(s).ok_or_else(|| {
                    $crate::errors::SdkError::Validation(format!(
                        "unknown field '{}' for {}",
                        s,
                        stringify!($name)
                    ))
                })
            }
        }
    };
}

/// A server-owned record reachable through the query protocol.
pub trait Entity: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    /// Collection name used on the wire, e.g. `menus`.
    const KIND: &'static str;
    /// Fully qualified name carried by domain events.
    const FQDN: &'static str;
    /// Page size when a query sets no limit.
    const DEFAULT_LIMIT: usize;
    /// Upper bound for a single `list` call.
    const MAX_LIST: usize;

    type Field: QueryField + std::str::FromStr<Err = SdkError>;

    fn meta(&self) -> &EntityMeta;
    fn meta_mut(&mut self) -> &mut EntityMeta;

    /// Checks required fields before a create is dispatched.
    fn validate_new(&self) -> SdkResult<()> {
        Ok(())
    }
}

/// Runtime view of an entity's query surface, for callers that only know the kind name.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    pub kind: &'static str,
    pub fqdn: &'static str,
    pub default_limit: usize,
    pub max_list: usize,
    pub fields: Vec<(&'static str, FieldCaps)>,
}

impl EntityDescriptor {
    #[must_use]
    pub fn of<E: Entity>() -> Self {
        Self {
            kind: E::KIND,
            fqdn: E::FQDN,
            default_limit: E::DEFAULT_LIMIT,
            max_list: E::MAX_LIST,
            fields: E::Field::all().iter().map(|f| (f.path(), f.caps())).collect(),
        }
    }

    #[must_use]
    pub fn caps_of(&self, path: &str) -> Option<FieldCaps> {
        self.fields.iter().find(|(p, _)| *p == path).map(|(_, c)| *c)
    }

    /// Fails with a validation error unless `path` is declared with `needed`.
    pub fn require(&self, path: &str, needed: FieldCaps, op: &str) -> SdkResult<()> {
        match self.caps_of(path) {
            None => Err(SdkError::Validation(format!("unknown field '{path}' for {}", self.kind))),
            Some(c) if c.contains(needed) => Ok(()),
            Some(_) => Err(SdkError::Validation(format!(
                "field '{path}' of {} does not support {op}",
                self.kind
            ))),
        }
    }
}

/// Decodes a JSON document returned by a backend into a typed entity.
pub fn decode<E: Entity>(doc: serde_json::Value) -> SdkResult<E> {
    Ok(serde_json::from_value(doc)?)
}
