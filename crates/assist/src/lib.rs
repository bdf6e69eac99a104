//! Fail-closed text-generation helpers for the catalog.
//!
//! Two entry points, both degrading to a neutral result on any error:
//! [`translate_query`] turns a natural-language search into structured
//! filter parameters (or `None`), and [`suggest_organization`] produces
//! free-text cleanup advice (or a fixed apology). The rest of the system
//! treats both as optional sugar — search and stats keep working with no
//! network, no key, or a misbehaving service.

mod client;
pub mod error;
mod organize;
mod translate;

pub use crate::client::{AssistClient, DEFAULT_MODEL};
pub use crate::organize::{FALLBACK_MESSAGE, SAMPLE_LIMIT, suggest_organization};
pub use crate::translate::{TranslatedQuery, translate_query};
