//! Blinc Field Runtime
//!
//! Option resolution for select-style inputs:
//!
//! - **Enumerations**: ordered value→descriptor maps normalized into option lists
//! - **Async Resolution**: debounced, de-duplicated remote option requests
//!   with stale-while-revalidate caching
//! - **Filtering**: keyword filtering over nested option groups
//! - **Highlighting**: label segmentation around keyword matches
//! - **Read Mode**: stored values resolved into decorated display nodes
//!
//! # Example
//!
//! ```rust
//! use blinc_field::prelude::*;
//! use serde_json::json;
//!
//! let config = FieldConfig::new().value_enum(json!({
//!     "open": { "text": "Open", "status": "Success" },
//!     "closed": "Closed",
//! }));
//!
//! let options = to_option_list(config.value_enum.as_ref().unwrap());
//! assert_eq!(options.len(), 2);
//!
//! let resolver = OptionResolver::mount(config, None);
//! resolver.fetch_data(Some("clo"));
//! assert_eq!(resolver.options()[0].label, "Closed");
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod highlight;
pub mod key;
pub mod option;
pub mod presenter;
pub mod request;
pub mod resolver;
pub mod value_enum;

pub use cache::{RequestCache, RequestKey};
pub use config::{FieldConfig, FieldProps};
pub use error::{FetchError, FieldError, Result};
pub use filter::{apply_filter_option, filter_list, matches};
pub use highlight::{highlight, render_marked, Highlighter, Segment, Segments};
pub use key::Key;
pub use option::{FieldNames, OptionType, SelectOption};
pub use presenter::{present, present_field, DisplayNode, StatusKind};
pub use request::{request_fn, OptionRequest, OptionsFuture, RequestQuery};
pub use resolver::{OptionResolver, ResolverSnapshot, ResolverStatus};
pub use value_enum::{
    normalize, to_option_list, Descriptor, ValueEnum, ValueEnumItem, ValueEnumSource,
};

/// Commonly used types
pub mod prelude {
    pub use crate::config::FieldConfig;
    pub use crate::error::FetchError;
    pub use crate::highlight::{highlight, Highlighter, Segment};
    pub use crate::option::SelectOption;
    pub use crate::presenter::{present, DisplayNode, StatusKind};
    pub use crate::request::{request_fn, OptionRequest, RequestQuery};
    pub use crate::resolver::{OptionResolver, ResolverStatus};
    pub use crate::value_enum::{normalize, to_option_list, Descriptor, ValueEnum};
}
