//! Schema inference for document collections
//!
//! This module turns sampled documents into per-collection schemas.
//!
//! ## Features
//!
//! - **Type unification** - Fold heterogeneous values into one descriptor
//!   with explicit `Union`, `Optional` and `Unknown` states
//! - **Numeric widening** - Integer and float observations widen to float
//! - **Path flattening** - Nested documents and array elements become
//!   dot-delimited paths (`address.city`, `items[].sku`)
//! - **Field filtering** - Include/exclude lists where exclusion wins
//! - **Format detection** - Recognize common string formats (date, uuid,
//!   email, object id, etc.)
//!
//! ## Example
//!
//! ```rust,ignore
//! use bson::doc;
//! use docschema_core::inference::{FieldFilter, SchemaBuilder};
//!
//! let docs = vec![
//!     doc! { "name": "Alice", "age": 30 },
//!     doc! { "name": "Bob", "age": 25.5, "email": "bob@example.com" },
//! ];
//!
//! let schema = SchemaBuilder::new().build("users", &docs, &FieldFilter::new());
//! for field in schema.fields() {
//!     println!("{}: {}", field.path, field.ty);
//! }
//! ```

mod builder;
mod config;
mod filter;
mod formats;
pub mod path;
mod types;
mod unify;

pub use builder::SchemaBuilder;
pub use config::{InferenceConfig, InferenceConfigBuilder};
pub use filter::FieldFilter;
pub use formats::{Format, detect_format};
pub use types::{
    CollectionSchema, FieldSchema, ObjectField, TypeDescriptor, identifier_key,
};
pub use unify::{TypeUnifier, unify, unify_types};
