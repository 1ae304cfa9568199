//! Relationship detection between collections
//!
//! References in document databases are conventions, not constraints. The
//! detector applies an ordered list of heuristics to every inferred field:
//!
//! 1. [`NamingConventionRule`] - `author_id`, `customerId`, `tag_ids`, ...
//! 2. [`EmbeddedIdRule`] - embedded documents carrying `_id` or `id`
//!
//! Fields whose target cannot be resolved to an existing collection are
//! dropped silently. New heuristics are added by implementing
//! [`RelationshipRule`] and appending it with
//! [`RelationshipDetector::with_rule`].

pub mod detector;
pub mod naming;
pub mod overlap;
pub mod rules;
pub mod types;

pub use detector::RelationshipDetector;
pub use naming::{CollectionIndex, candidate_names, reference_stem};
pub use overlap::overlap_ratio;
pub use rules::{Candidate, EmbeddedIdRule, NamingConventionRule, RelationshipRule};
pub use types::{Cardinality, MatchPattern, Relationship, RelationshipKind};
