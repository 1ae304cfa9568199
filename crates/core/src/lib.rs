//! docschema core - schema inference and ER diagrams for document databases
//!
//! Provides:
//! - Sampling collections from MongoDB or a directory of JSON files
//! - Structural type inference with unions, optionals and format hints
//! - Relationship detection from naming conventions
//! - Mermaid `erDiagram` rendering, locally or through an LLM
//! - A generator that ties it together and tolerates partial failure

pub mod diagram;
pub mod inference;
pub mod llm;
pub mod pipeline;
pub mod relationships;
pub mod source;

// Document model used throughout the public API
pub use bson;

// Re-export commonly used types
pub use diagram::{
    DiagramAssembler, DiagramError, DiagramRenderer, DiagramSpec, MermaidRenderer, OutputFormat,
    RenderError,
};
pub use inference::{
    CollectionSchema, FieldFilter, FieldSchema, InferenceConfig, SchemaBuilder, TypeDescriptor,
    TypeUnifier,
};
pub use llm::{LlmClient, LlmError, LlmRenderer};
pub use pipeline::{GeneratorConfig, PipelineError, RunReport, SchemaGenerator};
pub use relationships::{Cardinality, Relationship, RelationshipDetector, RelationshipKind};
pub use source::{DocumentSource, JsonDirSource, MemorySource, MongoSource, Sampler, SourceError};
