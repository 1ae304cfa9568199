//! Integration tests for schema inference and relationship detection

use bson::oid::ObjectId;
use bson::{Bson, Document, doc};
use tempfile::TempDir;

use docschema_core::inference::{FieldFilter, SchemaBuilder, TypeDescriptor, unify};
use docschema_core::relationships::{Cardinality, RelationshipDetector, RelationshipKind};
use docschema_core::source::{DocumentSource, JsonDirSource, Sampler};

fn orders() -> Vec<Document> {
    vec![
        doc! {
            "customer_id": ObjectId::new(),
            "total": 10,
            "items": [{ "sku": "A", "qty": 1 }, { "sku": "B" }],
            "shipping": { "city": "Berlin", "zip": "10115" },
            "note": Bson::Null,
        },
        doc! {
            "customer_id": ObjectId::new(),
            "total": 12.5,
            "items": [],
            "shipping": { "city": "Hamburg" },
            "coupon": "SPRING",
        },
    ]
}

#[test]
fn test_unify_core_cases() {
    assert_eq!(unify([Bson::Int32(1), Bson::Int32(2)].iter()), TypeDescriptor::Integer);
    assert_eq!(unify([Bson::Int32(1), Bson::Double(2.5)].iter()), TypeDescriptor::Float);
    assert_eq!(
        unify(
            [
                Bson::String("a".to_string()),
                Bson::Null,
                Bson::String("b".to_string())
            ]
            .iter()
        ),
        TypeDescriptor::optional(TypeDescriptor::string())
    );
    assert_eq!(unify(std::iter::empty::<&Bson>()), TypeDescriptor::Unknown);
}

#[test]
fn test_builder_is_deterministic() {
    let documents = orders();
    let builder = SchemaBuilder::new();
    let first = builder.build("orders", &documents, &FieldFilter::new());
    let second = builder.build("orders", &documents, &FieldFilter::new());

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(
        first.paths().collect::<Vec<_>>(),
        vec![
            "customer_id",
            "total",
            "items",
            "items[].sku",
            "items[].qty",
            "shipping",
            "shipping.city",
            "shipping.zip",
            "note",
            "coupon",
        ]
    );
}

#[test]
fn test_builder_required_and_widening() {
    let schema = SchemaBuilder::new().build("orders", &orders(), &FieldFilter::new());

    let total = schema.field("total").unwrap();
    assert_eq!(total.ty, TypeDescriptor::Float);
    assert!(total.required);

    assert!(!schema.field("coupon").unwrap().required);
    assert!(schema.field("items[].sku").unwrap().required);
    assert!(!schema.field("items[].qty").unwrap().required);
    assert!(!schema.field("shipping.zip").unwrap().required);
    assert_eq!(schema.field("note").unwrap().ty, TypeDescriptor::Null);
}

#[test]
fn test_filter_precedence() {
    let filter = FieldFilter::new()
        .include("shipping.city")
        .include("total")
        .exclude("total");
    let schema = SchemaBuilder::new().build("orders", &orders(), &filter);

    assert_eq!(
        schema.paths().collect::<Vec<_>>(),
        vec!["shipping", "shipping.city"]
    );
}

#[test]
fn test_exclude_parent_removes_children() {
    let filter = FieldFilter::new().exclude("items");
    let schema = SchemaBuilder::new().build("orders", &orders(), &filter);
    assert!(schema.paths().all(|p| !p.starts_with("items")));
    assert!(schema.field("shipping.city").is_some());
}

#[test]
fn test_relationship_rules() {
    let builder = SchemaBuilder::new();
    let filter = FieldFilter::new();
    let schemas = vec![
        builder.build(
            "posts",
            &[doc! {
                "author": { "_id": ObjectId::new(), "name": "Ann" },
                "tag_ids": [ObjectId::new(), ObjectId::new()],
            }],
            &filter,
        ),
        builder.build("authors", &[doc! { "name": "Ann" }], &filter),
        builder.build("tags", &[doc! { "label": "rust" }], &filter),
    ];

    let relationships = RelationshipDetector::new().detect(&schemas);
    let described: Vec<_> = relationships.iter().map(|r| r.describe()).collect();
    assert_eq!(described, vec!["posts.author -> authors", "posts.tag_ids -> tags"]);

    assert_eq!(relationships[0].kind, RelationshipKind::NamingConvention);
    assert_eq!(relationships[0].cardinality, Cardinality::One);
    assert_eq!(relationships[1].cardinality, Cardinality::Many);
}

#[test]
fn test_value_overlap_breaks_ties() {
    let builder = SchemaBuilder::new();
    let filter = FieldFilter::new();
    let owner = ObjectId::new();
    let schemas = vec![
        builder.build("accounts", &[doc! { "user_id": owner }], &filter),
        builder.build(
            "user",
            &[doc! { "_id": ObjectId::new(), "name": "a" }],
            &filter,
        ),
        builder.build("users", &[doc! { "_id": owner, "name": "b" }], &filter),
    ];

    let relationships = RelationshipDetector::new()
        .with_value_overlap(true)
        .detect(&schemas);
    assert_eq!(relationships.len(), 1);
    assert_eq!(relationships[0].target_collection, "users");
    assert_eq!(relationships[0].kind, RelationshipKind::ValueOverlap);
}

#[tokio::test]
async fn test_json_dir_through_sampler() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("events.jsonl"),
        "{\"kind\": \"click\", \"at\": {\"$date\": \"2024-01-15T10:30:00Z\"}}\n\n{\"kind\": \"view\"}\n{\"kind\": \"view\"}\n",
    )
    .unwrap();
    std::fs::write(temp.path().join("README.txt"), "not a collection").unwrap();

    let source = JsonDirSource::new(temp.path());
    assert_eq!(source.list_collections().await.unwrap(), vec!["events"]);

    let sampler = Sampler::new(&source).with_sample_size(2);
    let documents = sampler.sample("events").await.unwrap();
    assert_eq!(documents.len(), 2);

    let schema = SchemaBuilder::new().build("events", &documents, &FieldFilter::new());
    assert_eq!(schema.sample_count(), 2);
    assert_eq!(schema.field("at").unwrap().ty, TypeDescriptor::Date);
    assert!(!schema.field("at").unwrap().required);

    let missing = sampler.sample("clicks").await.unwrap_err();
    assert!(missing.is_unavailable());
}
