use super::*;
use crate::textproto::{normalize::normalize_keys, parse::RecordParser};

const PROTO: &str = r#"
syntax = "proto3";
package catalog; // trailing comment

/* block
   comment */
message Tag {
  string text_zh = 1;
  string text_jp = 2;
}

message Image {
  string url = 1;
  string crop_rect = 2;
}

message Product {
  string product_id = 1;
  optional string title_jp = 2;
  string vendor = 3;
  repeated Tag tags = 4;
  repeated Image images = 5;
  repeated string image_urls = 6;
  map<string, string> extra = 7;
  oneof kind {
    string figure = 8;
  }
  reserved 9, 10;
  enum Status {
    UNKNOWN = 0;
  }
}

message ProductsInfo {
  repeated Product products = 1;
}
"#;

#[test]
fn messages_and_fields_are_read() {
    let schema = Schema::parse(PROTO).unwrap();
    let names: Vec<_> = schema.messages().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Tag", "Image", "Product", "ProductsInfo"]);

    let product = schema.require_message("Product").unwrap();
    let tags = product.field("tags").unwrap();
    assert!(tags.repeated);
    assert_eq!(tags.type_name, "Tag");
    assert_eq!(tags.number, Some(4));
    assert!(!product.field("title_jp").unwrap().repeated);
    assert_eq!(product.field("extra").unwrap().type_name, "map<string,string>");
    assert!(product.field("figure").is_some());
    assert!(product.field("UNKNOWN").is_none());
}

#[test]
fn repeated_names_come_from_declarations() {
    let schema = Schema::parse(PROTO).unwrap();
    let repeated = schema.repeated_field_names();
    for name in ["products", "tags", "images", "image_urls"] {
        assert!(repeated.contains(name), "{name}");
    }
    assert!(!repeated.contains("vendor"));
}

#[test]
fn missing_root_message_is_an_error() {
    let schema = Schema::parse("message Other { string a = 1; }").unwrap();
    let err = SchemaBinder::new(schema, "ProductsInfo").unwrap_err();
    assert!(err.to_string().contains("ProductsInfo"));
}

#[test]
fn empty_or_unbalanced_schema_is_an_error() {
    assert!(Schema::parse("syntax = \"proto3\";").is_err());
    assert!(Schema::parse("message A { string a = 1;").is_err());
    assert!(Schema::parse("message A { } }").is_err());
}

#[test]
fn bind_documented_scenario() {
    let binder = SchemaBinder::new(Schema::parse(PROTO).unwrap(), "ProductsInfo").unwrap();
    let tree = RecordParser::default().parse(r#"products { product_id: "p1" tags { text_zh: "X" } }"#);
    let info = binder.bind(normalize_keys(tree)).unwrap();
    assert_eq!(info.products.len(), 1);
    let p = &info.products[0];
    assert_eq!(p.product_id, "p1");
    assert_eq!(p.tags.len(), 1);
    assert_eq!(p.tags[0].text_primary.as_deref(), Some("X"));
    assert_eq!(p.tags[0].text_secondary, None);
}

#[test]
fn bind_failure_is_whole() {
    let binder = SchemaBinder::new(Schema::parse(PROTO).unwrap(), "ProductsInfo").unwrap();
    let tree = RecordParser::default()
        .parse("products {\n  product_id: \"ok\"\n}\nproducts {\n  tags: \"not a message\"\n}\n");
    let err = binder.bind(normalize_keys(tree)).unwrap_err();
    assert!(matches!(err, CollageError::Binding(_)));
}

#[test]
fn empty_tree_binds_to_empty_catalog() {
    let binder = SchemaBinder::new(Schema::parse(PROTO).unwrap(), "ProductsInfo").unwrap();
    let info = binder.bind(Node::mapping()).unwrap();
    assert!(info.products.is_empty());
}
