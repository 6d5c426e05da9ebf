use super::*;
use crate::textproto::parse::RecordParser;

#[test]
fn keys_are_camel_cased() {
    assert_eq!(camel_case_key("product_id"), "productId");
    assert_eq!(camel_case_key("a_b_c"), "aBC");
    assert_eq!(camel_case_key("crop_rect"), "cropRect");
    assert_eq!(camel_case_key("already"), "already");
    assert_eq!(camel_case_key("a__b"), "a_B");
    assert_eq!(camel_case_key("_x"), "X");
    assert_eq!(camel_case_key("trailing_"), "trailing_");
    assert_eq!(camel_case_key("v_2"), "v_2");
    assert_eq!(camel_case_key("up_Case"), "up_Case");
}

#[test]
fn normalization_recurses_into_sequences_and_mappings() {
    let root = RecordParser::default().parse(
        "products {\n  product_id: \"p\"\n  tags {\n    text_zh: \"X\"\n  }\n}\n",
    );
    let out = normalize_keys(root);
    let product = &out.get("products").and_then(Node::as_sequence).unwrap()[0];
    assert_eq!(product.get("productId").and_then(Node::as_str), Some("p"));
    let tag = &product.get("tags").and_then(Node::as_sequence).unwrap()[0];
    assert_eq!(tag.get("textZh").and_then(Node::as_str), Some("X"));
}

#[test]
fn string_values_are_not_touched() {
    let root = RecordParser::default().parse("vendor: \"snake_case_value\"\n");
    let out = normalize_keys(root);
    assert_eq!(
        out.get("vendor").and_then(Node::as_str),
        Some("snake_case_value")
    );
}

#[test]
fn normalization_is_idempotent() {
    let root = RecordParser::default().parse(
        "products {\n  product_id: \"p\"\n  title_jp: \"t\"\n  images {\n    crop_rect: \"1,2,3,4\"\n  }\n}\nsome__odd_key: 1\n",
    );
    let once = normalize_keys(root);
    let twice = normalize_keys(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn colliding_keys_keep_first_position_and_last_value() {
    let mut m = Mapping::new();
    m.insert("a_b".to_string(), Node::Number(1.0));
    m.insert("z".to_string(), Node::Number(2.0));
    m.insert("aB".to_string(), Node::Number(3.0));
    let out = normalize_keys(Node::Mapping(m));
    let out = out.as_mapping().unwrap();
    let keys: Vec<_> = out.keys().cloned().collect();
    assert_eq!(keys, vec!["aB".to_string(), "z".to_string()]);
    assert_eq!(out.get("aB"), Some(&Node::Number(3.0)));
}
