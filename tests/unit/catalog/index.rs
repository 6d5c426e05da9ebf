use super::*;
use crate::catalog::model::{ImageRef, Tag};

fn product(id: &str, title: Option<&str>, tags: &[&str]) -> ProductRecord {
    let mut p = ProductRecord::new(id);
    p.title_primary = title.map(str::to_owned);
    p.tags = tags.iter().map(|t| Tag::primary(*t)).collect();
    p.images = vec![ImageRef::uncropped(format!("{id}.png"))];
    p
}

fn ids<'a>(products: impl IntoIterator<Item = &'a ProductRecord>) -> Vec<&'a str> {
    products.into_iter().map(|p| p.product_id.as_str()).collect()
}

#[test]
fn series_is_first_catalog_match() {
    let catalog = SeriesCatalog::new(["One Piece", "Naruto", "Piece"]);
    let p = product("p", Some("Naruto x One Piece crossover"), &[]);
    assert_eq!(assign_series(&p, &catalog), "One Piece");

    let by_tag = product("q", None, &["Naruto"]);
    assert_eq!(assign_series(&by_tag, &catalog), "Naruto");
}

#[test]
fn series_tag_match_is_exact_but_title_match_is_substring() {
    let catalog = SeriesCatalog::new(["Naruto"]);
    assert_eq!(
        assign_series(&product("a", None, &["Naruto Shippuden"]), &catalog),
        DEFAULT_FALLBACK_SERIES
    );
    assert_eq!(
        assign_series(&product("b", Some("Naruto Shippuden"), &[]), &catalog),
        "Naruto"
    );

    let mut secondary = product("c", None, &[]);
    secondary.tags = vec![Tag {
        text_primary: Some("x".to_string()),
        text_secondary: Some("Naruto".to_string()),
    }];
    assert_eq!(assign_series(&secondary, &catalog), "Naruto");
}

#[test]
fn series_assignment_is_total_and_deterministic() {
    let catalog = SeriesCatalog::new(["A", "B"]).with_fallback("misc");
    let products = [
        product("1", Some("A"), &[]),
        product("2", None, &["B"]),
        product("3", None, &["C"]),
    ];
    for p in &products {
        let first = assign_series(p, &catalog);
        for _ in 0..3 {
            assert_eq!(assign_series(p, &catalog), first);
        }
    }
    assert_eq!(assign_series(&products[2], &catalog), "misc");
}

#[test]
fn groups_sort_by_catalog_with_fallback_last() {
    let catalog = SeriesCatalog::new(["A", "B", "C"]);
    let products = [
        product("1", None, &["Z"]),
        product("2", None, &["C"]),
        product("3", None, &["A"]),
        product("4", None, &["C"]),
        product("5", None, &["Y"]),
    ];
    let groups = group_products(&products, &catalog, GroupBy::Series);
    let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["A", "C", DEFAULT_FALLBACK_SERIES]);
    assert_eq!(ids(groups[1].members.iter().copied()), vec!["2", "4"]);
    assert_eq!(ids(groups[2].members.iter().copied()), vec!["1", "5"]);

    let total: usize = groups.iter().map(|g| g.members.len()).sum();
    assert_eq!(total, products.len());
}

#[test]
fn flat_mode_is_one_untitled_group() {
    let catalog = SeriesCatalog::new(["A"]);
    let products = [product("1", None, &["A"]), product("2", None, &[])];
    let groups = group_products(&products, &catalog, GroupBy::None);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].title(), None);
    assert_eq!(ids(groups[0].members.iter().copied()), vec!["1", "2"]);

    let none: [ProductRecord; 0] = [];
    assert!(group_products(&none, &catalog, GroupBy::None).is_empty());
    assert!(group_products(&none, &catalog, GroupBy::Series).is_empty());
}

#[test]
fn empty_filter_returns_everything() {
    let index = CatalogIndex::new(vec![product("1", None, &["A"]), product("2", None, &[])]).unwrap();
    assert_eq!(ids(index.filter(&FilterState::default())), vec!["1", "2"]);
    assert_eq!(ids(index.filter(&FilterState::all_of(Vec::<String>::new()))), vec!["1", "2"]);
}

#[test]
fn all_tags_filter_is_set_containment() {
    let p = product("p", None, &["A", "B"]);
    assert!(FilterState::all_of(["A", "B"]).matches(&p));
    assert!(FilterState::all_of(["B"]).matches(&p));
    assert!(!FilterState::all_of(["A", "C"]).matches(&p));
}

#[test]
fn any_per_dimension_is_and_of_ors() {
    let state = FilterState::any_per_dimension()
        .with_dimension("series", ["S1", "S2"])
        .with_dimension("category", ["Figure"]);
    assert!(state.matches(&product("a", None, &["S2", "Figure"])));
    assert!(!state.matches(&product("b", None, &["S1"])));
    assert!(!state.matches(&product("c", None, &["Figure"])));

    let only_series = FilterState::any_per_dimension()
        .with_dimension("series", ["S1", "S2"])
        .with_dimension("category", Vec::<String>::new());
    assert!(only_series.matches(&product("d", None, &["S1"])));
}

#[test]
fn toggle_and_clear_track_active_tags() {
    let mut state = FilterState::default();
    assert!(state.toggle("tags", "A"));
    assert!(state.toggle("tags", "B"));
    assert!(!state.toggle("tags", "A"));
    assert_eq!(state.active_tags(), vec!["B"]);
    state.clear();
    assert!(state.is_empty());
}

#[test]
fn duplicate_ids_are_rejected() {
    let err = CatalogIndex::new(vec![product("p", None, &[]), product("p", None, &[])]).unwrap_err();
    assert!(err.to_string().contains("duplicate productId 'p'"));
}

#[test]
fn all_tags_are_sorted_and_unique() {
    let index = CatalogIndex::new(vec![
        product("1", None, &["b", "a"]),
        product("2", None, &["a", "c", ""]),
    ])
    .unwrap();
    assert_eq!(index.all_tags(), vec!["a", "b", "c"]);
    assert_eq!(index.get("2").map(|p| p.tags.len()), Some(3));
    assert!(index.get("3").is_none());
}

#[test]
fn select_applies_vendor_and_requires_images() {
    let mut other = product("2", None, &["A"]);
    other.vendor = "other".to_string();
    let mut no_images = product("3", None, &["A"]);
    no_images.vendor = "jump".to_string();
    no_images.images.clear();
    let mut ok = product("1", None, &["A"]);
    ok.vendor = "jump".to_string();

    let index = CatalogIndex::new(vec![ok, other, no_images]).unwrap();
    let state = FilterState::all_of(["A"]);
    assert_eq!(ids(index.select(&state, Some("jump"))), vec!["1"]);
    assert_eq!(ids(index.select(&state, None)), vec!["1", "2"]);
}

#[test]
fn filters_ignore_secondary_tag_texts() {
    let mut p = product("p", None, &[]);
    p.tags = vec![Tag {
        text_primary: Some("A".to_string()),
        text_secondary: Some("B".to_string()),
    }];
    let index = CatalogIndex::new(vec![p]).unwrap();
    assert_eq!(index.all_tags(), vec!["A"]);

    assert!(index.filter(&FilterState::all_of(["B"])).is_empty());
    assert_eq!(ids(index.filter(&FilterState::all_of(["A"]))), vec!["p"]);

    let any = FilterState::any_per_dimension().with_dimension("series", ["B", "Z"]);
    assert!(index.filter(&any).is_empty());
}
