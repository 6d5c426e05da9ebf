use super::*;
use crate::catalog::{
    index::{GroupBy, SeriesCatalog, group_products},
    model::{ImageRef, ProductRecord, Tag},
};

fn products(n: usize, tag: &str) -> Vec<ProductRecord> {
    (0..n)
        .map(|i| {
            let mut p = ProductRecord::new(format!("{tag}{i}"));
            p.tags = vec![Tag::primary(tag)];
            p.images = vec![ImageRef::uncropped(format!("{tag}{i}.png"))];
            p
        })
        .collect()
}

fn header() -> HeaderInfo {
    HeaderInfo {
        title: "Collection".to_string(),
        subtitle: None,
        progress: None,
    }
}

#[test]
fn seven_products_in_five_columns() {
    let spec = LayoutSpec::default();
    let items = products(7, "A");
    let groups = group_products(&items, &SeriesCatalog::default(), GroupBy::None);
    let layout = compute_layout(&header(), &groups, &spec);

    assert_eq!(layout.sections.len(), 1);
    assert_eq!(layout.sections[0].rows, 2);
    assert_eq!(layout.sections[0].band, None);
    let last = layout.cell("A6").unwrap();
    assert_eq!((last.row, last.col), (1, 1));
    assert_eq!(spec.slot(6), (1, 1));
    assert_eq!(last.image.as_ref().map(|i| i.url.as_str()), Some("A6.png"));

    let first = layout.cell("A0").unwrap();
    assert_eq!(first.rect.x0, spec.padding);
    assert_eq!(last.rect.x0, spec.padding + spec.cell_width + spec.gap);
    assert_eq!(last.rect.y0, first.rect.y0 + spec.cell_height + spec.gap);
}

#[test]
fn canvas_size_follows_constants() {
    let spec = LayoutSpec::default();
    let items = products(3, "A");
    let groups = group_products(&items, &SeriesCatalog::default(), GroupBy::None);
    let layout = compute_layout(&header(), &groups, &spec);

    let expected_w = 2.0 * 32.0 + 5.0 * 200.0 + 4.0 * 12.0;
    assert_eq!(layout.width, expected_w as u32);
    let expected_h = 32.0 + 48.0 + 16.0 + 200.0 + 24.0 + 32.0;
    assert_eq!(layout.height, expected_h as u32);
}

#[test]
fn sections_stack_with_bands() {
    let spec = LayoutSpec::default();
    let mut items = products(6, "A");
    items.extend(products(2, "B"));
    let catalog = SeriesCatalog::new(["B", "A"]);
    let groups = group_products(&items, &catalog, GroupBy::Series);
    let layout = compute_layout(&header(), &groups, &spec);

    let titles: Vec<_> = layout.sections.iter().map(|s| s.title.as_deref()).collect();
    assert_eq!(titles, vec![Some("B"), Some("A")]);

    let b = &layout.sections[0];
    let a = &layout.sections[1];
    let b_band = b.band.unwrap();
    assert_eq!(b.cells[0].rect.y0, b_band.y1);
    let a_band = a.band.unwrap();
    assert_eq!(a_band.y0, b.cells[0].rect.y1 + spec.group_bottom_margin);
    assert_eq!(a.rows, 2);
    assert_eq!(layout.cell_count(), 8);
}

#[test]
fn header_lines_include_optional_rows() {
    let spec = LayoutSpec::default();
    let info = HeaderInfo {
        title: "T".to_string(),
        subtitle: Some("Figures".to_string()),
        progress: Some(Progress::new(3, 7)),
    };
    let layout = compute_layout(&info, &[], &spec);
    let roles: Vec<_> = layout.header.iter().map(|l| l.role).collect();
    assert_eq!(
        roles,
        vec![HeaderRole::Title, HeaderRole::Subtitle, HeaderRole::Progress]
    );
    assert_eq!(layout.header[2].text, "3/7 (43%)");
    assert!(layout.empty_notice.is_some());
    assert_eq!(layout.cell_count(), 0);
}

#[test]
fn progress_percent_handles_zero_total() {
    assert_eq!(Progress::new(0, 0).percent(), 0);
    assert_eq!(Progress::new(1, 3).percent(), 33);
    assert_eq!(Progress::new(2, 3).percent(), 67);
    assert_eq!(Progress::new(4, 4).label(), "4/4 (100%)");
}

#[test]
fn validate_rejects_degenerate_specs() {
    assert!(LayoutSpec::default().validate().is_ok());
    let zero_cols = LayoutSpec {
        columns: 0,
        ..LayoutSpec::default()
    };
    assert!(zero_cols.validate().is_err());
    let bad_gap = LayoutSpec {
        gap: f64::NAN,
        ..LayoutSpec::default()
    };
    assert!(bad_gap.validate().is_err());
}
