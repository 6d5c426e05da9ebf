use super::*;

fn pixel(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

fn split_image() -> DecodedImage {
    let mut rgba = Vec::new();
    for _ in 0..2 {
        for x in 0..4 {
            let px: [u8; 4] = if x < 2 {
                [255, 0, 0, 255]
            } else {
                [0, 0, 255, 255]
            };
            rgba.extend_from_slice(&px);
        }
    }
    DecodedImage::from_straight_rgba8(4, 2, rgba)
}

#[test]
fn rejects_oversized_or_empty_surfaces() {
    assert!(CpuSurface::new(70_000, 10).is_err());
    assert!(CpuSurface::new(0, 10).is_err());
    assert_eq!(CpuSurface::new(8, 6).unwrap().size(), (8, 6));
}

#[test]
fn fill_rect_writes_opaque_pixels() {
    let mut s = CpuSurface::new(8, 8).unwrap();
    s.fill_rect(Rect::new(0.0, 0.0, 8.0, 8.0), [10, 20, 30, 255]);
    s.fill_rect(Rect::new(4.0, 4.0, 8.0, 8.0), [200, 0, 0, 255]);
    let frame = s.finish().unwrap();
    assert_eq!((frame.width, frame.height), (8, 8));
    assert_eq!(frame.data.len(), 8 * 8 * 4);
    assert!(frame.premultiplied);
    assert_eq!(pixel(&frame, 1, 1), [10, 20, 30, 255]);
    assert_eq!(pixel(&frame, 6, 6), [200, 0, 0, 255]);
}

#[test]
fn draw_image_maps_source_region_into_destination() {
    let mut s = CpuSurface::new(8, 8).unwrap();
    s.fill_rect(Rect::new(0.0, 0.0, 8.0, 8.0), [255, 255, 255, 255]);
    let src = SourceRect {
        x: 2.0,
        y: 0.0,
        width: 2.0,
        height: 2.0,
    };
    s.draw_image(&split_image(), src, Rect::new(0.0, 0.0, 8.0, 8.0), 1.0)
        .unwrap();
    let frame = s.finish().unwrap();
    let center = pixel(&frame, 5, 4);
    assert!(center[2] > 200 && center[0] < 40, "{center:?}");
}

#[test]
fn empty_source_region_draws_nothing() {
    let mut s = CpuSurface::new(4, 4).unwrap();
    let src = SourceRect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 2.0,
    };
    s.draw_image(&split_image(), src, Rect::new(0.0, 0.0, 4.0, 4.0), 1.0)
        .unwrap();
    let frame = s.finish().unwrap();
    assert_eq!(pixel(&frame, 2, 2), [0, 0, 0, 0]);
}

#[test]
fn mismatched_image_bytes_are_an_error() {
    let mut s = CpuSurface::new(4, 4).unwrap();
    let bad = DecodedImage {
        width: 3,
        height: 3,
        rgba8_premul: Arc::new(vec![0; 4]),
    };
    let src = SourceRect::full(3, 3);
    assert!(s.draw_image(&bad, src, Rect::new(0.0, 0.0, 4.0, 4.0), 1.0).is_err());
}

#[test]
fn text_without_font_is_skipped() {
    let mut s = CpuSurface::new(16, 16).unwrap();
    assert!(!s.has_text());
    s.draw_text("hello", Point::new(0.0, 0.0), 12.0, [0, 0, 0, 255], None);
    let frame = s.finish().unwrap();
    assert!(frame.data.iter().all(|b| *b == 0));
}
