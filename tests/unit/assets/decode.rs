use std::io::Cursor;

use super::*;

fn png_bytes(width: u32, height: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn png_decodes_with_premultiplied_pixels() {
    let img = decode_image(&png_bytes(3, 2, [100, 50, 200, 128])).unwrap();
    assert_eq!(img.size(), Canvas { width: 3, height: 2 });
    assert_eq!(img.rgba8_premul.len(), 3 * 2 * 4);
    assert_eq!(
        &img.rgba8_premul[..4],
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128
        ]
    );
}

#[test]
fn transparent_pixels_zero_their_color() {
    let img = DecodedImage::from_straight_rgba8(1, 1, vec![255, 255, 255, 0]);
    assert_eq!(img.rgba8_premul.as_slice(), &[0, 0, 0, 0]);
}

#[test]
fn garbage_is_an_error() {
    assert!(decode_image(b"definitely not an image").is_err());
}
