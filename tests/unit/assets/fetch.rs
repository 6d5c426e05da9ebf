use std::io::Cursor;

use base64::Engine;

use super::*;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn temp_dir(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "catalog_collage_fetch_{name}_{}_{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn data_urls_decode_base64_and_percent() {
    assert_eq!(decode_data_url("data:text/plain;base64,aGk=").unwrap(), b"hi");
    assert_eq!(decode_data_url("data:;base64,aG\n k=").unwrap(), b"hi");
    assert_eq!(decode_data_url("data:,a%20b").unwrap(), b"a b");
    assert!(decode_data_url("data:,bad%2").is_err());
    assert!(decode_data_url("data:no-comma").is_err());
    assert!(decode_data_url("data:;base64,***").is_err());
}

#[test]
fn resolve_paths_and_schemes() {
    let fetcher = FsFetcher::new("/srv/catalog");
    assert_eq!(
        fetcher.resolve("img/a.png").unwrap(),
        Some(PathBuf::from("/srv/catalog/img/a.png"))
    );
    assert_eq!(
        fetcher.resolve("/abs/b.png").unwrap(),
        Some(PathBuf::from("/abs/b.png"))
    );
    assert_eq!(
        fetcher.resolve("file:///abs/c.png").unwrap(),
        Some(PathBuf::from("/abs/c.png"))
    );
    assert_eq!(fetcher.resolve("data:,x").unwrap(), None);
    assert!(matches!(
        fetcher.resolve("https://example.com/a.png"),
        Err(CollageError::Image(_))
    ));
}

#[test]
fn acquire_isolates_failures_and_keeps_order() {
    let dir = temp_dir("acquire");
    std::fs::write(dir.join("a.png"), png_bytes(4, 3)).unwrap();
    std::fs::write(dir.join("broken.png"), b"nope").unwrap();
    let inline = format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png_bytes(2, 5))
    );

    let fetcher = FsFetcher::new(&dir);
    let urls = ["a.png", "missing.png", inline.as_str(), "broken.png", "http://x/y.png"];
    let results = futures::executor::block_on(acquire_images(&fetcher, &urls));

    assert_eq!(results.len(), urls.len());
    let a = results[0].as_ref().unwrap();
    assert_eq!((a.width, a.height), (4, 3));
    assert!(results[1].is_err());
    let inline = results[2].as_ref().unwrap();
    assert_eq!((inline.width, inline.height), (2, 5));
    assert!(results[3].is_err());
    assert!(results[4].is_err());
}
