use std::io::Cursor;

use super::*;

const WAIT: Duration = Duration::from_secs(10);

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([9, 8, 7, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn drain(loader: &mut ImageLoader) -> Vec<LoadCompletion> {
    let mut out = Vec::new();
    while let Some(c) = loader.wait_next(WAIT) {
        out.push(c);
    }
    out
}

#[test]
fn load_delivers_bitmap_through_channel() {
    let mut loader = ImageLoader::new(Some(1), 64).unwrap();
    let id = loader.load(Slot::Overlay, ImageSource::from_bytes(png_bytes(4, 3)));
    assert_eq!(loader.outstanding(), 1);

    let done = drain(&mut loader);
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].id, id);
    assert_eq!(done[0].slot, Slot::Overlay);
    let LoadResult::Ready(bitmap) = &done[0].result else {
        panic!("expected ready bitmap, got {:?}", done[0].result);
    };
    assert_eq!((bitmap.width, bitmap.height), (4, 3));
    assert_eq!(loader.outstanding(), 0);
    assert_eq!(loader.decode_count(Slot::Overlay), 1);
    assert_eq!(loader.decode_count(Slot::Background), 0);
}

#[test]
fn undecodable_bytes_fail_without_panicking() {
    let mut loader = ImageLoader::new(Some(1), 64).unwrap();
    loader.load(Slot::Overlay, ImageSource::from_bytes(b"text/plain".to_vec()));
    let done = drain(&mut loader);
    assert!(matches!(
        done[0].result,
        LoadResult::Failed(PosterError::Decode(_))
    ));
}

#[test]
fn missing_file_is_reported_as_failure() {
    let mut loader = ImageLoader::new(Some(1), 64).unwrap();
    loader.load(
        Slot::Background,
        ImageSource::Path(PathBuf::from("definitely/not/here.png")),
    );
    let done = drain(&mut loader);
    let LoadResult::Failed(err) = &done[0].result else {
        panic!("expected failure");
    };
    assert!(err.to_string().contains("not/here.png"));
}

#[test]
fn newer_request_becomes_latest_and_ids_increase() {
    let mut loader = ImageLoader::new(Some(1), 64).unwrap();
    let a = loader.load(Slot::Overlay, ImageSource::from_bytes(png_bytes(2, 2)));
    let b = loader.load(Slot::Overlay, ImageSource::from_bytes(png_bytes(5, 5)));
    let bg = loader.load(Slot::Background, ImageSource::from_bytes(png_bytes(1, 1)));
    assert!(a < b && b < bg);
    assert!(!loader.is_latest(Slot::Overlay, a));
    assert!(loader.is_latest(Slot::Overlay, b));
    assert!(loader.is_latest(Slot::Background, bg));

    let done = drain(&mut loader);
    assert_eq!(done.len(), 3);
    let latest = done.iter().find(|c| c.id == b).unwrap();
    assert!(matches!(latest.result, LoadResult::Ready(_)));
}

#[test]
fn zero_threads_is_rejected() {
    assert!(ImageLoader::new(Some(0), 64).is_err());
}

#[test]
fn decoder_panic_becomes_a_failed_load() {
    let result = contain_panic(|| panic!("corrupt huffman table"));
    let LoadResult::Failed(err) = &result else {
        panic!("expected failure, got {result:?}");
    };
    assert!(matches!(err, PosterError::Decode(_)));
    assert!(err.to_string().contains("corrupt huffman table"), "{err}");

    let code = 7;
    let result = contain_panic(|| panic!("bad marker {code}"));
    assert!(matches!(result, LoadResult::Failed(e) if e.to_string().contains("bad marker 7")));

    assert!(matches!(
        contain_panic(|| LoadResult::Cancelled),
        LoadResult::Cancelled
    ));
}
