use std::io::Cursor;

use super::*;

#[test]
fn decode_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8, 0, 0, 0, 255];
    let img = image::RgbaImage::from_raw(2, 1, src_rgba).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let base = BaseImage::decode(&buf).unwrap();
    assert_eq!(base.canvas(), Canvas::new(2, 1).unwrap());
    assert_eq!(
        base.pixel(0, 0),
        [
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
    assert_eq!(base.pixel(5, 5), [0; 4]);
}

#[test]
fn decode_garbage_fails() {
    assert!(BaseImage::decode(b"not an image").is_err());
    assert!(BaseImage::from_path("/no/such/file.png").is_err());
}

#[test]
fn raw_buffer_is_validated() {
    assert!(BaseImage::from_straight_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(BaseImage::from_straight_rgba8(0, 2, Vec::new()).is_err());
    assert!(BaseImage::from_straight_rgba8(1, 1, vec![1, 2, 3, 255]).is_ok());
}
