//! Normalizes uploaded images before they are sent for captioning.

use std::io::Cursor;

use image::ImageOutputFormat;

/// Upper bound on an uploaded image, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Shown when an upload goes over [`MAX_UPLOAD_BYTES`].
pub fn too_large_message() -> String {
    format!("Image is larger than {} MB", MAX_UPLOAD_BYTES / (1024 * 1024))
}

const JPEG_QUALITY: u8 = 85;

/// Decodes any supported format, drops alpha, re-encodes as JPEG.
pub fn to_rgb_jpeg(data: &[u8]) -> image::ImageResult<Vec<u8>> {
    let rgb = image::load_from_memory(data)?.to_rgb8();

    let mut jpeg = Vec::new();
    image::DynamicImage::ImageRgb8(rgb).write_to(
        &mut Cursor::new(&mut jpeg),
        ImageOutputFormat::Jpeg(JPEG_QUALITY),
    )?;
    Ok(jpeg)
}
