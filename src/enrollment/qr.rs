use image::{ImageError, ImageReader, Limits};
use std::io::Cursor;
use tracing::debug;

use crate::error::AutoDuoError;

/// Largest accepted side of an enrollment image; generous for a screenshot.
pub const MAX_IMAGE_SIDE: u32 = 8192;
const MAX_DECODE_ALLOC: u64 = 256 * 1024 * 1024;

fn decode_limits() -> Limits {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_IMAGE_SIDE);
    limits.max_image_height = Some(MAX_IMAGE_SIDE);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);
    limits
}

/// Decode the first readable QR code in a PNG or JPEG image.
pub fn decode_qr(image_bytes: &[u8]) -> Result<String, AutoDuoError> {
    let mut reader = ImageReader::new(Cursor::new(image_bytes))
        .with_guessed_format()
        .map_err(ImageError::IoError)?;
    reader.limits(decode_limits());
    let luma = reader.decode()?.to_luma8();
    let (width, height) = luma.dimensions();
    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
            luma.get_pixel(x as u32, y as u32)[0]
        });

    let grids = prepared.detect_grids();
    debug!(width, height, grids = grids.len(), "scanned image for QR codes");

    let mut last_err = None;
    for grid in &grids {
        match grid.decode() {
            Ok((_meta, content)) => return Ok(content),
            Err(e) => last_err = Some(e),
        }
    }
    match last_err {
        Some(e) => Err(AutoDuoError::QrDecode(format!("{e:?}"))),
        None => Err(AutoDuoError::QrNotFound),
    }
}
