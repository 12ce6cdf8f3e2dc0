//! PNG QR renderer built on the `qrcode` and `image` crates.

use image::{GrayImage, Luma};
use qrcode::QrCode;

use crate::totp::qr::QrCodeProvider;
use crate::totp::types::*;

/// Quiet-zone border in modules.
const QUIET_ZONE: u32 = 4;

/// Largest image edge, in pixels, this renderer will allocate.
pub const MAX_IMAGE_SIZE: u32 = 4096;

/// Renders QR codes as greyscale PNG images.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngQrCodeProvider;

impl QrCodeProvider for PngQrCodeProvider {
    /// Module size is the largest whole pixel count that keeps the image
    /// within `size`, but never below one pixel per module.
    fn image(&self, text: &str, size: u32) -> Result<Vec<u8>, TotpError> {
        if size > MAX_IMAGE_SIZE {
            return Err(TotpError::new(
                TotpErrorKind::InvalidSize,
                format!("Size must be at most {} pixels", MAX_IMAGE_SIZE),
            )
            .with_detail(format!("got {}", size)));
        }

        let code = QrCode::new(text.as_bytes()).map_err(|e| {
            TotpError::new(TotpErrorKind::QrEncodeFailed, format!("QR encode error: {}", e))
        })?;

        let matrix = code.to_colors();
        let width = code.width() as u32;
        let modules = width + QUIET_ZONE * 2;
        let px = (size / modules).max(1);
        let img_size = modules * px;

        let mut img = GrayImage::from_pixel(img_size, img_size, Luma([255u8]));

        for y in 0..width {
            for x in 0..width {
                if matrix[(y * width + x) as usize] == qrcode::Color::Dark {
                    let px_x = (x + QUIET_ZONE) * px;
                    let px_y = (y + QUIET_ZONE) * px;
                    for dy in 0..px {
                        for dx in 0..px {
                            img.put_pixel(px_x + dx, px_y + dy, Luma([0u8]));
                        }
                    }
                }
            }
        }

        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img_size,
            img_size,
            image::ExtendedColorType::L8,
        )
        .map_err(|e| {
            TotpError::new(TotpErrorKind::QrEncodeFailed, format!("PNG encode error: {}", e))
        })?;

        Ok(buf)
    }

    fn mime_type(&self) -> &str {
        "image/png"
    }
}
