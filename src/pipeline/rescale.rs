use image::{Rgba, RgbaImage};

use super::wincur::CursorImage;
use super::wincur::dib::MAX_DIMENSION;
use crate::error::{CursorError, Result};

/// Output dimensions for scaling `width`x`height` so the long side is `target`.
fn scaled_dimensions(width: u32, height: u32, target: u32) -> (u32, u32) {
    let nominal = width.max(height);
    let scale = f64::from(target) / f64::from(nominal);
    let round_dim = |dim: u32, scale: f64| ((f64::from(dim) * scale).round() as u32).max(1);

    let new_w = round_dim(width, scale);
    let new_h = round_dim(height, scale);
    if new_w.max(new_h) == target {
        return (new_w, new_h);
    }

    // pin the long axis, derive the other from the source aspect ratio
    if width >= height {
        (target, round_dim(height, f64::from(target) / f64::from(width)))
    } else {
        (round_dim(width, f64::from(target) / f64::from(height)), target)
    }
}

fn scale_hotspot(coord: u16, src_dim: u32, dst_dim: u32) -> u16 {
    let scaled = (f64::from(coord) * f64::from(dst_dim) / f64::from(src_dim)).round();
    scaled.clamp(0.0, f64::from(dst_dim - 1)) as u16
}

/// Source sample positions and weight along one axis.
fn source_coords(dst: u32, src_dim: u32, dst_dim: u32) -> (u32, u32, f64) {
    let pos = (f64::from(dst) + 0.5) * f64::from(src_dim) / f64::from(dst_dim) - 0.5;
    let base = pos.floor();
    let frac = pos - base;
    let max = i64::from(src_dim) - 1;
    let lo = (base as i64).clamp(0, max) as u32;
    let hi = (base as i64 + 1).clamp(0, max) as u32;
    (lo, hi, frac)
}

/// Bilinear rescale so that `max(width, height) == target_size`.
///
/// Returns an unchanged copy when the image already has that nominal size.
pub fn rescale_cursor(src: &CursorImage, target_size: u32) -> Result<CursorImage> {
    if target_size == 0 {
        return Err(CursorError::InvalidTargetSize(target_size));
    }
    if src.nominal_size() == target_size {
        return Ok(src.clone());
    }
    if target_size > MAX_DIMENSION {
        return Err(CursorError::InvalidTargetSize(target_size));
    }

    let (src_w, src_h) = (src.width(), src.height());
    let (new_w, new_h) = scaled_dimensions(src_w, src_h, target_size);

    log::debug!(
        "Rescaling {}x{} -> {}x{} (target {})",
        src_w,
        src_h,
        new_w,
        new_h,
        target_size
    );

    let x_coords: Vec<_> = (0..new_w).map(|x| source_coords(x, src_w, new_w)).collect();
    let mut out = RgbaImage::new(new_w, new_h);

    for y in 0..new_h {
        let (y0, y1, fy) = source_coords(y, src_h, new_h);
        for (x, &(x0, x1, fx)) in x_coords.iter().enumerate() {
            let p00 = src.image.get_pixel(x0, y0);
            let p10 = src.image.get_pixel(x1, y0);
            let p01 = src.image.get_pixel(x0, y1);
            let p11 = src.image.get_pixel(x1, y1);

            let mut pixel = [0u8; 4];
            for (c, channel) in pixel.iter_mut().enumerate() {
                let top = f64::from(p00[c]) + (f64::from(p10[c]) - f64::from(p00[c])) * fx;
                let bottom = f64::from(p01[c]) + (f64::from(p11[c]) - f64::from(p01[c])) * fx;
                let value = top + (bottom - top) * fy;
                *channel = value.round().clamp(0.0, 255.0) as u8;
            }
            out.put_pixel(x as u32, y, Rgba(pixel));
        }
    }

    let hotspot = (
        scale_hotspot(src.hotspot.0, src_w, new_w),
        scale_hotspot(src.hotspot.1, src_h, new_h),
    );

    Ok(CursorImage::new(out, hotspot))
}
