// Manual unpacking of uncompressed DIB payloads stored in ICO/CUR entries.
//
// The stored height covers the color bitmap and the 1-bit AND mask stacked
// on top of each other. Rows are bottom-up unless the height is negative.

use image::RgbaImage;

use super::bytes::ByteReader;
use super::cur::{CursorImage, IconDirEntry};
use crate::error::{CursorError, Result};

const INFO_HEADER_LEN: usize = 40;
const BI_RGB: u32 = 0;
/// Largest width or height accepted anywhere in the pipeline.
pub const MAX_DIMENSION: u32 = 1024;

/// BITMAPINFOHEADER fields that drive decoding.
#[derive(Debug, Clone, Copy)]
pub struct DibHeader {
    pub header_size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
}

impl DibHeader {
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < INFO_HEADER_LEN {
            return Err(CursorError::TooSmall {
                expected: INFO_HEADER_LEN,
                actual: data.len(),
            });
        }

        let mut reader = ByteReader::new(data);
        let header = Self {
            header_size: reader.read_u32()?,
            width: reader.read_i32()?,
            height: reader.read_i32()?,
            planes: reader.read_u16()?,
            bit_count: reader.read_u16()?,
            compression: reader.read_u32()?,
        };
        // image size, resolution, color counts are not needed

        if (header.header_size as usize) < INFO_HEADER_LEN {
            return Err(CursorError::TooSmall {
                expected: INFO_HEADER_LEN,
                actual: header.header_size as usize,
            });
        }

        Ok(header)
    }

    pub fn is_top_down(&self) -> bool {
        self.height < 0
    }
}

/// Bytes per row of a bitmap, rows padded to 4 bytes.
pub fn row_stride(width: u32, bit_count: u16) -> usize {
    (width as usize * bit_count as usize).div_ceil(32) * 4
}

pub fn decode_dib<F>(data: &[u8], entry: &IconDirEntry, mut log_fn: F) -> Result<CursorImage>
where
    F: FnMut(String),
{
    let header = DibHeader::parse(data)?;

    if header.compression != BI_RGB {
        return Err(CursorError::UnsupportedCompression(header.compression));
    }
    let bpp = header.bit_count;
    if !matches!(bpp, 1 | 4 | 8 | 24 | 32) {
        return Err(CursorError::UnsupportedBitDepth(bpp));
    }

    let invalid_dims = || CursorError::InvalidDimensions {
        width: i64::from(header.width),
        height: i64::from(header.height),
    };
    if header.width < 0 {
        return Err(invalid_dims());
    }

    let mut width = header.width as u32;
    let mut height = header.height.unsigned_abs() / 2;
    if width == 0 {
        width = entry.width();
    }
    if height == 0 {
        height = entry.height();
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(invalid_dims());
    }

    let palette = if bpp <= 8 {
        read_palette(data, header.header_size as usize, 1 << bpp)?
    } else {
        Vec::new()
    };

    let (w, h) = (width as usize, height as usize);
    let color_stride = row_stride(width, bpp);
    let mask_stride = row_stride(width, 1);
    let pixel_offset = header.header_size as usize + palette_len(bpp);
    let mask_offset = pixel_offset + color_stride * h;
    let required = mask_offset + mask_stride * h;

    if data.len() < required {
        log_fn(format!(
            "Warning: ICO/CUR bitmap data truncated ({} < {} bytes), image may have artifacts",
            data.len(),
            required
        ));
    }

    let src_row_of = |y: usize| if header.is_top_down() { y } else { h - 1 - y };
    let mut pixels = vec![0u8; w * h * 4];

    for y in 0..h {
        let row = pixel_offset + src_row_of(y) * color_stride;
        for x in 0..w {
            let pixel = match bpp {
                1 => data
                    .get(row + x / 8)
                    .map(|&b| palette_color(&palette, (b >> (7 - x % 8)) & 0x01)),
                4 => data.get(row + x / 2).map(|&b| {
                    let nibble = if x % 2 == 0 { b >> 4 } else { b & 0x0F };
                    palette_color(&palette, nibble)
                }),
                8 => data.get(row + x).map(|&b| palette_color(&palette, b)),
                24 => data
                    .get(row + x * 3..row + x * 3 + 3)
                    .map(|p| [p[2], p[1], p[0], 0xFF]),
                32 => data
                    .get(row + x * 4..row + x * 4 + 4)
                    .map(|p| [p[2], p[1], p[0], p[3]]),
                _ => None,
            };

            if let Some(rgba) = pixel {
                let dst = (y * w + x) * 4;
                pixels[dst..dst + 4].copy_from_slice(&rgba);
            }
        }
    }

    // 32bpp carries real alpha; everything else uses the AND mask
    if bpp < 32 {
        for y in 0..h {
            let row = mask_offset + src_row_of(y) * mask_stride;
            for x in 0..w {
                let Some(&bits) = data.get(row + x / 8) else {
                    continue;
                };
                if bits & (0x80 >> (x % 8)) != 0 {
                    pixels[(y * w + x) * 4 + 3] = 0;
                }
            }
        }
    }

    log::debug!(
        "ICO/CUR: decoded BMP {}x{} {}bpp, hotspot {:?}",
        width,
        height,
        bpp,
        entry.hotspot()
    );

    let image = RgbaImage::from_raw(width, height, pixels).ok_or_else(invalid_dims)?;
    Ok(CursorImage::new(image, entry.hotspot()))
}

fn palette_len(bpp: u16) -> usize {
    if bpp <= 8 { (1usize << bpp) * 4 } else { 0 }
}

/// Read up to `count` BGR0 entries; a short table is simply shorter.
fn read_palette(data: &[u8], offset: usize, count: usize) -> Result<Vec<[u8; 4]>> {
    let mut reader = ByteReader::new(data);
    reader.seek(offset)?;

    let mut palette = Vec::with_capacity(count);
    while palette.len() < count && reader.remaining() >= 4 {
        let b = reader.read_u8()?;
        let g = reader.read_u8()?;
        let r = reader.read_u8()?;
        reader.skip(1)?;
        palette.push([r, g, b, 0xFF]);
    }
    Ok(palette)
}

fn palette_color(palette: &[[u8; 4]], index: u8) -> [u8; 4] {
    palette.get(usize::from(index)).copied().unwrap_or([0, 0, 0, 0])
}
