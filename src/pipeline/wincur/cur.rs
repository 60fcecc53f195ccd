use image::RgbaImage;

use super::bytes::ByteReader;
use super::dib;
use crate::error::{CursorError, Result};

const ICO_TYPE_ICON: u16 = 1;
const ICO_TYPE_CUR: u16 = 2;
const HEADER_LEN: usize = 6;
const DIR_ENTRY_LEN: usize = 16;
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// A decoded RGBA image with its hotspot.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorImage {
    pub image: RgbaImage,
    pub hotspot: (u16, u16),
}

impl CursorImage {
    pub fn new(image: RgbaImage, hotspot: (u16, u16)) -> Self {
        Self { image, hotspot }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `max(width, height)`, the size identity used for matching.
    pub fn nominal_size(&self) -> u32 {
        self.width().max(self.height())
    }

    /// Raw RGBA8 bytes, `width * height * 4` long.
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }
}

/// Container type from the directory header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Icon,
    Cursor,
}

/// The two 16-bit directory fields, read according to the container type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFormat {
    Icon { planes: u16, bit_count: u16 },
    Cursor { hotspot_x: u16, hotspot_y: u16 },
}

#[derive(Debug, Clone, Copy)]
pub struct IconDirEntry {
    pub width: u8,
    pub height: u8,
    pub color_count: u8,
    pub reserved: u8,
    pub format: EntryFormat,
    pub size_bytes: u32,
    pub offset: u32,
}

impl IconDirEntry {
    /// Width in pixels; a stored 0 means 256.
    pub fn width(&self) -> u32 {
        if self.width == 0 { 256 } else { u32::from(self.width) }
    }

    /// Height in pixels; a stored 0 means 256.
    pub fn height(&self) -> u32 {
        if self.height == 0 { 256 } else { u32::from(self.height) }
    }

    pub fn nominal_size(&self) -> u32 {
        self.width().max(self.height())
    }

    /// Hotspot for cursor entries, origin for icons.
    pub fn hotspot(&self) -> (u16, u16) {
        match self.format {
            EntryFormat::Cursor {
                hotspot_x,
                hotspot_y,
            } => (hotspot_x, hotspot_y),
            EntryFormat::Icon { .. } => (0, 0),
        }
    }

    /// Declared bit depth; only icon entries carry one.
    pub fn bit_count(&self) -> Option<u16> {
        match self.format {
            EntryFormat::Icon { bit_count, .. } if bit_count != 0 => Some(bit_count),
            _ => None,
        }
    }

    /// `width * height * bpp`, assuming 32 bpp when unknown.
    pub fn quality_score(&self) -> u64 {
        let bpp = self.bit_count().unwrap_or(32);
        u64::from(self.width()) * u64::from(self.height()) * u64::from(bpp)
    }
}

#[derive(Debug, Clone)]
pub struct IconDir {
    pub image_type: ImageType,
    pub entries: Vec<IconDirEntry>,
}

impl IconDir {
    /// Index of the entry with the highest quality score (first on ties).
    pub fn best_entry(&self) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, u64)>, (idx, entry)| {
                let score = entry.quality_score();
                match best {
                    Some((_, best_score)) if best_score >= score => best,
                    _ => Some((idx, score)),
                }
            })
            .map(|(idx, _)| idx)
    }
}

pub struct CurParser;

impl CurParser {
    pub fn can_parse(data: &[u8]) -> bool {
        data.len() >= 4
            && data[0..2] == [0, 0]
            && matches!(u16::from_le_bytes([data[2], data[3]]), ICO_TYPE_ICON | ICO_TYPE_CUR)
    }

    pub fn read_directory(data: &[u8]) -> Result<IconDir> {
        if data.len() < HEADER_LEN {
            return Err(CursorError::TooSmall {
                expected: HEADER_LEN,
                actual: data.len(),
            });
        }

        let mut reader = ByteReader::new(data);
        let reserved = reader.read_u16()?;
        let ico_type = reader.read_u16()?;
        let image_count = reader.read_u16()?;

        if reserved != 0 {
            return Err(CursorError::InvalidReserved(reserved));
        }
        let image_type = match ico_type {
            ICO_TYPE_ICON => ImageType::Icon,
            ICO_TYPE_CUR => ImageType::Cursor,
            other => return Err(CursorError::InvalidImageType(other)),
        };
        if image_count == 0 {
            return Err(CursorError::EmptyDirectory);
        }

        let dir_len = HEADER_LEN + usize::from(image_count) * DIR_ENTRY_LEN;
        if data.len() < dir_len {
            return Err(CursorError::TooSmall {
                expected: dir_len,
                actual: data.len(),
            });
        }

        let entries = (0..usize::from(image_count))
            .map(|idx| Self::read_dir_entry(data, idx, image_type))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "ICO/CUR: type={:?}, {} images",
            image_type,
            entries.len()
        );

        Ok(IconDir {
            image_type,
            entries,
        })
    }

    fn read_dir_entry(data: &[u8], index: usize, image_type: ImageType) -> Result<IconDirEntry> {
        let mut reader = ByteReader::new(data);
        reader.seek(HEADER_LEN + index * DIR_ENTRY_LEN)?;

        let width = reader.read_u8()?;
        let height = reader.read_u8()?;
        let color_count = reader.read_u8()?;
        let reserved = reader.read_u8()?;
        let field_a = reader.read_u16()?;
        let field_b = reader.read_u16()?;

        let format = match image_type {
            ImageType::Icon => EntryFormat::Icon {
                planes: field_a,
                bit_count: field_b,
            },
            ImageType::Cursor => EntryFormat::Cursor {
                hotspot_x: field_a,
                hotspot_y: field_b,
            },
        };

        Ok(IconDirEntry {
            width,
            height,
            color_count,
            reserved,
            format,
            size_bytes: reader.read_u32()?,
            offset: reader.read_u32()?,
        })
    }

    /// Decode every directory entry, largest nominal size first.
    pub fn decode_all<F>(data: &[u8], mut log_fn: F) -> Result<Vec<CursorImage>>
    where
        F: FnMut(String),
    {
        let dir = Self::read_directory(data)?;

        let mut images = dir
            .entries
            .iter()
            .map(|entry| Self::decode_entry(data, entry, &mut log_fn))
            .collect::<Result<Vec<_>>>()?;

        // stable: equal sizes keep directory order
        images.sort_by_key(|img| std::cmp::Reverse(img.nominal_size()));

        Ok(images)
    }

    /// Decode only the highest scoring entry.
    pub fn decode_best<F>(data: &[u8], mut log_fn: F) -> Result<CursorImage>
    where
        F: FnMut(String),
    {
        let dir = Self::read_directory(data)?;
        let best = dir.best_entry().ok_or(CursorError::EmptyDirectory)?;
        let entry = &dir.entries[best];

        log::debug!(
            "ICO/CUR: best image #{}: {}x{}, offset={}, size={}",
            best,
            entry.width(),
            entry.height(),
            entry.offset,
            entry.size_bytes
        );

        Self::decode_entry(data, entry, &mut log_fn)
    }

    fn decode_entry<F>(data: &[u8], entry: &IconDirEntry, mut log_fn: F) -> Result<CursorImage>
    where
        F: FnMut(String),
    {
        let start = entry.offset as usize;
        if start >= data.len() {
            return Err(CursorError::PayloadOutOfBounds {
                offset: entry.offset,
                len: data.len(),
            });
        }

        let declared_end = start.saturating_add(entry.size_bytes as usize);
        if declared_end > data.len() {
            log_fn(format!(
                "Warning: ICO/CUR image data at offset {} extends {} bytes past end of file",
                entry.offset,
                declared_end - data.len()
            ));
        }
        let payload = &data[start..declared_end.min(data.len())];

        if payload.starts_with(PNG_SIGNATURE) {
            let img = image::load_from_memory_with_format(payload, image::ImageFormat::Png)?;
            let rgba = img.to_rgba8();
            log::debug!(
                "ICO/CUR: decoded PNG {}x{}, hotspot {:?}",
                rgba.width(),
                rgba.height(),
                entry.hotspot()
            );
            Ok(CursorImage::new(rgba, entry.hotspot()))
        } else {
            dib::decode_dib(payload, entry, log_fn)
        }
    }
}
