// RIFF container reader with lenient chunk iteration

use super::bytes::{ByteReader, FourCc, fourcc_str};
use crate::error::{CursorError, Result};

pub const RIFF_TAG: &FourCc = b"RIFF";
pub const LIST_TAG: &FourCc = b"LIST";

const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// One tagged record of a RIFF container.
///
/// `data` is always clamped to the bytes actually present, whatever `size`
/// declares. For `LIST` chunks the form type has already been consumed from
/// the front of `data`.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    pub id: FourCc,
    pub size: u32,
    pub data: &'a [u8],
    pub form_type: Option<FourCc>,
}

impl Chunk<'_> {
    pub fn is_list(&self) -> bool {
        &self.id == RIFF_TAG || &self.id == LIST_TAG
    }

    pub fn id_str(&self) -> String {
        fourcc_str(&self.id)
    }
}

/// Validated RIFF root with its form type.
#[derive(Debug)]
pub struct RiffReader<'a> {
    root: Chunk<'a>,
}

impl<'a> RiffReader<'a> {
    /// Validate the 12-byte RIFF header.
    ///
    /// A declared size that disagrees with the buffer length is reported
    /// through `log_fn` and otherwise ignored.
    pub fn new<F>(data: &'a [u8], mut log_fn: F) -> Result<Self>
    where
        F: FnMut(String),
    {
        if data.len() < HEADER_LEN {
            return Err(CursorError::TooSmall {
                expected: HEADER_LEN,
                actual: data.len(),
            });
        }

        let mut reader = ByteReader::new(data);
        let tag = reader.read_fourcc()?;
        if &tag != RIFF_TAG {
            return Err(CursorError::InvalidSignature {
                expected: fourcc_str(RIFF_TAG),
                found: fourcc_str(&tag),
            });
        }

        let size = reader.read_u32()?;
        let form_type = reader.read_fourcc()?;

        log::debug!("RIFF: form type '{}', size {}", fourcc_str(&form_type), size);

        let declared_total = size as usize + CHUNK_HEADER_LEN;
        if declared_total != data.len() {
            log_fn(format!(
                "Warning: RIFF declared size {} does not match file size {} (continuing)",
                declared_total,
                data.len()
            ));
        }

        let available = data.len() - HEADER_LEN;
        // a size too small to hold the form type keeps the whole buffer
        let body_len = match (size as usize).checked_sub(4) {
            Some(len) => len.min(available),
            None => available,
        };

        Ok(Self {
            root: Chunk {
                id: *RIFF_TAG,
                size,
                data: &data[HEADER_LEN..HEADER_LEN + body_len],
                form_type: Some(form_type),
            },
        })
    }

    pub fn root(&self) -> &Chunk<'a> {
        &self.root
    }

    pub fn form_type(&self) -> FourCc {
        self.root.form_type.unwrap_or(*RIFF_TAG)
    }

    /// Chunks directly under the root.
    pub fn chunks(&self) -> ChunkIter<'a> {
        chunks(self.root.data)
    }
}

/// Iterate the chunks laid out back to back in `data`.
pub fn chunks(data: &[u8]) -> ChunkIter<'_> {
    ChunkIter { data, offset: 0 }
}

/// First chunk tagged `id`.
pub fn find_chunk<'a>(data: &'a [u8], id: &FourCc) -> Option<Chunk<'a>> {
    chunks(data).find(|chunk| &chunk.id == id)
}

/// First `LIST` chunk of the given form type.
pub fn find_list<'a>(data: &'a [u8], form_type: &FourCc) -> Option<Chunk<'a>> {
    chunks(data).find(|chunk| &chunk.id == LIST_TAG && chunk.form_type.as_ref() == Some(form_type))
}

/// Iterator over sibling chunks.
///
/// Stops at the end of the buffer or at the first chunk whose header does not
/// fit; never reads out of bounds.
pub struct ChunkIter<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ChunkIter<'a> {
    fn parse_chunk(&mut self) -> Option<Chunk<'a>> {
        let data = self.data;
        let offset = self.offset;
        if offset.checked_add(CHUNK_HEADER_LEN)? > data.len() {
            return None;
        }

        let mut reader = ByteReader::new(&data[offset..]);
        let id = reader.read_fourcc().ok()?;
        let size = reader.read_u32().ok()?;

        let chunk = if &id == LIST_TAG {
            if size < 4 {
                log::debug!("RIFF: LIST chunk at offset {} too small ({} bytes)", offset, size);
                return None;
            }
            let form_type = reader.read_fourcc().ok()?;
            let start = offset + HEADER_LEN;
            let len = (size as usize - 4).min(data.len() - start);
            log::debug!("RIFF: LIST '{}' with {} bytes of data", fourcc_str(&form_type), len);
            Chunk {
                id,
                size,
                data: &data[start..start + len],
                form_type: Some(form_type),
            }
        } else {
            let start = offset + CHUNK_HEADER_LEN;
            let len = (size as usize).min(data.len() - start);
            log::trace!("RIFF: chunk '{}' at offset {}, size {}", fourcc_str(&id), offset, size);
            Chunk {
                id,
                size,
                data: &data[start..start + len],
                form_type: None,
            }
        };

        // chunks are word aligned
        let mut total = CHUNK_HEADER_LEN.saturating_add(size as usize);
        if total & 1 != 0 {
            total = total.saturating_add(1);
        }
        self.offset = offset.saturating_add(total);

        Some(chunk)
    }
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.data.len() {
            return None;
        }
        let chunk = self.parse_chunk();
        if chunk.is_none() {
            self.offset = self.data.len();
        }
        chunk
    }
}
