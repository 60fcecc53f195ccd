// In-memory builders for DIB, ICO/CUR and ANI test data

use byteorder::{LittleEndian, WriteBytesExt};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::{Cursor, Write};

use super::wincur::dib::row_stride;

pub struct DibBuilder {
    width: u32,
    height: u32,
    bpp: u16,
    header_bpp: Option<u16>,
    header_dims: Option<(i32, i32)>,
    top_down: bool,
    compression: u32,
    colors: Vec<[u8; 4]>,
    indexed: Option<(Vec<[u8; 3]>, Vec<u8>)>,
    mask: Vec<bool>,
}

impl DibBuilder {
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::from_colors(width, height, vec![rgba; (width * height) as usize])
    }

    /// Colors in top-to-bottom row order; 32 bpp unless changed.
    pub fn from_colors(width: u32, height: u32, colors: Vec<[u8; 4]>) -> Self {
        assert_eq!(colors.len(), (width * height) as usize);
        Self {
            width,
            height,
            bpp: 32,
            header_bpp: None,
            header_dims: None,
            top_down: false,
            compression: 0,
            colors,
            indexed: None,
            mask: vec![false; (width * height) as usize],
        }
    }

    pub fn indexed(
        width: u32,
        height: u32,
        bpp: u16,
        palette: Vec<[u8; 3]>,
        indices: Vec<u8>,
    ) -> Self {
        let mut builder = Self::solid(width, height, [0, 0, 0, 255]).bpp(bpp);
        assert_eq!(indices.len(), (width * height) as usize);
        builder.indexed = Some((palette, indices));
        builder
    }

    pub fn bpp(mut self, bpp: u16) -> Self {
        self.bpp = bpp;
        self
    }

    /// Declare a bit depth in the header without changing the encoded data.
    pub fn raw_bpp(mut self, bpp: u16) -> Self {
        self.header_bpp = Some(bpp);
        self
    }

    pub fn header_dims(mut self, width: i32, height: i32) -> Self {
        self.header_dims = Some((width, height));
        self
    }

    pub fn top_down(mut self) -> Self {
        self.top_down = true;
        self
    }

    pub fn compression(mut self, compression: u32) -> Self {
        self.compression = compression;
        self
    }

    pub fn mask(mut self, mask: Vec<bool>) -> Self {
        assert_eq!(mask.len(), self.mask.len());
        self.mask = mask;
        self
    }

    pub fn transparent_at(mut self, x: u32, y: u32) -> Self {
        self.mask[(y * self.width + x) as usize] = true;
        self
    }

    fn palette_and_indices(&self) -> (Vec<[u8; 3]>, Vec<u8>) {
        if let Some((palette, indices)) = &self.indexed {
            return (palette.clone(), indices.clone());
        }
        let mut palette: Vec<[u8; 3]> = Vec::new();
        let indices = self
            .colors
            .iter()
            .map(|c| {
                let rgb = [c[0], c[1], c[2]];
                let idx = palette.iter().position(|p| *p == rgb).unwrap_or_else(|| {
                    palette.push(rgb);
                    palette.len() - 1
                });
                idx as u8
            })
            .collect();
        (palette, indices)
    }

    pub fn build(self) -> Vec<u8> {
        let (w, h) = (self.width as usize, self.height as usize);
        let (header_w, header_h) = self.header_dims.unwrap_or_else(|| {
            let stacked = (self.height * 2) as i32;
            (self.width as i32, if self.top_down { -stacked } else { stacked })
        });

        let mut out = Vec::new();
        out.write_u32::<LittleEndian>(40).unwrap();
        out.write_i32::<LittleEndian>(header_w).unwrap();
        out.write_i32::<LittleEndian>(header_h).unwrap();
        out.write_u16::<LittleEndian>(1).unwrap();
        out.write_u16::<LittleEndian>(self.header_bpp.unwrap_or(self.bpp)).unwrap();
        out.write_u32::<LittleEndian>(self.compression).unwrap();
        out.write_all(&[0u8; 20]).unwrap();

        let (palette, indices) = self.palette_and_indices();
        if self.bpp <= 8 {
            for i in 0..(1usize << self.bpp) {
                let [r, g, b] = palette.get(i).copied().unwrap_or([0, 0, 0]);
                out.write_all(&[b, g, r, 0]).unwrap();
            }
        }

        let stored_rows = |r: usize| if self.top_down { r } else { h - 1 - r };

        let stride = row_stride(self.width, self.bpp);
        for r in 0..h {
            let y = stored_rows(r);
            let mut row = vec![0u8; stride];
            for x in 0..w {
                let i = y * w + x;
                let c = self.colors[i];
                match self.bpp {
                    1 => row[x / 8] |= (indices[i] & 1) << (7 - x % 8),
                    4 => row[x / 2] |= (indices[i] & 0x0F) << if x % 2 == 0 { 4 } else { 0 },
                    8 => row[x] = indices[i],
                    24 => row[x * 3..x * 3 + 3].copy_from_slice(&[c[2], c[1], c[0]]),
                    _ => row[x * 4..x * 4 + 4].copy_from_slice(&[c[2], c[1], c[0], c[3]]),
                }
            }
            out.write_all(&row).unwrap();
        }

        let mask_stride = row_stride(self.width, 1);
        for r in 0..h {
            let y = stored_rows(r);
            let mut row = vec![0u8; mask_stride];
            for x in 0..w {
                if self.mask[y * w + x] {
                    row[x / 8] |= 0x80 >> (x % 8);
                }
            }
            out.write_all(&row).unwrap();
        }

        out
    }
}

struct EntrySpec {
    width: u8,
    height: u8,
    field_a: u16,
    field_b: u16,
    payload: Vec<u8>,
}

pub struct CurBuilder {
    image_type: u16,
    entries: Vec<EntrySpec>,
}

impl CurBuilder {
    pub fn cursor() -> Self {
        Self {
            image_type: 2,
            entries: Vec::new(),
        }
    }

    pub fn icon() -> Self {
        Self {
            image_type: 1,
            entries: Vec::new(),
        }
    }

    /// `field_a`/`field_b` are the hotspot for cursors, planes/bpp for icons.
    pub fn entry(
        mut self,
        width: u8,
        height: u8,
        field_a: u16,
        field_b: u16,
        payload: Vec<u8>,
    ) -> Self {
        self.entries.push(EntrySpec {
            width,
            height,
            field_a,
            field_b,
            payload,
        });
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(self.image_type).unwrap();
        out.write_u16::<LittleEndian>(self.entries.len() as u16).unwrap();

        let mut offset = 6 + self.entries.len() * 16;
        for entry in &self.entries {
            out.write_u8(entry.width).unwrap();
            out.write_u8(entry.height).unwrap();
            out.write_u8(0).unwrap();
            out.write_u8(0).unwrap();
            out.write_u16::<LittleEndian>(entry.field_a).unwrap();
            out.write_u16::<LittleEndian>(entry.field_b).unwrap();
            out.write_u32::<LittleEndian>(entry.payload.len() as u32).unwrap();
            out.write_u32::<LittleEndian>(offset as u32).unwrap();
            offset += entry.payload.len();
        }
        for entry in &self.entries {
            out.write_all(&entry.payload).unwrap();
        }
        out
    }
}

fn dir_dim(size: u32) -> u8 {
    if size >= 256 { 0 } else { size as u8 }
}

/// Single-entry 32bpp cursor filled with one color.
pub fn solid_cursor(size: u32, rgba: [u8; 4], hotspot: (u16, u16)) -> Vec<u8> {
    multi_size_cursor(&[size], rgba, hotspot)
}

/// One 32bpp entry per size, in the given directory order.
pub fn multi_size_cursor(sizes: &[u32], rgba: [u8; 4], hotspot: (u16, u16)) -> Vec<u8> {
    sizes
        .iter()
        .fold(CurBuilder::cursor(), |builder, &size| {
            builder.entry(
                dir_dim(size),
                dir_dim(size),
                hotspot.0,
                hotspot.1,
                DibBuilder::solid(size, size, rgba).build(),
            )
        })
        .build()
}

pub fn png_payload(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Distinct opaque color per frame index.
pub fn frame_color(idx: usize) -> [u8; 4] {
    [(idx * 40 % 256) as u8, 100, (255 - idx * 40 % 256) as u8, 255]
}

pub struct AniBuilder {
    frames: Vec<Vec<u8>>,
    declared_frames: Option<u32>,
    steps: Option<u32>,
    rate: u32,
    flags: u32,
    header_len: usize,
    with_header: bool,
    with_frames: bool,
    rates: Option<Vec<u32>>,
    sequence: Option<Vec<u32>>,
    extra: Vec<([u8; 4], Vec<u8>)>,
}

impl AniBuilder {
    /// `frame_count` single-size 32px frames, each a different color.
    pub fn new(frame_count: usize) -> Self {
        Self::with_frames(
            (0..frame_count)
                .map(|i| solid_cursor(32, frame_color(i), (1, 1)))
                .collect(),
        )
    }

    pub fn with_frames(frames: Vec<Vec<u8>>) -> Self {
        Self {
            frames,
            declared_frames: None,
            steps: None,
            rate: 6,
            flags: 0,
            header_len: 36,
            with_header: true,
            with_frames: true,
            rates: None,
            sequence: None,
            extra: Vec::new(),
        }
    }

    pub fn declared_frames(mut self, count: u32) -> Self {
        self.declared_frames = Some(count);
        self
    }

    pub fn steps(mut self, steps: u32) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn rate(mut self, jiffies: u32) -> Self {
        self.rate = jiffies;
        self
    }

    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    pub fn header_len(mut self, len: usize) -> Self {
        self.header_len = len;
        self
    }

    pub fn without_header(mut self) -> Self {
        self.with_header = false;
        self
    }

    pub fn without_frames(mut self) -> Self {
        self.with_frames = false;
        self
    }

    pub fn rates(mut self, rates: &[u32]) -> Self {
        self.rates = Some(rates.to_vec());
        self
    }

    pub fn sequence(mut self, sequence: &[u32]) -> Self {
        self.sequence = Some(sequence.to_vec());
        self
    }

    pub fn extra_chunk(mut self, id: [u8; 4], data: &[u8]) -> Self {
        self.extra.push((id, data.to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut body = Vec::new();

        if self.with_header {
            let declared = self.declared_frames.unwrap_or(self.frames.len() as u32);
            let mut anih = Vec::new();
            for field in [
                36,
                declared,
                self.steps.unwrap_or(self.frames.len() as u32),
                0,
                0,
                0,
                0,
                self.rate,
                self.flags,
            ] {
                anih.write_u32::<LittleEndian>(field).unwrap();
            }
            anih.truncate(self.header_len);
            write_chunk(&mut body, b"anih", &anih);
        }

        if let Some(rates) = &self.rates {
            write_chunk(&mut body, b"rate", &u32_bytes(rates));
        }
        if let Some(sequence) = &self.sequence {
            write_chunk(&mut body, b"seq ", &u32_bytes(sequence));
        }
        for (id, data) in &self.extra {
            write_chunk(&mut body, id, data);
        }

        if self.with_frames {
            let mut list = b"fram".to_vec();
            for frame in &self.frames {
                write_chunk(&mut list, b"icon", frame);
            }
            write_chunk(&mut body, b"LIST", &list);
        }

        let mut out = Vec::new();
        out.write_all(b"RIFF").unwrap();
        out.write_u32::<LittleEndian>(body.len() as u32 + 4).unwrap();
        out.write_all(b"ACON").unwrap();
        out.write_all(&body).unwrap();
        out
    }
}

fn u32_bytes(values: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    for &v in values {
        out.write_u32::<LittleEndian>(v).unwrap();
    }
    out
}

fn write_chunk(out: &mut Vec<u8>, id: &[u8; 4], data: &[u8]) {
    out.write_all(id).unwrap();
    out.write_u32::<LittleEndian>(data.len() as u32).unwrap();
    out.write_all(data).unwrap();
    if data.len() % 2 == 1 {
        out.push(0);
    }
}
