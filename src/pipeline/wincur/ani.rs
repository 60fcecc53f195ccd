use super::bytes::{ByteReader, fourcc_str};
use super::riff::{Chunk, LIST_TAG, RiffReader, chunks};
use crate::error::{CursorError, Result};

const ANI_TYPE: &[u8; 4] = b"ACON";
const HEADER_CHUNK: &[u8; 4] = b"anih";
const SEQ_CHUNK: &[u8; 4] = b"seq ";
const RATE_CHUNK: &[u8; 4] = b"rate";
const FRAME_TYPE: &[u8; 4] = b"fram";
const ICON_CHUNK: &[u8; 4] = b"icon";

const HEADER_SIZE: usize = 36;

/// Default display rate when the header reports zero (10 jiffies, ~167ms).
pub const DEFAULT_JIFFIES: u32 = 10;

/// `anih` flag bit 0: a playback sequence is present.
pub const FLAG_SEQUENCE: u32 = 0x1;
/// `anih` flag bit 1: frame payloads are raw bitmaps.
pub const FLAG_RAW: u32 = 0x2;

/// Convert jiffies (1/60 s) to milliseconds, rounding to nearest.
///
/// Zero is replaced by [`DEFAULT_JIFFIES`].
pub fn jiffies_to_ms(jiffies: u32) -> u32 {
    let jiffies = if jiffies == 0 { DEFAULT_JIFFIES } else { jiffies };
    let ms = (u64::from(jiffies) * 1000 + 30) / 60;
    u32::try_from(ms).unwrap_or(u32::MAX)
}

/// One embedded icon/cursor container of an animation.
#[derive(Debug, Clone)]
pub struct AnimationFrame {
    pub payload: Vec<u8>,
    pub delay_ms: u32,
}

/// Parsed `RIFF ACON` animation.
#[derive(Debug, Clone)]
pub struct Animation {
    pub frames: Vec<AnimationFrame>,
    pub sequence: Option<Vec<u32>>,
    pub frame_count: u32,
    pub step_count: u32,
    /// Default rate in jiffies
    pub display_rate: u32,
    pub flags: u32,
}

impl Animation {
    /// Resolve a playback step to a frame index, through the sequence if present.
    pub fn step_frame_index(&self, step: usize) -> Result<usize> {
        let steps = self.step_count as usize;
        if step >= steps {
            return Err(CursorError::StepOutOfRange { step, steps });
        }

        let frame_idx = match &self.sequence {
            Some(sequence) => *sequence
                .get(step)
                .ok_or(CursorError::StepOutOfRange {
                    step,
                    steps: sequence.len(),
                })? as usize,
            None => step,
        };

        if frame_idx >= self.frames.len() {
            return Err(CursorError::FrameOutOfRange {
                frame: frame_idx,
                frames: self.frames.len(),
            });
        }
        Ok(frame_idx)
    }

    pub fn step_frame(&self, step: usize) -> Result<&AnimationFrame> {
        let frame_idx = self.step_frame_index(step)?;
        Ok(&self.frames[frame_idx])
    }

    pub fn step_delay_ms(&self, step: usize) -> Result<u32> {
        Ok(self.step_frame(step)?.delay_ms)
    }

    pub fn total_duration_ms(&self) -> Result<u32> {
        (0..self.step_count as usize).try_fold(0u32, |total, step| {
            Ok(total.saturating_add(self.step_delay_ms(step)?))
        })
    }

    pub fn has_sequence_flag(&self) -> bool {
        self.flags & FLAG_SEQUENCE != 0
    }

    pub fn payload_is_raw(&self) -> bool {
        self.flags & FLAG_RAW != 0
    }
}

pub struct AniParser;

#[derive(Debug)]
struct AnihHeader {
    size: u32,
    frame_count: u32,
    step_count: u32,
    display_rate: u32,
    flags: u32,
}

impl AnihHeader {
    fn parse(chunk: &Chunk<'_>) -> Result<Self> {
        if chunk.data.len() < HEADER_SIZE {
            return Err(CursorError::ChunkTooSmall {
                id: chunk.id_str(),
                expected: HEADER_SIZE,
                actual: chunk.data.len(),
            });
        }

        let mut reader = ByteReader::new(chunk.data);
        let size = reader.read_u32()?;
        let frame_count = reader.read_u32()?;
        let step_count = reader.read_u32()?;
        // width, height, bit count, planes
        reader.skip(16)?;
        let display_rate = reader.read_u32()?;
        let flags = reader.read_u32()?;

        if frame_count == 0 {
            return Err(CursorError::ZeroFrames);
        }

        let header = Self {
            size,
            frame_count,
            step_count: if step_count == 0 { frame_count } else { step_count },
            display_rate: if display_rate == 0 {
                DEFAULT_JIFFIES
            } else {
                display_rate
            },
            flags,
        };

        log::debug!(
            "ANI anih: cbSize={}, frames={}, steps={}, rate={}, flags={:#x}",
            header.size,
            header.frame_count,
            header.step_count,
            header.display_rate,
            header.flags
        );

        Ok(header)
    }
}

impl AniParser {
    pub fn can_parse(data: &[u8]) -> bool {
        data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == ANI_TYPE
    }

    pub fn parse<F>(data: &[u8], mut log_fn: F) -> Result<Animation>
    where
        F: FnMut(String),
    {
        let reader = RiffReader::new(data, &mut log_fn)?;

        if &reader.form_type() != ANI_TYPE {
            return Err(CursorError::NotAnimation(fourcc_str(&reader.form_type())));
        }

        let mut anih = None;
        let mut rate = None;
        let mut seq = None;
        let mut fram = None;

        for chunk in reader.chunks() {
            log::debug!("ANI: found chunk '{}'", chunk.id_str());
            match &chunk.id {
                HEADER_CHUNK => anih = Some(chunk),
                RATE_CHUNK => rate = Some(chunk),
                SEQ_CHUNK => seq = Some(chunk),
                LIST_TAG if chunk.form_type.as_ref() == Some(FRAME_TYPE) => fram = Some(chunk),
                // INFO lists and anything unknown
                _ => {}
            }
        }

        let header = AnihHeader::parse(&anih.ok_or(CursorError::MissingChunk("anih"))?)?;

        log::info!(
            "ANI: {} frames, {} steps, default rate {} jiffies ({}ms)",
            header.frame_count,
            header.step_count,
            header.display_rate,
            jiffies_to_ms(header.display_rate)
        );

        let rates = match rate {
            Some(chunk) => Self::read_step_array(&chunk, header.step_count, &mut log_fn)?,
            None => Vec::new(),
        };

        let sequence = match seq {
            Some(chunk) => Self::read_step_array(&chunk, header.step_count, &mut log_fn)?,
            None => Vec::new(),
        };

        let fram = fram.ok_or(CursorError::MissingChunk("LIST fram"))?;
        let mut frames = Self::read_frames(&fram, header.frame_count, &mut log_fn);

        if frames.is_empty() {
            return Err(CursorError::NoFrames);
        }

        let default_delay = jiffies_to_ms(header.display_rate);
        for (idx, frame) in frames.iter_mut().enumerate() {
            frame.delay_ms = rates.get(idx).map_or(default_delay, |&r| jiffies_to_ms(r));
        }

        // rates are per step once a sequence exists; a frame shared by
        // several steps keeps the last one applied
        if !sequence.is_empty() && !rates.is_empty() {
            for (step, &r) in rates.iter().enumerate() {
                let Some(&frame_idx) = sequence.get(step) else {
                    break;
                };
                if let Some(frame) = frames.get_mut(frame_idx as usize) {
                    frame.delay_ms = jiffies_to_ms(r);
                }
            }
        }

        log::info!("ANI: parsed {} frames", frames.len());

        Ok(Animation {
            frames,
            sequence: (!sequence.is_empty()).then_some(sequence),
            frame_count: header.frame_count,
            step_count: header.step_count,
            display_rate: header.display_rate,
            flags: header.flags,
        })
    }

    /// Read a `rate` or `seq ` chunk, at most one entry per step.
    fn read_step_array<F>(chunk: &Chunk<'_>, step_count: u32, mut log_fn: F) -> Result<Vec<u32>>
    where
        F: FnMut(String),
    {
        let entries = chunk.data.len() / 4;
        if entries < step_count as usize {
            log_fn(format!(
                "Warning: ANI '{}' chunk has {} entries, expected {}",
                chunk.id_str(),
                entries,
                step_count
            ));
        }

        let mut reader = ByteReader::new(chunk.data);
        (0..entries.min(step_count as usize))
            .map(|_| reader.read_u32())
            .collect()
    }

    fn read_frames<F>(fram: &Chunk<'_>, frame_count: u32, mut log_fn: F) -> Vec<AnimationFrame>
    where
        F: FnMut(String),
    {
        let frames: Vec<AnimationFrame> = chunks(fram.data)
            .filter(|chunk| &chunk.id == ICON_CHUNK)
            .map(|chunk| AnimationFrame {
                payload: chunk.data.to_vec(),
                delay_ms: 0,
            })
            .collect();

        if frames.len() != frame_count as usize {
            log_fn(format!(
                "Warning: ANI expected {} frames, found {}",
                frame_count,
                frames.len()
            ));
        }

        frames
    }
}
