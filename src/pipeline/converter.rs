// High-level conversion API for Windows cursor files

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use super::cursor_types::{ConvertedCursor, ConvertedFrame};
use super::rescale::rescale_cursor;
use super::size_selection::{SizeFilter, SizePick, select_sizes};
use super::wincur::{AniParser, CurParser, CursorFormat, CursorImage};
use crate::error::{self, CursorError};

/// Decoded images of one animation step.
struct StepImages {
    images: Vec<CursorImage>,
    delay_ms: u32,
}

/// Export `source` at the pick's target size.
///
/// Later animation steps can carry a different size at the picked index, so the
/// size is checked per image rather than trusting `pick.rescale`.
fn export_pick(
    pick: &SizePick,
    source: &CursorImage,
    delay_ms: u32,
) -> error::Result<ConvertedFrame> {
    let image = rescale_cursor(source, pick.target_size)?;
    Ok(ConvertedFrame { image, delay_ms })
}

fn log_rescale(pick: &SizePick, source: &CursorImage) {
    if pick.rescale {
        let size = source.nominal_size();
        log::info!(
            "Rescaling {}x{} -> {}x{}",
            size,
            size,
            pick.target_size,
            pick.target_size
        );
    }
}

/// Convert an `ANI` buffer: every step, every selected size.
pub fn convert_animation<F>(
    data: &[u8],
    filter: &SizeFilter,
    mut log_fn: F,
) -> error::Result<ConvertedCursor>
where
    F: FnMut(String),
{
    let animation = AniParser::parse(data, &mut log_fn)?;

    // frames shared by several steps are decoded once
    let mut decoded: Vec<Option<Vec<CursorImage>>> = vec![None; animation.frames.len()];
    let mut steps = Vec::with_capacity(animation.step_count as usize);

    for step in 0..animation.step_count as usize {
        let frame_idx = animation.step_frame_index(step)?;
        let frame = &animation.frames[frame_idx];

        let images = match &decoded[frame_idx] {
            Some(images) => images.clone(),
            None => {
                let images = CurParser::decode_all(&frame.payload, &mut log_fn)?;
                decoded[frame_idx] = Some(images.clone());
                images
            }
        };

        log::debug!("Step {} (frame {}): {} sizes", step, frame_idx, images.len());
        steps.push(StepImages {
            images,
            delay_ms: frame.delay_ms,
        });
    }

    let first = steps.first().ok_or(CursorError::NoFrames)?;
    let mut size_count = first.images.len();
    if steps.iter().any(|s| s.images.len() != size_count) {
        log_fn("Warning: Inconsistent sizes across frames, using first size only".to_string());
        size_count = 1;
    }

    let picks = select_sizes(&first.images[..size_count], filter);
    if picks.is_empty() {
        return Err(CursorError::NoImagesSelected);
    }

    let mut frames = Vec::with_capacity(picks.len() * steps.len());
    for pick in &picks {
        log_rescale(pick, &first.images[pick.index]);
        for step in &steps {
            frames.push(export_pick(pick, &step.images[pick.index], step.delay_ms)?);
        }
    }

    Ok(ConvertedCursor {
        frames,
        animated: true,
    })
}

/// Convert a static `CUR`/`ICO` buffer; every exported frame has a zero delay.
pub fn convert_static<F>(
    data: &[u8],
    filter: &SizeFilter,
    mut log_fn: F,
) -> error::Result<ConvertedCursor>
where
    F: FnMut(String),
{
    let images = CurParser::decode_all(data, &mut log_fn)?;

    let picks = select_sizes(&images, filter);
    if picks.is_empty() {
        return Err(CursorError::NoImagesSelected);
    }

    let frames = picks
        .iter()
        .map(|pick| {
            log_rescale(pick, &images[pick.index]);
            export_pick(pick, &images[pick.index], 0)
        })
        .collect::<error::Result<Vec<_>>>()?;

    Ok(ConvertedCursor {
        frames,
        animated: false,
    })
}

/// Convert a buffer, choosing the animated or static path by content.
pub fn convert_bytes<F>(
    data: &[u8],
    filter: &SizeFilter,
    log_fn: F,
) -> error::Result<ConvertedCursor>
where
    F: FnMut(String),
{
    match CursorFormat::detect(data) {
        Some(CursorFormat::Ani) => convert_animation(data, filter, log_fn),
        Some(CursorFormat::Cur | CursorFormat::Ico) => convert_static(data, filter, log_fn),
        None => Err(CursorError::UnknownFormat),
    }
}

pub fn convert_file<F>(path: &Path, filter: &SizeFilter, log_fn: F) -> Result<ConvertedCursor>
where
    F: FnMut(String),
{
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    log::info!("Processing: {}", name);

    let data = fs::read(path)
        .with_context(|| format!("Failed to read cursor file {}", path.display()))?;
    let cursor = convert_bytes(&data, filter, log_fn)
        .with_context(|| format!("Failed to convert {}", path.display()))?;

    let summary = cursor.summary_lines();
    log::info!("Exported {} sizes:", summary.len());
    for line in summary {
        log::info!("  {}", line);
    }

    Ok(cursor)
}

/// Distinct nominal sizes in a buffer, over every step of an animation.
pub fn sizes_in_bytes<F>(data: &[u8], mut log_fn: F) -> error::Result<BTreeSet<u32>>
where
    F: FnMut(String),
{
    let mut sizes = BTreeSet::new();
    match CursorFormat::detect(data) {
        Some(CursorFormat::Ani) => {
            let animation = AniParser::parse(data, &mut log_fn)?;
            for step in 0..animation.step_count as usize {
                let frame = animation.step_frame(step)?;
                let images = CurParser::decode_all(&frame.payload, &mut log_fn)?;
                sizes.extend(images.iter().map(CursorImage::nominal_size));
            }
        }
        Some(CursorFormat::Cur | CursorFormat::Ico) => {
            let images = CurParser::decode_all(data, &mut log_fn)?;
            sizes.extend(images.iter().map(CursorImage::nominal_size));
        }
        None => {}
    }
    Ok(sizes)
}

/// Sorted distinct sizes available in a cursor file; empty for other files.
pub fn collect_cursor_sizes(path: &Path) -> Result<Vec<u32>> {
    let data = fs::read(path)
        .with_context(|| format!("Failed to read cursor file {}", path.display()))?;
    let sizes = sizes_in_bytes(&data, |msg| log::warn!("{}: {}", path.display(), msg))
        .with_context(|| format!("Failed to read sizes from {}", path.display()))?;
    Ok(sizes.into_iter().collect())
}
