// Cursor data types for pipeline operations

use std::collections::BTreeMap;

use super::wincur::CursorImage;

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedFrame {
    pub image: CursorImage,
    pub delay_ms: u32,
}

impl ConvertedFrame {
    pub fn size(&self) -> u32 {
        self.image.nominal_size()
    }
}

/// Frames of one converted cursor, grouped by size.
///
/// Each size group holds one frame per animation step, in playback order.
/// Static cursors carry a single frame per size with a zero delay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertedCursor {
    pub frames: Vec<ConvertedFrame>,
    pub animated: bool,
}

impl ConvertedCursor {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Nominal size to frame count.
    pub fn size_summary(&self) -> BTreeMap<u32, usize> {
        let mut summary = BTreeMap::new();
        for frame in &self.frames {
            *summary.entry(frame.size()).or_insert(0) += 1;
        }
        summary
    }

    pub fn sizes(&self) -> Vec<u32> {
        self.size_summary().into_keys().collect()
    }

    pub fn frames_of_size(&self, size: u32) -> impl Iterator<Item = &ConvertedFrame> {
        self.frames.iter().filter(move |frame| frame.size() == size)
    }

    pub fn summary_lines(&self) -> Vec<String> {
        self.size_summary()
            .into_iter()
            .map(|(size, count)| {
                let noun = if count == 1 { "frame" } else { "frames" };
                format!("{}x{}: {} {}", size, size, count, noun)
            })
            .collect()
    }
}
