pub mod ani;
pub mod bytes;
pub mod cur;
pub mod dib;
pub mod riff;

pub use ani::{AniParser, Animation, AnimationFrame, jiffies_to_ms};
pub use bytes::ByteReader;
pub use cur::{CurParser, CursorImage, EntryFormat, IconDir, IconDirEntry, ImageType};
pub use riff::{Chunk, RiffReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorFormat {
    Ani,
    Ico,
    Cur,
}

impl CursorFormat {
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        if AniParser::can_parse(data) {
            Some(CursorFormat::Ani)
        } else if &data[0..4] == b"\x00\x00\x02\x00" {
            Some(CursorFormat::Cur)
        } else if &data[0..4] == b"\x00\x00\x01\x00" {
            Some(CursorFormat::Ico)
        } else {
            None
        }
    }

    pub fn is_animated(self) -> bool {
        self == CursorFormat::Ani
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_format_detection() {
        let cur_data = vec![0x00, 0x00, 0x02, 0x00, 0x01, 0x00];
        assert_eq!(CursorFormat::detect(&cur_data), Some(CursorFormat::Cur));

        let ico_data = vec![0x00, 0x00, 0x01, 0x00, 0x01, 0x00];
        assert_eq!(CursorFormat::detect(&ico_data), Some(CursorFormat::Ico));

        let ani_data = b"RIFF\x00\x00\x00\x00ACON";
        assert_eq!(CursorFormat::detect(ani_data), Some(CursorFormat::Ani));
        assert!(CursorFormat::Ani.is_animated());

        // RIFF but not an animation
        assert_eq!(CursorFormat::detect(b"RIFF\x00\x00\x00\x00WAVE"), None);

        let invalid = vec![0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(CursorFormat::detect(&invalid), None);
        assert_eq!(CursorFormat::detect(&[0, 0]), None);
    }
}
