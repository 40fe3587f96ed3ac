//! Sprite-sheet geometry
//!
//! Maps a frame index to the pixel offset of that frame inside its sheet.
//! Frames are laid out left to right, then top to bottom.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Immutable description of one sprite sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSheet", into = "RawSheet")]
pub struct SpriteSheetInfo {
    tag: String,
    sheet_width: u32,
    sheet_height: u32,
    frame_width: u32,
    frame_height: u32,
    frame_count: u32,
}

/// Unchecked wire form; only reachable through `SpriteSheetInfo::new`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawSheet {
    tag: String,
    sheet_width: u32,
    sheet_height: u32,
    frame_width: u32,
    frame_height: u32,
    frame_count: u32,
}

impl SpriteSheetInfo {
    pub fn new(
        tag: impl Into<String>,
        sheet_width: u32,
        sheet_height: u32,
        frame_width: u32,
        frame_height: u32,
        frame_count: u32,
    ) -> Result<Self, ConfigError> {
        let tag = tag.into();
        let fail = |reason: String| ConfigError::Sheet {
            tag: tag.clone(),
            reason,
        };

        if frame_width == 0 || frame_height == 0 {
            return Err(fail("frame dimensions must be non-zero".into()));
        }
        if frame_width > sheet_width || frame_height > sheet_height {
            return Err(fail(format!(
                "frame {frame_width}x{frame_height} does not fit sheet {sheet_width}x{sheet_height}"
            )));
        }
        if frame_count == 0 {
            return Err(fail("frame count must be non-zero".into()));
        }
        let capacity = (sheet_width / frame_width) * (sheet_height / frame_height);
        if frame_count > capacity {
            return Err(fail(format!(
                "{frame_count} frames exceed sheet capacity of {capacity}"
            )));
        }

        Ok(Self {
            tag,
            sheet_width,
            sheet_height,
            frame_width,
            frame_height,
            frame_count,
        })
    }

    /// Unchecked constructor for the default sheets in `SheetConfig`
    pub(crate) fn builtin(
        tag: &str,
        sheet_width: u32,
        sheet_height: u32,
        frame_width: u32,
        frame_height: u32,
        frame_count: u32,
    ) -> Self {
        Self {
            tag: tag.to_string(),
            sheet_width,
            sheet_height,
            frame_width,
            frame_height,
            frame_count,
        }
    }

    /// Host-side tag (CSS class, texture key) for this sheet
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn frame_size(&self) -> Vec2 {
        Vec2::new(self.frame_width as f32, self.frame_height as f32)
    }

    pub fn sheet_size(&self) -> Vec2 {
        Vec2::new(self.sheet_width as f32, self.sheet_height as f32)
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Frames per row
    pub fn columns(&self) -> u32 {
        self.sheet_width / self.frame_width
    }

    /// Top-left pixel of `index` within the sheet, or `None` past the last frame
    pub fn frame_offset(&self, index: u32) -> Option<Vec2> {
        if index >= self.frame_count {
            return None;
        }
        let columns = self.columns();
        let col = index % columns;
        let row = index / columns;
        Some(Vec2::new(
            (col * self.frame_width) as f32,
            (row * self.frame_height) as f32,
        ))
    }
}

impl TryFrom<RawSheet> for SpriteSheetInfo {
    type Error = ConfigError;

    fn try_from(raw: RawSheet) -> Result<Self, Self::Error> {
        Self::new(
            raw.tag,
            raw.sheet_width,
            raw.sheet_height,
            raw.frame_width,
            raw.frame_height,
            raw.frame_count,
        )
    }
}

impl From<SpriteSheetInfo> for RawSheet {
    fn from(sheet: SpriteSheetInfo) -> Self {
        Self {
            tag: sheet.tag,
            sheet_width: sheet.sheet_width,
            sheet_height: sheet.sheet_height,
            frame_width: sheet.frame_width,
            frame_height: sheet.frame_height,
            frame_count: sheet.frame_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid() -> SpriteSheetInfo {
        // 4 columns x 2 rows, last slot unused
        SpriteSheetInfo::new("avatar", 256, 128, 64, 64, 7).unwrap()
    }

    #[test]
    fn test_frame_offsets_walk_rows() {
        let sheet = grid();
        assert_eq!(sheet.frame_offset(0), Some(Vec2::ZERO));
        assert_eq!(sheet.frame_offset(3), Some(Vec2::new(192.0, 0.0)));
        assert_eq!(sheet.frame_offset(4), Some(Vec2::new(0.0, 64.0)));
        assert_eq!(sheet.frame_offset(6), Some(Vec2::new(128.0, 64.0)));
        assert_eq!(sheet.frame_offset(7), None);
    }

    #[test]
    fn test_rejects_too_many_frames() {
        let err = SpriteSheetInfo::new("emote", 128, 64, 64, 64, 3).unwrap_err();
        assert!(matches!(err, ConfigError::Sheet { .. }));
    }

    #[test]
    fn test_rejects_zero_sizes() {
        assert!(SpriteSheetInfo::new("a", 64, 64, 0, 64, 1).is_err());
        assert!(SpriteSheetInfo::new("a", 64, 64, 64, 64, 0).is_err());
        assert!(SpriteSheetInfo::new("a", 32, 64, 64, 64, 1).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok = r#"{"tag":"t","sheet_width":100,"sheet_height":50,"frame_width":50,"frame_height":50,"frame_count":2}"#;
        let sheet: SpriteSheetInfo = serde_json::from_str(ok).unwrap();
        assert_eq!(sheet.columns(), 2);

        let bad = r#"{"tag":"t","sheet_width":100,"sheet_height":50,"frame_width":50,"frame_height":50,"frame_count":3}"#;
        assert!(serde_json::from_str::<SpriteSheetInfo>(bad).is_err());
    }

    proptest! {
        #[test]
        fn every_frame_fits_on_sheet(cols in 1u32..10, rows in 1u32..10, fw in 1u32..128, fh in 1u32..128, pick in 0u32..100) {
            let count = cols * rows;
            let sheet = SpriteSheetInfo::new("p", cols * fw, rows * fh, fw, fh, count).unwrap();
            let index = pick % count;
            let offset = sheet.frame_offset(index).unwrap();
            prop_assert!(offset.x + fw as f32 <= sheet.sheet_size().x);
            prop_assert!(offset.y + fh as f32 <= sheet.sheet_size().y);
        }
    }
}
