//! Resolving a (lane, frame) pair to a concrete sheet and sprite.

use crate::metrics::{SheetSpec, SpriteSpec};

/// Result of a sprite lookup. Both fields are `None` when the index lies
/// beyond the sprites measured so far.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpriteLocation<'a> {
    /// Sheet holding the sprite
    pub sheet: Option<&'a SheetSpec>,
    /// The sprite rectangle
    pub sprite: Option<&'a SpriteSpec>,
}

impl<'a> SpriteLocation<'a> {
    /// Both sheet and sprite, when resolved.
    #[inline]
    pub fn resolved(&self) -> Option<(&'a SheetSpec, &'a SpriteSpec)> {
        Some((self.sheet?, self.sprite?))
    }
}

/// Find the sheet and sprite for `frame` in `lane`.
///
/// Frames are laid out lane after lane (`lane * frames_per_lane + frame`)
/// and sheets are consumed in order, so content may be split across many
/// images, each of which may itself be a packed sheet.
///
/// ## Example
///
/// ```rust
/// use spinview_core::{find_specs, measure, ImageSize, MeasureOptions, NoProbe};
///
/// let options = MeasureOptions { frames_x: Some(3), frames_y: Some(3), ..Default::default() };
/// let sheets = measure(&[ImageSize::new(30, 30), ImageSize::new(30, 30)], &options, &mut NoProbe);
///
/// let found = find_specs(&sheets, 3, 1, 4);
/// let (sheet, sprite) = found.resolved().unwrap();
/// assert_eq!((sheet.id, sprite.id), (1, 4));
///
/// assert!(find_specs(&sheets, 3, 0, 6).resolved().is_none());
/// ```
pub fn find_specs(sheets: &[SheetSpec], frames_per_lane: usize, frame: usize, lane: usize) -> SpriteLocation<'_> {
    let Some(mut sprite_id) = lane
        .checked_mul(frames_per_lane)
        .and_then(|offset| offset.checked_add(frame))
    else {
        return SpriteLocation::default();
    };

    for sheet in sheets {
        if let Some(sprite) = sheet.sprites.get(sprite_id) {
            return SpriteLocation {
                sheet: Some(sheet),
                sprite: Some(sprite),
            };
        }
        sprite_id -= sheet.sprite_count();
    }
    SpriteLocation::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{measure, ImageSize, MeasureOptions, NoProbe};

    const NAMES: [[&str; 9]; 2] = [
        ["a1", "a2", "a3", "b1", "b2", "b3", "c1", "c2", "c3"],
        ["x1", "x2", "x3", "y1", "y2", "y3", "z1", "z2", "z3"],
    ];

    fn two_sheets() -> Vec<SheetSpec> {
        let options = MeasureOptions {
            frames_x: Some(3),
            frames_y: Some(3),
            ..Default::default()
        };
        measure(&[ImageSize::new(90, 90), ImageSize::new(90, 90)], &options, &mut NoProbe)
    }

    fn name_of(location: SpriteLocation<'_>) -> Option<&'static str> {
        location
            .resolved()
            .map(|(sheet, sprite)| NAMES[sheet.id][sprite.id])
    }

    #[test]
    fn test_lookup_across_sheets() {
        let sheets = two_sheets();
        assert_eq!(name_of(find_specs(&sheets, 3, 0, 0)), Some("a1"));
        assert_eq!(name_of(find_specs(&sheets, 3, 0, 3)), Some("x1"));
        assert_eq!(name_of(find_specs(&sheets, 3, 1, 2)), Some("c2"));
        assert_eq!(name_of(find_specs(&sheets, 3, 2, 5)), Some("z3"));
    }

    #[test]
    fn test_lookup_beyond_sprites() {
        let sheets = two_sheets();
        let found = find_specs(&sheets, 3, 0, 6);
        assert!(found.sheet.is_none());
        assert!(found.sprite.is_none());
        assert!(find_specs(&sheets, 3, 0, usize::MAX).resolved().is_none());
    }

    #[test]
    fn test_lookup_without_metrics() {
        assert_eq!(find_specs(&[], 36, 0, 0), SpriteLocation::default());
    }

    #[test]
    fn test_lookup_frame_images() {
        let images = vec![ImageSize::new(10, 10); 4];
        let sheets = measure(&images, &MeasureOptions::default(), &mut NoProbe);
        let (sheet, sprite) = find_specs(&sheets, 2, 1, 1).resolved().unwrap();
        assert_eq!(sheet.id, 3);
        assert_eq!(sprite.id, 0);
    }
}
