//! Image loading progress reported by the host.

/// Progress of the host's image loading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadProgress {
    /// Number of images loaded
    pub loaded: usize,
    /// Total number of images to load
    pub total: usize,
}

impl LoadProgress {
    /// Create a progress record.
    pub fn new(loaded: usize, total: usize) -> Self {
        Self {
            loaded: loaded.min(total),
            total,
        }
    }

    /// Loading percentage (0-100).
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            0
        } else {
            ((self.loaded as f32 / self.total as f32) * 100.0) as u8
        }
    }

    /// Check if every image is loaded.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.loaded >= self.total
    }

    /// Format a loading message.
    pub fn message(&self) -> String {
        if self.total > 0 {
            format!(
                "Loading images... {} / {} ({}%)",
                self.loaded,
                self.total,
                self.percent()
            )
        } else {
            "Loading images...".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress() {
        let progress = LoadProgress::new(0, 10);
        assert_eq!(progress.percent(), 0);
        assert!(!progress.is_complete());

        let progress = LoadProgress::new(5, 10);
        assert_eq!(progress.percent(), 50);
        assert_eq!(progress.message(), "Loading images... 5 / 10 (50%)");

        let progress = LoadProgress::new(12, 10);
        assert!(progress.is_complete());
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn test_empty_progress() {
        let progress = LoadProgress::default();
        assert_eq!(progress.percent(), 0);
        assert!(!progress.is_complete());
        assert_eq!(progress.message(), "Loading images...");
    }
}
