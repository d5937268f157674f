//! Tracker configuration
//!
//! Defaults reproduce the reference extraction: 4 KiB pages, a 10-page
//! tracking threshold and one recorded page per reference.

use pagescope_common::{MEM_AREA_THRESHOLD_PAGES, PAGE_SHIFT, TYPE_SHIFT};
use serde::Serialize;

use crate::domain::ExtractError;

/// Which pages a single reference event contributes to the sequences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceSpan {
    /// Only the page containing the start address
    #[default]
    StartPage,
    /// Every page touched by `[address, address + size)`
    ///
    /// A zero-sized reference still records its start page.
    EveryPage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerConfig {
    /// log2 of the page size
    pub page_shift: u32,

    /// Minimum page-aligned span, in pages, for an allocation to get a region
    pub threshold_pages: u64,

    pub reference_span: ReferenceSpan,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            page_shift: PAGE_SHIFT,
            threshold_pages: MEM_AREA_THRESHOLD_PAGES,
            reference_span: ReferenceSpan::StartPage,
        }
    }
}

impl TrackerConfig {
    /// Page size in bytes
    #[must_use]
    pub fn page_size(&self) -> u64 {
        1 << self.page_shift
    }

    /// Tracking threshold in bytes of page-aligned span
    #[must_use]
    pub fn threshold_bytes(&self) -> u64 {
        self.threshold_pages.saturating_mul(self.page_size())
    }

    /// Check the configuration can drive a tracker
    ///
    /// # Errors
    /// Returns [`ExtractError::InvalidConfig`] when the page shift does not fit
    /// inside the 60-bit address payload or the threshold is zero.
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.page_shift == 0 || self.page_shift >= TYPE_SHIFT {
            return Err(ExtractError::InvalidConfig(format!(
                "page shift must be within 1..{TYPE_SHIFT}, got {}",
                self.page_shift
            )));
        }
        // Zero-span regions cannot be told apart in the live index
        if self.threshold_pages == 0 {
            return Err(ExtractError::InvalidConfig(
                "threshold must be at least one page".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let config = TrackerConfig::default();
        assert_eq!(config.page_size(), 4096);
        assert_eq!(config.threshold_bytes(), 40 * 1024);
        assert_eq!(config.reference_span, ReferenceSpan::StartPage);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_page_shift() {
        for page_shift in [0, 60, 64] {
            let config = TrackerConfig { page_shift, ..TrackerConfig::default() };
            assert!(matches!(config.validate(), Err(ExtractError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_rejects_zero_threshold() {
        let config = TrackerConfig { threshold_pages: 0, ..TrackerConfig::default() };
        assert!(config.validate().is_err());
    }
}
