//! Extractor configuration
//!
//! The crate reads no files and no environment variables. Hosts that keep
//! their settings in a config file can embed [`ExtractorConfig`] there and
//! deserialize it with serde; every field has a default.

use crate::error::{ParseError, Result};
use serde::{Deserialize, Serialize};

/// Default read budget for the header block (1 MiB)
pub const DEFAULT_MAX_HEADER_BYTES: usize = 1024 * 1024;

/// Default pivot for two-digit years
pub const DEFAULT_YEAR_PIVOT: u16 = 70;

/// Tunables for one [`Extractor`](crate::Extractor)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Two-digit years below this value map to 20xx, the rest to 19xx
    pub two_digit_year_pivot: u16,

    /// Maximum number of bytes read while looking for the end of the headers.
    /// Reaching it truncates the header block; it is not an error.
    pub max_header_bytes: usize,

    /// Decode RFC 2047 encoded words in display names and the subject
    pub decode_encoded_words: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            two_digit_year_pivot: DEFAULT_YEAR_PIVOT,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            decode_encoded_words: true,
        }
    }
}

impl ExtractorConfig {
    /// Check that the values are usable
    pub fn validate(&self) -> Result<()> {
        if self.two_digit_year_pivot > 99 {
            return Err(ParseError::Config(format!(
                "two_digit_year_pivot must be between 0 and 99, got {}",
                self.two_digit_year_pivot
            )));
        }
        if self.max_header_bytes == 0 {
            return Err(ParseError::Config(
                "max_header_bytes must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
