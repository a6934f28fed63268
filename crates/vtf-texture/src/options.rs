//! Decoder configuration.

/// Options controlling how frames are laid out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Row stride of decoded frames is rounded up to a multiple of this many
    /// bytes. 0 and 1 both mean tightly packed rows.
    pub row_alignment: usize,
}

impl DecodeOptions {
    /// Row alignment used by [`Default`], matching common pixbuf consumers.
    pub const DEFAULT_ROW_ALIGNMENT: usize = 4;

    /// Options producing tightly packed rows.
    pub const fn packed() -> Self {
        Self { row_alignment: 1 }
    }

    /// Set the row alignment.
    pub const fn with_row_alignment(mut self, row_alignment: usize) -> Self {
        self.row_alignment = row_alignment;
        self
    }

    /// Row stride in bytes for a row of `row_bytes` meaningful bytes.
    pub fn stride_for(&self, row_bytes: usize) -> usize {
        row_bytes
            .checked_next_multiple_of(self.row_alignment.max(1))
            .unwrap_or(usize::MAX)
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            row_alignment: Self::DEFAULT_ROW_ALIGNMENT,
        }
    }
}
