//! Fixed 18-byte response frame of the weighing terminal.
//!
//! ```text
//! 0     1..=3     4..=9       10..=15      16   17
//! STX   unused    weight      secondary    CR   STX
//! ```
//!
//! Fields are space-padded text, decoded lossily. The trailing byte is
//! expected to repeat STX.

pub const FRAME_LEN: usize = 18;
pub const STX: u8 = 0x02;
pub const CR: u8 = 0x0D;

const STX_INDEX: usize = 0;
const CR_INDEX: usize = 16;
const TRAILER_INDEX: usize = 17;
const WEIGHT_FIELD: std::ops::Range<usize> = 4..10;
const SECONDARY_FIELD: std::ops::Range<usize> = 10..16;

/// One raw frame, exactly `FRAME_LEN` bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LEN]);

/// Decoded payload of a well-formed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightFrame {
    pub weight: String,
    pub secondary: String,
}

impl Frame {
    pub fn new(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }

    /// Cut a frame from the front of an accumulation buffer.
    ///
    /// Returns `None` while fewer than `FRAME_LEN` bytes are available.
    /// Anything past the first `FRAME_LEN` bytes is ignored.
    pub fn from_accumulated(bytes: &[u8]) -> Option<Self> {
        let head = bytes.get(..FRAME_LEN)?;
        let mut frame = [0u8; FRAME_LEN];
        frame.copy_from_slice(head);
        Some(Self(frame))
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    pub fn is_well_formed(&self) -> bool {
        self.0[STX_INDEX] == STX && self.0[CR_INDEX] == CR && self.0[TRAILER_INDEX] == STX
    }

    /// Decode the payload.
    ///
    /// A malformed frame yields `None` and the cycle simply produces no
    /// reading. Field bytes are never rejected: invalid UTF-8 is replaced
    /// with U+FFFD.
    pub fn decode(&self) -> Option<WeightFrame> {
        if !self.is_well_formed() {
            return None;
        }

        Some(WeightFrame {
            weight: text_field(&self.0[WEIGHT_FIELD]),
            secondary: text_field(&self.0[SECONDARY_FIELD]),
        })
    }
}

/// Lossy text of a space-padded field, trimmed
fn text_field(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}
