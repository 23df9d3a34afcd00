use naia_serde::BitWrite;

/// Unbounded bit sink for sync messages. A full tier order does not fit an
/// MTU-sized `BitWriter`, so bits are appended to a growable byte buffer in
/// the order `BitReader` consumes them: least significant bit first.
pub struct PayloadWriter {
    bytes: Vec<u8>,
    bit_count: u32,
}

impl PayloadWriter {
    pub fn new() -> Self {
        Self::with_bit_capacity(0)
    }

    /// Reserves room for `bits` up front, e.g. from `Serde::bit_length`
    pub fn with_bit_capacity(bits: u32) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8) as usize),
            bit_count: 0,
        }
    }

    /// Bits written so far
    pub fn bit_count(&self) -> u32 {
        self.bit_count
    }

    /// Length of the payload `to_bytes` would return
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn to_bytes(self) -> Box<[u8]> {
        self.bytes.into_boxed_slice()
    }

    fn bit_offset(&self) -> u32 {
        self.bit_count % 8
    }
}

impl Default for PayloadWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWrite for PayloadWriter {
    fn write_bit(&mut self, bit: bool) {
        let offset = self.bit_offset();
        if offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 1 << offset;
            }
        }
        self.bit_count += 1;
    }

    fn write_byte(&mut self, byte: u8) {
        // aligned bytes are appended whole
        if self.bit_offset() == 0 {
            self.bytes.push(byte);
            self.bit_count += 8;
            return;
        }
        for index in 0..8 {
            self.write_bit(byte & (1 << index) != 0);
        }
    }

    fn is_counter(&self) -> bool {
        false
    }

    fn count_bits(&mut self, _bits: u32) {}
}
