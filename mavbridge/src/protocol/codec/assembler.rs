const STX_V1: u8 = 0xFE;
const STX_V2: u8 = 0xFD;

const HEADER_V1_LEN: usize = 6;
const HEADER_V2_LEN: usize = 10;
const CHECKSUM_LEN: usize = 2;
const SIGNATURE_LEN: usize = 13;
const MAVLINK_IFLAG_SIGNED: u8 = 0x01;

/// Incremental frame assembler over the inbound byte stream.
///
/// Bytes that do not belong to a frame are skipped until the next magic byte. Assembled frames
/// are only structurally complete, their checksum is not validated here.
#[derive(Clone, Debug, Default)]
pub(super) struct FrameAssembler {
    buf: Vec<u8>,
    expected: Option<usize>,
}

impl FrameAssembler {
    /// Pushes a byte and returns raw frame bytes once a frame is complete.
    pub(super) fn push(&mut self, byte: u8) -> Option<Vec<u8>> {
        if self.buf.is_empty() {
            if byte == STX_V1 || byte == STX_V2 {
                self.buf.push(byte);
            }
            return None;
        }

        self.buf.push(byte);

        if self.expected.is_none() {
            self.expected = self.frame_len();
        }

        match self.expected {
            Some(len) if self.buf.len() >= len => {
                self.expected = None;
                Some(std::mem::take(&mut self.buf))
            }
            _ => None,
        }
    }

    #[cfg(test)]
    fn pending(&self) -> usize {
        self.buf.len()
    }

    fn frame_len(&self) -> Option<usize> {
        match self.buf[0] {
            STX_V1 if self.buf.len() >= 2 => {
                Some(HEADER_V1_LEN + self.buf[1] as usize + CHECKSUM_LEN)
            }
            STX_V2 if self.buf.len() >= 3 => {
                let signature = if self.buf[2] & MAVLINK_IFLAG_SIGNED != 0 {
                    SIGNATURE_LEN
                } else {
                    0
                };
                Some(HEADER_V2_LEN + self.buf[1] as usize + CHECKSUM_LEN + signature)
            }
            _ => None,
        }
    }
}
