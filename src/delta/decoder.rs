use crate::errors::{ Result, ErrorKind };
use super::{ read_size, COPY };

/// Applies a git delta to the bytes of its base object.
#[derive(Debug)]
pub struct DeltaDecoder {
    output: Vec<u8>
}

impl DeltaDecoder {
    pub fn new(instructions: &[u8], base: &[u8]) -> Result<DeltaDecoder> {
        let mut idx = 0;
        let base_size = read_size(instructions, &mut idx)
            .ok_or(ErrorKind::BadDeltaInstruction)?;
        let output_size = read_size(instructions, &mut idx)
            .ok_or(ErrorKind::BadDeltaInstruction)?;

        if base_size != base.len() as u64 {
            return Err(ErrorKind::BadDeltaBase.into())
        }

        // the claimed size only bounds the first allocation, it is not trusted
        let hint = output_size.min((base.len() + instructions.len()) as u64);
        let mut output = Vec::with_capacity(hint as usize);
        while idx < instructions.len() {
            let cmd = instructions[idx];
            idx += 1;

            if cmd & COPY != 0 {
                let mut offset = 0usize;
                for (shift, flag) in [0x01u8, 0x02, 0x04, 0x08].iter().enumerate() {
                    if cmd & flag != 0 {
                        let byte = *instructions.get(idx).ok_or(ErrorKind::BadDeltaInstruction)?;
                        offset |= (byte as usize) << (8 * shift);
                        idx += 1;
                    }
                }

                let mut size = 0usize;
                for (shift, flag) in [0x10u8, 0x20, 0x40].iter().enumerate() {
                    if cmd & flag != 0 {
                        let byte = *instructions.get(idx).ok_or(ErrorKind::BadDeltaInstruction)?;
                        size |= (byte as usize) << (8 * shift);
                        idx += 1;
                    }
                }
                if size == 0 {
                    size = 0x10000;
                }

                let end = offset.checked_add(size).ok_or(ErrorKind::BadDeltaBase)?;
                if end > base.len() {
                    return Err(ErrorKind::BadDeltaBase.into())
                }
                output.extend_from_slice(&base[offset..end]);
            } else if cmd > 0 {
                let end = idx + cmd as usize;
                if end > instructions.len() {
                    return Err(ErrorKind::BadDeltaInstruction.into())
                }
                output.extend_from_slice(&instructions[idx..end]);
                idx = end;
            } else {
                return Err(ErrorKind::BadDeltaInstruction.into())
            }

            if output.len() as u64 > output_size {
                return Err(ErrorKind::TruncatedDeltaOutput.into())
            }
        }

        if output.len() as u64 != output_size {
            return Err(ErrorKind::TruncatedDeltaOutput.into())
        }

        Ok(DeltaDecoder {
            output
        })
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::DeltaDecoder;

    #[test]
    fn applies_copy_and_insert() {
        // base 11 bytes, result 12 bytes: copy "hello " then insert "there!"
        let instructions = [11u8, 12, 0x90, 6, 6, b't', b'h', b'e', b'r', b'e', b'!'];
        let decoder = DeltaDecoder::new(&instructions, &b"hello world"[..]).expect("valid delta");
        assert_eq!(decoder.into_vec(), b"hello there!".to_vec());
    }

    #[test]
    fn copy_uses_offset_bytes() {
        // copy 5 bytes from offset 6
        let instructions = [11u8, 5, 0x91, 6, 5];
        let decoder = DeltaDecoder::new(&instructions, &b"hello world"[..]).expect("valid delta");
        assert_eq!(decoder.into_vec(), b"world".to_vec());
    }

    #[test]
    fn zero_size_copy_means_64k() {
        let base = vec![7u8; 0x10000];
        let instructions = [0x80u8, 0x80, 0x04, 0x80, 0x80, 0x04, 0x80];
        let decoder = DeltaDecoder::new(&instructions, &base).expect("valid delta");
        assert_eq!(decoder.into_vec(), base);
    }

    #[test]
    fn rejects_wrong_base_size() {
        let instructions = [4u8, 0];
        assert!(DeltaDecoder::new(&instructions, &b"abc"[..]).is_err());
    }

    #[test]
    fn rejects_copy_past_base() {
        let instructions = [3u8, 4, 0x90, 4];
        assert!(DeltaDecoder::new(&instructions, &b"abc"[..]).is_err());
    }

    #[test]
    fn rejects_reserved_instruction() {
        let instructions = [0u8, 1, 0];
        assert!(DeltaDecoder::new(&instructions, &[]).is_err());
    }

    #[test]
    fn rejects_short_output() {
        let instructions = [0u8, 4, 2, b'a', b'b'];
        assert!(DeltaDecoder::new(&instructions, &[]).is_err());
    }

    #[test]
    fn rejects_huge_claimed_output() {
        // base of 1 byte, result claimed to be 2^62 bytes, one literal
        let mut instructions = vec![1u8];
        instructions.extend_from_slice(&[0x80; 8]);
        instructions.extend_from_slice(&[0x40, 0x01, b'a']);
        assert!(DeltaDecoder::new(&instructions, b"x").is_err());
    }
}
