use flate2::{ Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status };

use crate::errors::{ Result, ResultExt, ErrorKind };

const INFLATE_CHUNK: usize = 64 * 1024;

/// zlib's `compressBound`: the most a zlib stream can grow `len` input bytes.
pub fn deflate_bound(len: usize) -> usize {
    len + (len >> 12) + (len >> 14) + (len >> 25) + 13
}

/// Compresses `payload` into a complete zlib stream in one shot.
pub fn compress(payload: &[u8], level: Compression) -> Result<Vec<u8>> {
    let mut stream = Compress::new(level, true);
    let mut output = Vec::with_capacity(deflate_bound(payload.len()));

    let status = stream.compress_vec(payload, &mut output, FlushCompress::Finish)
        .chain_err(|| "Failed compressing object")?;

    match status {
        Status::StreamEnd => Ok(output),
        _ => Err(ErrorKind::CompressionFailed.into())
    }
}

/// Inflates the zlib stream at the start of `input`, which must expand to
/// exactly `size` bytes. Returns the bytes and how much input was consumed.
pub fn decompress(input: &[u8], size: usize) -> Result<(Vec<u8>, usize)> {
    let mut stream = Decompress::new(true);
    // `size` comes from the pack, so it only caps the buffer. one spare byte
    // lets an overlong stream show up as a length mismatch.
    let limit = size.saturating_add(1);
    let mut output = Vec::with_capacity(limit.min(input.len().saturating_mul(8).max(INFLATE_CHUNK)));

    loop {
        let consumed = stream.total_in() as usize;
        let status = stream.decompress_vec(&input[consumed..], &mut output, FlushDecompress::Finish)
            .chain_err(|| ErrorKind::CorruptedPackfile)?;

        if status == Status::StreamEnd {
            break
        }

        if output.len() >= limit || output.len() < output.capacity() {
            return Err(ErrorKind::CorruptedPackfile.into())
        }

        let room = (limit - output.len()).min(output.len().max(INFLATE_CHUNK));
        output.reserve_exact(room);
    }

    if output.len() != size {
        return Err(ErrorKind::CorruptedPackfile.into())
    }

    Ok((output, stream.total_in() as usize))
}

#[cfg(test)]
mod tests {
    use flate2::Compression;
    use flate2::read::ZlibDecoder;
    use std::io::Read;
    use super::{ compress, decompress, deflate_bound };

    #[test]
    fn output_is_a_zlib_stream() {
        let compressed = compress(b"hello hello hello hello", Compression::default()).expect("compress");
        assert_eq!(compressed[0], 0x78);

        let mut output = Vec::new();
        ZlibDecoder::new(&compressed[..]).read_to_end(&mut output).expect("inflate");
        assert_eq!(output, b"hello hello hello hello".to_vec());
    }

    #[test]
    fn incompressible_input_fits_the_bound() {
        let payload: Vec<u8> = (0..100_000u32).map(|xs| (xs.wrapping_mul(2_654_435_761) >> 13) as u8).collect();
        for level in 0..10 {
            let compressed = compress(&payload, Compression::new(level)).expect("compress");
            assert!(compressed.len() <= deflate_bound(payload.len()));
            let (output, used) = decompress(&compressed, payload.len()).expect("inflate");
            assert_eq!(output, payload);
            assert_eq!(used, compressed.len());
        }
    }

    #[test]
    fn empty_payload() {
        let compressed = compress(b"", Compression::best()).expect("compress");
        let (output, used) = decompress(&compressed, 0).expect("inflate");
        assert!(output.is_empty());
        assert_eq!(used, compressed.len());
    }

    #[test]
    fn reports_consumed_input_with_trailing_bytes() {
        let mut compressed = compress(b"abcabcabc", Compression::fast()).expect("compress");
        let len = compressed.len();
        compressed.extend_from_slice(b"next record");
        let (output, used) = decompress(&compressed, 9).expect("inflate");
        assert_eq!(output, b"abcabcabc".to_vec());
        assert_eq!(used, len);
    }

    #[test]
    fn wrong_size_is_corruption() {
        let compressed = compress(b"abcdef", Compression::default()).expect("compress");
        assert!(decompress(&compressed, 5).is_err());
        assert!(decompress(&compressed, 7).is_err());
    }

    #[test]
    fn huge_claimed_size_is_corruption() {
        let compressed = compress(b"abcdef", Compression::default()).expect("compress");
        assert!(decompress(&compressed, usize::MAX).is_err());
        assert!(decompress(&compressed, 1 << 40).is_err());
        assert!(decompress(&compressed[..compressed.len() - 2], 1 << 40).is_err());
    }

    #[test]
    fn grows_past_the_initial_buffer() {
        let payload = vec![0u8; 4 * 1024 * 1024];
        let compressed = compress(&payload, Compression::best()).expect("compress");
        assert!(compressed.len() * 8 < payload.len());

        let (output, used) = decompress(&compressed, payload.len()).expect("inflate");
        assert_eq!(output, payload);
        assert_eq!(used, compressed.len());
    }
}
