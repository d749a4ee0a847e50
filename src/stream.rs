use byteorder::{ ByteOrder, NativeEndian };
use std::io::{ self, Read };

use crate::errors::{ Result, ResultExt };
use crate::objects::Blob;

// input format is:
//
//      4 byte length (host byte order)
//      length bytes of blob contents
//      ... repeated until eof. a short read anywhere ends the stream.

pub struct BlobStream<R> {
    input: R,
    done: bool
}

impl<R: Read> BlobStream<R> {
    pub fn new(input: R) -> Self {
        BlobStream {
            input,
            done: false
        }
    }

    fn read_blob(&mut self) -> Result<Option<Blob>> {
        let mut length = [0u8; 4];
        if read_full(&mut self.input, &mut length).chain_err(|| "Failed reading blob length")? != 4 {
            return Ok(None)
        }

        let length = NativeEndian::read_u32(&length) as usize;
        let mut contents = vec![0u8; length];
        if read_full(&mut self.input, &mut contents).chain_err(|| "Failed reading blob contents")? != length {
            return Ok(None)
        }

        Ok(Some(Blob::new(contents)))
    }
}

impl<R: Read> Iterator for BlobStream<R> {
    type Item = Result<Blob>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None
        }

        match self.read_blob() {
            Ok(Some(blob)) => Some(Ok(blob)),
            Ok(None) => {
                self.done = true;
                None
            },
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

// Like read_exact, but reports how much was read instead of failing on eof.
fn read_full<R: Read>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e)
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use byteorder::{ NativeEndian, WriteBytesExt };
    use std::io::{ self, Read };
    use super::BlobStream;

    fn record(contents: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.write_u32::<NativeEndian>(contents.len() as u32).expect("write to vec");
        out.extend_from_slice(contents);
        out
    }

    #[test]
    fn reads_records_until_eof() {
        let mut input = record(b"hello");
        input.extend(record(b""));
        input.extend(record(&[0u8, 1, 2, 255]));

        let blobs: Vec<_> = BlobStream::new(&input[..])
            .map(|xs| xs.expect("read blob").into_contents())
            .collect();

        assert_eq!(blobs, vec![b"hello".to_vec(), vec![], vec![0u8, 1, 2, 255]]);
    }

    #[test]
    fn empty_input_is_empty_stream() {
        assert_eq!(BlobStream::new(&b""[..]).count(), 0);
    }

    #[test]
    fn truncated_length_ends_stream() {
        let mut input = record(b"abc");
        input.extend_from_slice(&[1, 0]);
        let blobs: Vec<_> = BlobStream::new(&input[..]).collect();
        assert_eq!(blobs.len(), 1);
    }

    #[test]
    fn truncated_contents_end_stream() {
        let mut input = record(b"abc");
        let mut short = record(b"abcdef");
        short.truncate(7);
        input.extend(short);

        let blobs: Vec<_> = BlobStream::new(&input[..])
            .map(|xs| xs.expect("read blob").into_contents())
            .collect();
        assert_eq!(blobs, vec![b"abc".to_vec()]);
    }

    // hands back one byte per read call
    struct Trickle<'a>(&'a [u8]);

    impl<'a> Read for Trickle<'a> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0)
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    #[test]
    fn tolerates_partial_reads() {
        let input = record(b"trickled in");
        let blobs: Vec<_> = BlobStream::new(Trickle(&input))
            .map(|xs| xs.expect("read blob").into_contents())
            .collect();
        assert_eq!(blobs, vec![b"trickled in".to_vec()]);
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "boom"))
        }
    }

    #[test]
    fn io_errors_are_reported_once() {
        let mut stream = BlobStream::new(Broken);
        assert!(stream.next().expect("an item").is_err());
        assert!(stream.next().is_none());
    }
}
