use crypto::{ sha1::Sha1, digest::Digest };
use std::fmt;
use hex;

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id([u8; 20]);

impl fmt::Debug for Id {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{}", hex::encode(self.0))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{}", hex::encode(self.0))
    }
}

impl Id {
    pub fn from_bytes(inp: &[u8]) -> Option<Id> {
        if inp.len() != 20 {
            return None
        }

        let mut dst = [0u8; 20];
        dst.copy_from_slice(inp);
        Some(Id(dst))
    }

    pub fn digest(hash: &mut Sha1) -> Id {
        let mut output = [0u8; 20];
        hash.result(&mut output);
        Id(output)
    }

    pub fn bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl From<[u8; 20]> for Id {
    fn from(bytes: [u8; 20]) -> Self {
        Id(bytes)
    }
}

impl AsRef<[u8]> for Id {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Id;

    #[test]
    fn displays_as_hex() {
        let mut bytes = [0u8; 20];
        bytes[0] = 0x87;
        bytes[19] = 0xde;
        let id = Id::from(bytes);
        assert_eq!(id.to_string(), "87000000000000000000000000000000000000de");
        assert_eq!(format!("{:?}", id), id.to_string());
    }

    #[test]
    fn from_bytes_wants_twenty() {
        assert!(Id::from_bytes(&[0u8; 19]).is_none());
        assert!(Id::from_bytes(&[0u8; 21]).is_none());
        assert_eq!(Id::from_bytes(&[7u8; 20]), Some(Id::from([7u8; 20])));
    }
}
