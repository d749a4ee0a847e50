use crypto::{ sha1::Sha1, digest::Digest };

use crate::id::Id;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    contents: Vec<u8>
}

impl Blob {
    pub fn new(contents: Vec<u8>) -> Blob {
        Blob {
            contents
        }
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn into_contents(self) -> Vec<u8> {
        self.contents
    }

    /// The object id git would assign this blob: SHA-1 over `blob <len>\0`
    /// followed by the contents.
    pub fn id(&self) -> Id {
        Blob::id_of(&self.contents)
    }

    pub fn id_of(contents: &[u8]) -> Id {
        let mut hash = Sha1::new();
        let header = format!("blob {}\0", contents.len());
        hash.input(header.as_bytes());
        hash.input(contents);
        Id::digest(&mut hash)
    }
}

impl From<Vec<u8>> for Blob {
    fn from(contents: Vec<u8>) -> Self {
        Blob::new(contents)
    }
}
