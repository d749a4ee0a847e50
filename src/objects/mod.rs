pub mod blob;

pub use self::blob::Blob;
