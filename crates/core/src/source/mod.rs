use std::path::{Path, PathBuf};

use crate::Result;

/// Provider of the bytes being visualised.
///
/// The slice returned by [`DataSource::data`] is only read while the surface
/// refreshes; it may change freely between refreshes.
pub trait DataSource {
    fn data(&self) -> &[u8];

    fn data_size(&self) -> usize {
        self.data().len()
    }
}

impl DataSource for Vec<u8> {
    fn data(&self) -> &[u8] {
        self
    }
}

impl DataSource for &[u8] {
    fn data(&self) -> &[u8] {
        self
    }
}

/// Owned blob, optionally remembering the file it was read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBlob {
    bytes: Vec<u8>,
    origin: Option<PathBuf>,
}

impl ByteBlob {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            origin: None,
        }
    }

    /// Reads the whole file into memory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "loaded data blob");
        Ok(Self {
            bytes,
            origin: Some(path.to_path_buf()),
        })
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Swaps in new contents; the surface picks them up on its next refresh.
    pub fn replace(&mut self, bytes: impl Into<Vec<u8>>) {
        self.bytes = bytes.into();
    }
}

impl DataSource for ByteBlob {
    fn data(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_blob_from_disk() {
        let path = std::env::temp_dir().join(format!("trigram-viz-blob-{}.bin", std::process::id()));
        std::fs::write(&path, [1u8, 2, 3, 4]).unwrap();

        let blob = ByteBlob::from_path(&path).unwrap();
        assert_eq!(blob.data(), &[1, 2, 3, 4]);
        assert_eq!(blob.data_size(), 4);
        assert_eq!(blob.origin(), Some(path.as_path()));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ByteBlob::from_path("/definitely/not/here.bin").unwrap_err();
        assert!(matches!(err, crate::TrigramVizError::Io(_)));
    }

    #[test]
    fn replace_swaps_contents() {
        let mut blob = ByteBlob::new(vec![9u8; 3]);
        blob.replace([1u8, 2]);
        assert_eq!(blob.data(), &[1, 2]);
    }
}
