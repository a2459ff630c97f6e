/*
    Unpadded firmware payload
*/

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload {
    // Payload bytes loaded off from a storage device
    bytes: Vec<u8>,
}

impl Payload {
    pub fn load(path: &Path) -> Result<Payload> {
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        debug!("Loaded {} byte payload from {}", bytes.len(), path.display());

        Ok(Payload { bytes })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[cfg(test)]
    pub fn test_only(len: usize) -> Payload {
        // Non-zero pattern so padding and payload are distinguishable.
        let bytes = (0..len).map(|i| (i % 251) as u8 + 1).collect();
        Payload { bytes }
    }
}
