/*
 * X86-32 firmware window
 *                                        start      end
 * Extended System BIOS                   0x000E0000 0x000EFFFF
 * Motherboard BIOS                       0x000F0000 0x000FFFFF
 *
 * A firmware image is mapped so that its last byte lands on 0xFFFFF.
 */

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

pub mod map {
    // Start and length. Length is never zero.
    #[derive(PartialEq, Eq, Debug, Clone, Copy)]
    pub struct Range(u32, u32);

    impl Range {
        pub fn contains(self, addr: u32) -> Option<u32> {
            let Range(start, length) = self;
            addr.checked_sub(start).filter(|&offset| offset < length)
        }

        pub fn size(self) -> u32 {
            self.1
        }

        // Inclusive
        pub fn end(self) -> u32 {
            self.0 + (self.1 - 1)
        }
    }

    pub const FIRMWARE: Range = Range(0x000E_0000, 128 * 1024);
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct FirmwareInfo {
    pub size: u64,
    pub load_address: u32,
}

/// Physical address an image of `size` bytes is loaded at.
pub fn load_address(size: u64) -> Result<u32> {
    let capacity = map::FIRMWARE.size() as u64;

    if size == 0 {
        return Err(Error::EmptyImage);
    }
    if size > capacity {
        return Err(Error::FirmwareTooLarge { size, capacity });
    }

    Ok(map::FIRMWARE.end() - size as u32 + 1)
}

pub fn inspect(path: &Path) -> Result<FirmwareInfo> {
    let metadata = path.metadata().map_err(|e| Error::io(path, e))?;
    if !metadata.is_file() {
        return Err(Error::NotAFile { path: path.to_path_buf() });
    }

    let size = metadata.len();
    let load_address = load_address(size)?;
    debug!(
        "{} ({} bytes) maps at 0x{:08X}..=0x{:08X}",
        path.display(),
        size,
        load_address,
        map::FIRMWARE.end()
    );

    Ok(FirmwareInfo { size, load_address })
}

/// Reads an image back from disk, checking it fits the window first.
pub fn read(path: &Path) -> Result<(FirmwareInfo, Vec<u8>)> {
    let info = inspect(path)?;
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;

    Ok((info, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{Padder, TARGET_SIZE};

    #[test]
    fn window_matches_default_target() {
        assert_eq!(map::FIRMWARE.size() as usize, TARGET_SIZE);
        assert_eq!(map::FIRMWARE.end(), 0x000F_FFFF);
    }

    #[test]
    fn range_contains() {
        assert_eq!(map::FIRMWARE.contains(0x000E_0000), Some(0));
        assert_eq!(map::FIRMWARE.contains(0x000F_FFFF), Some(0x1_FFFF));
        assert_eq!(map::FIRMWARE.contains(0x000D_FFFF), None);
        assert_eq!(map::FIRMWARE.contains(0x0010_0000), None);
        assert_eq!(map::FIRMWARE.contains(0), None);
        assert_eq!(map::FIRMWARE.contains(u32::MAX), None);
    }

    #[test]
    fn load_addresses() {
        assert_eq!(load_address(0x2_0000).unwrap(), 0x000E_0000);
        assert_eq!(load_address(0x1_0000).unwrap(), 0x000F_0000);
        assert_eq!(load_address(1).unwrap(), 0x000F_FFFF);
    }

    #[test]
    fn load_address_rejects_bad_sizes() {
        assert!(matches!(load_address(0), Err(Error::EmptyImage)));
        assert!(matches!(
            load_address(0x2_0001),
            Err(Error::FirmwareTooLarge { size: 0x2_0001, capacity: 0x2_0000 })
        ));
    }

    #[test]
    fn padded_image_fits_window() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("payload.bin");
        let output = dir.path().join("bios.bin");
        fs::write(&input, [0xEA, 0x5B, 0xE0, 0x00, 0xF0]).unwrap();

        Padder::default().pad_file(&input, &output).unwrap();

        let (info, bytes) = read(&output).unwrap();
        assert_eq!(info, FirmwareInfo { size: TARGET_SIZE as u64, load_address: 0x000E_0000 });
        // Reset vector code sits at the very top of the window
        assert_eq!(&bytes[bytes.len() - 5..], &[0xEA, 0x5B, 0xE0, 0x00, 0xF0]);
    }

    #[test]
    fn inspect_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(inspect(dir.path()), Err(Error::NotAFile { .. })));
    }

    #[test]
    fn inspect_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            inspect(&dir.path().join("bios.bin")),
            Err(Error::Io { .. })
        ));
    }
}
