/*
    BIOS image padder
*/

pub mod payload;


use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use payload::Payload;

// Image size is 128KiB, the whole x86 firmware area
pub const TARGET_SIZE: usize = 64 * 2 * 1024;

const ZERO_CHUNK: [u8; 4096] = [0; 4096];

/// What to do with a payload that is already larger than the target size.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum OversizePolicy {
    #[default]
    Reject,
    /// Write the payload out untouched, neither padded nor truncated.
    Passthrough,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct PadConfig {
    pub target_size: usize,
    pub oversize: OversizePolicy,
}

impl Default for PadConfig {
    fn default() -> Self {
        PadConfig {
            target_size: TARGET_SIZE,
            oversize: OversizePolicy::default(),
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct PadReport {
    pub payload_len: usize,
    pub pad_len: usize,
    pub image_len: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Padder {
    config: PadConfig,
}

impl Padder {
    pub fn new(config: PadConfig) -> Self {
        Padder { config }
    }

    pub fn pad_len(&self, payload_len: usize) -> Result<usize> {
        let target = self.config.target_size;

        if payload_len <= target {
            return Ok(target - payload_len);
        }

        match self.config.oversize {
            OversizePolicy::Reject => Err(Error::PayloadTooLarge { len: payload_len, target }),
            OversizePolicy::Passthrough => {
                warn!(
                    "Payload is {} bytes, {} over the {} byte target; writing it unpadded",
                    payload_len,
                    payload_len - target,
                    target
                );
                Ok(0)
            }
        }
    }

    fn report(&self, payload: &[u8]) -> Result<PadReport> {
        let pad_len = self.pad_len(payload.len())?;

        Ok(PadReport {
            payload_len: payload.len(),
            pad_len,
            image_len: pad_len + payload.len(),
        })
    }

    /// Builds the whole image in memory: `pad_len` zero bytes, then the payload.
    pub fn pad_bytes(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let report = self.report(payload)?;

        let mut image = vec![0; report.pad_len];
        image.reserve_exact(payload.len());
        image.extend_from_slice(payload);

        Ok(image)
    }

    pub fn write_image<W: Write>(&self, payload: &[u8], sink: &mut W) -> Result<PadReport> {
        let report = self.report(payload)?;
        emit(sink, payload, &report).map_err(Error::Write)?;

        Ok(report)
    }

    /// Pads the file at `input` into `output`, creating or truncating it.
    ///
    /// An oversized payload under [`OversizePolicy::Reject`] fails before
    /// `output` is opened, so an existing image is left alone.
    pub fn pad_file(&self, input: &Path, output: &Path) -> Result<PadReport> {
        let payload = Payload::load(input)?;
        let report = self.report(payload.bytes())?;

        let file = File::create(output).map_err(|e| Error::io(output, e))?;
        let mut writer = BufWriter::new(file);
        emit(&mut writer, payload.bytes(), &report)
            .and_then(|_| writer.flush())
            .map_err(|e| Error::io(output, e))?;

        info!(
            "Wrote {} byte image to {} ({} bytes of padding)",
            report.image_len,
            output.display(),
            report.pad_len
        );
        Ok(report)
    }
}

fn emit<W: Write>(sink: &mut W, payload: &[u8], report: &PadReport) -> io::Result<()> {
    let mut remaining = report.pad_len;
    while remaining > 0 {
        let n = remaining.min(ZERO_CHUNK.len());
        sink.write_all(&ZERO_CHUNK[..n])?;
        remaining -= n;
    }
    debug!("Emitted {} pad bytes", report.pad_len);

    sink.write_all(payload)
}

pub fn pad(input: &Path, output: &Path, config: &PadConfig) -> Result<PadReport> {
    Padder::new(*config).pad_file(input, output)
}
