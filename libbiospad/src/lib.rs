/* BIOS image padding */
pub mod error;
pub mod firmware;
pub mod image;

pub use error::{Error, Result};
pub use image::{pad, OversizePolicy, PadConfig, PadReport, Padder, TARGET_SIZE};
pub use image::payload::Payload;
