//! # imgsniff
//!
//! Image format detection and decode dispatch over a registry of pluggable
//! decoders.
//!
//! Formats are identified by magic-byte patterns in which `?` matches any
//! byte. Patterns are tried in registration order against a peekable view of
//! the input, so detection never consumes bytes the chosen decoder needs.
//!
//! Built-in decoders are feature-gated. Enable only what you need:
//!
//! ```toml
//! [dependencies]
//! imgsniff = { version = "0.1", default-features = false, features = ["png", "jpeg"] }
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use imgsniff::{DecodeRequest, FormatRegistry, Limits};
//!
//! // Detect and decode with the global registry.
//! let file = std::fs::File::open("photo.jpg")?;
//! let decoded = imgsniff::decode(file)?;
//! println!("{} {}x{}", decoded.format, decoded.width(), decoded.height());
//!
//! // A private registry where a custom format is sniffed before the built-ins.
//! let registry = FormatRegistry::new();
//! registry.register_fn(
//!     "raw",
//!     b"RAW?",
//!     |_| Err("not implemented".into()),
//!     |_| Err("not implemented".into()),
//! );
//! imgsniff::codecs::register_builtin_formats(&registry);
//!
//! let limits = Limits::default().with_max_pixels(100_000_000);
//! let header = DecodeRequest::new(std::fs::File::open("photo.jpg")?)
//!     .with_registry(&registry)
//!     .with_limits(&limits)
//!     .decode_config()?;
//! println!("{:?}", header.config);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

pub mod codecs;
mod decode;
mod error;
mod format;
mod info;
mod limits;
mod magic;
mod peek;
pub mod pixel;
mod registry;
mod sniff;

#[cfg(test)]
mod test_support;

pub use decode::{
    ConfigOutput, DecodeOutput, DecodeRequest, decode, decode_config, decode_peekable,
};
pub use error::{BoxError, DecodeError, PeekError};
pub use format::ImageFormat;
pub use info::{ColorModel, ImageConfig};
pub use limits::Limits;
pub use magic::{MagicByte, MagicPattern, matches};
pub use peek::{Peek, PeekReader};
pub use pixel::{PixelData, normalize};
pub use registry::{
    FnDecoder, FormatDecoder, FormatDescriptor, FormatRegistry, global, register_format,
};
pub use sniff::{sniff, sniff_bytes};
