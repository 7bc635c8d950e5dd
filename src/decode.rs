//! Image decoding: sniff the format, run its decoder, normalize the pixels.

use std::io::{self, Cursor, Read};
use std::sync::Arc;

use crate::info::ImageConfig;
use crate::peek::{Peek, PeekReader};
use crate::pixel::{ImgVec, PixelData, RGBA8};
use crate::registry::{FormatDescriptor, FormatRegistry, global};
use crate::{DecodeError, Limits};

/// Decoded image output.
#[derive(Clone, Debug)]
pub struct DecodeOutput {
    /// Pixels normalized to non-premultiplied 8-bit RGBA.
    pub pixels: ImgVec<RGBA8>,
    /// Name of the format that decoded the stream.
    pub format: String,
}

impl DecodeOutput {
    /// Image width in pixels (convenience accessor).
    pub fn width(&self) -> u32 {
        self.pixels.width() as u32
    }

    /// Image height in pixels (convenience accessor).
    pub fn height(&self) -> u32 {
        self.pixels.height() as u32
    }

    /// Interleaved RGBA bytes, row by row.
    pub fn into_rgba_bytes(self) -> Vec<u8> {
        let (buf, _, _) = self.pixels.into_contiguous_buf();
        bytemuck::cast_slice::<RGBA8, u8>(&buf).to_vec()
    }
}

/// Header-only decode output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigOutput {
    pub config: ImageConfig,
    /// Name of the format that parsed the header.
    pub format: String,
}

/// Image decode request builder.
///
/// # Example
///
/// ```no_run
/// use imgsniff::{DecodeRequest, Limits};
///
/// let file = std::fs::File::open("photo.jpg")?;
/// let limits = Limits::none().with_max_pixels(64_000_000);
/// let output = DecodeRequest::new(file).with_limits(&limits).decode()?;
/// println!("{} {}x{}", output.format, output.width(), output.height());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct DecodeRequest<'a, R> {
    reader: R,
    registry: Option<&'a FormatRegistry>,
    format: Option<&'a str>,
    limits: Option<&'a Limits>,
}

impl<'a, R: Read> DecodeRequest<'a, R> {
    /// Create a new decode request.
    ///
    /// The format is sniffed from the stream using the process-wide registry.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            registry: None,
            format: None,
            limits: None,
        }
    }

    /// Use `registry` instead of the process-wide one.
    pub fn with_registry(mut self, registry: &'a FormatRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Skip sniffing and decode with the first format registered as `name`.
    pub fn with_format(mut self, name: &'a str) -> Self {
        self.format = Some(name);
        self
    }

    /// Set resource limits.
    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Decode the image and normalize it to RGBA8.
    pub fn decode(self) -> Result<DecodeOutput, DecodeError> {
        let mut source = PeekReader::new(self.reader);
        dispatch_decode(self.registry, self.format, self.limits, &mut source)
    }

    /// Decode only the image dimensions and color model.
    pub fn decode_config(self) -> Result<ConfigOutput, DecodeError> {
        let mut source = PeekReader::new(self.reader);
        dispatch_decode_config(self.registry, self.format, self.limits, &mut source)
    }
}

impl<R: Peek> DecodeRequest<'_, R> {
    /// Like [`decode`](Self::decode), for a reader that can already peek.
    ///
    /// No extra buffer is put in front of the reader.
    pub fn decode_peekable(mut self) -> Result<DecodeOutput, DecodeError> {
        dispatch_decode(self.registry, self.format, self.limits, &mut self.reader)
    }

    /// Like [`decode_config`](Self::decode_config), for a reader that can already peek.
    pub fn decode_config_peekable(mut self) -> Result<ConfigOutput, DecodeError> {
        dispatch_decode_config(self.registry, self.format, self.limits, &mut self.reader)
    }
}

/// Decode an image in any registered format.
///
/// The returned output carries the name the format was registered under.
pub fn decode<R: Read>(reader: R) -> Result<DecodeOutput, DecodeError> {
    DecodeRequest::new(reader).decode()
}

/// Decode dimensions and color model of an image in any registered format.
pub fn decode_config<R: Read>(reader: R) -> Result<ConfigOutput, DecodeError> {
    DecodeRequest::new(reader).decode_config()
}

/// Decode from a reader that already supports peeking, such as a
/// [`PeekReader`] or an in-memory [`Cursor`](std::io::Cursor).
pub fn decode_peekable<P: Peek>(source: &mut P) -> Result<DecodeOutput, DecodeError> {
    DecodeRequest::new(source).decode_peekable()
}

/// Pick the format: by name when one was forced, otherwise by sniffing.
fn select_format<P: Peek>(
    registry: &FormatRegistry,
    forced: Option<&str>,
    source: &mut P,
) -> Result<Arc<FormatDescriptor>, DecodeError> {
    if let Some(name) = forced {
        return registry
            .find(name)
            .ok_or_else(|| DecodeError::UnknownFormat(name.to_owned()));
    }

    crate::sniff::sniff(registry, source)?.ok_or(DecodeError::UnrecognizedFormat)
}

fn dispatch_decode<P: Peek>(
    registry: Option<&FormatRegistry>,
    forced: Option<&str>,
    limits: Option<&Limits>,
    source: &mut P,
) -> Result<DecodeOutput, DecodeError> {
    let registry = registry.unwrap_or_else(|| global());
    let format = select_format(registry, forced, source)?;

    let pixels = match limits {
        Some(limits) => {
            // Reject oversized images from the header, before the decoder
            // allocates their pixels. The header bytes are replayed so the
            // decoder still sees the stream from its first byte.
            let mut recorder = Recorder::new(&mut *source);
            let config = format
                .decoder()
                .decode_config(&mut recorder)
                .map_err(|e| DecodeError::from_codec(format.name(), e))?;
            check_limits(limits, &format, &config)?;
            log::trace!(
                "{}: header {}x{} within limits, replaying {} bytes",
                format.name(),
                config.width,
                config.height,
                recorder.seen.len()
            );

            let mut replay = Cursor::new(recorder.into_seen()).chain(&mut *source);
            decode_pixels(&format, &mut replay)?
        }
        None => decode_pixels(&format, source)?,
    };

    log::debug!(
        "decoded {} image {}x{} ({} bit)",
        format.name(),
        pixels.width(),
        pixels.height(),
        pixels.bit_depth()
    );

    // The header may understate what the decoder produced.
    if let Some(limits) = limits {
        let (width, height) = (u64::from(pixels.width()), u64::from(pixels.height()));
        limits
            .check_dimensions(width, height)
            .and_then(|()| limits.check_memory(width.saturating_mul(height).saturating_mul(4)))
            .map_err(|detail| DecodeError::LimitExceeded {
                format: format.name().to_owned(),
                detail,
            })?;
    }

    Ok(DecodeOutput {
        pixels: crate::pixel::normalize(pixels),
        format: format.name().to_owned(),
    })
}

/// Run the matched decoder. Once matched, the format is final: a decoder
/// failure is not retried with other candidates.
fn decode_pixels(
    format: &FormatDescriptor,
    reader: &mut dyn Read,
) -> Result<PixelData, DecodeError> {
    format
        .decoder()
        .decode(reader)
        .map_err(|e| DecodeError::from_codec(format.name(), e))
}

fn check_limits(
    limits: &Limits,
    format: &FormatDescriptor,
    config: &ImageConfig,
) -> Result<(), DecodeError> {
    limits
        .check(config)
        .map_err(|detail| DecodeError::LimitExceeded {
            format: format.name().to_owned(),
            detail,
        })
}

/// Keeps a copy of every byte read through it.
struct Recorder<'r, R: ?Sized> {
    inner: &'r mut R,
    seen: Vec<u8>,
}

impl<'r, R: Read + ?Sized> Recorder<'r, R> {
    fn new(inner: &'r mut R) -> Self {
        Self {
            inner,
            seen: Vec::new(),
        }
    }

    fn into_seen(self) -> Vec<u8> {
        self.seen
    }
}

impl<R: Read + ?Sized> Read for Recorder<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.seen.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}

fn dispatch_decode_config<P: Peek>(
    registry: Option<&FormatRegistry>,
    forced: Option<&str>,
    limits: Option<&Limits>,
    source: &mut P,
) -> Result<ConfigOutput, DecodeError> {
    let registry = registry.unwrap_or_else(|| global());
    let format = select_format(registry, forced, source)?;

    let config = format
        .decoder()
        .decode_config(source)
        .map_err(|e| DecodeError::from_codec(format.name(), e))?;

    if let Some(limits) = limits {
        check_limits(limits, &format, &config)?;
    }

    Ok(ConfigOutput {
        config,
        format: format.name().to_owned(),
    })
}
