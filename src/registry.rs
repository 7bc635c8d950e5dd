//! Format registry: an ordered table of magic patterns bound to decoders.
//!
//! Formats are appended once during initialization and then only read. The
//! order of registration is part of the contract: when several patterns
//! match the same leading bytes, the format registered first wins.
//!
//! Most callers use the process-wide registry through [`global`] and
//! [`register_format`]. Code that needs its own format table (tests,
//! sandboxed decoders, a different precedence order) builds a
//! [`FormatRegistry`] and passes it to
//! [`DecodeRequest::with_registry`](crate::DecodeRequest::with_registry).

use core::fmt;
use std::io::Read;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::error::BoxError;
use crate::info::ImageConfig;
use crate::magic::MagicPattern;
use crate::pixel::PixelData;

/// A pluggable decoder for one encoding.
///
/// Both operations receive a plain reader positioned at the first byte of
/// the encoded data.
pub trait FormatDecoder: Send + Sync {
    /// Decode the full image.
    fn decode(&self, reader: &mut dyn Read) -> Result<PixelData, BoxError>;

    /// Decode only dimensions and color model.
    fn decode_config(&self, reader: &mut dyn Read) -> Result<ImageConfig, BoxError>;
}

impl<T: FormatDecoder + ?Sized> FormatDecoder for Arc<T> {
    fn decode(&self, reader: &mut dyn Read) -> Result<PixelData, BoxError> {
        (**self).decode(reader)
    }

    fn decode_config(&self, reader: &mut dyn Read) -> Result<ImageConfig, BoxError> {
        (**self).decode_config(reader)
    }
}

/// Adapts a pair of functions or closures to [`FormatDecoder`].
pub struct FnDecoder<D, C> {
    decode: D,
    decode_config: C,
}

impl<D, C> FnDecoder<D, C>
where
    D: Fn(&mut dyn Read) -> Result<PixelData, BoxError> + Send + Sync,
    C: Fn(&mut dyn Read) -> Result<ImageConfig, BoxError> + Send + Sync,
{
    pub fn new(decode: D, decode_config: C) -> Self {
        Self {
            decode,
            decode_config,
        }
    }
}

impl<D, C> FormatDecoder for FnDecoder<D, C>
where
    D: Fn(&mut dyn Read) -> Result<PixelData, BoxError> + Send + Sync,
    C: Fn(&mut dyn Read) -> Result<ImageConfig, BoxError> + Send + Sync,
{
    fn decode(&self, reader: &mut dyn Read) -> Result<PixelData, BoxError> {
        (self.decode)(reader)
    }

    fn decode_config(&self, reader: &mut dyn Read) -> Result<ImageConfig, BoxError> {
        (self.decode_config)(reader)
    }
}

/// A registered format. Immutable once registered.
pub struct FormatDescriptor {
    name: String,
    magic: MagicPattern,
    decoder: Arc<dyn FormatDecoder>,
}

impl FormatDescriptor {
    pub fn new(
        name: impl Into<String>,
        magic: impl Into<MagicPattern>,
        decoder: Arc<dyn FormatDecoder>,
    ) -> Self {
        Self {
            name: name.into(),
            magic: magic.into(),
            decoder,
        }
    }

    /// Name given at registration, e.g. `"png"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn magic(&self) -> &MagicPattern {
        &self.magic
    }

    pub fn decoder(&self) -> &dyn FormatDecoder {
        self.decoder.as_ref()
    }
}

impl fmt::Debug for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatDescriptor")
            .field("name", &self.name)
            .field("magic", &self.magic)
            .finish_non_exhaustive()
    }
}

/// Ordered, append-only table of formats.
///
/// Registration is expected to finish before concurrent decode calls start.
/// Registering later is still memory safe: each [`snapshot`](Self::snapshot)
/// sees a consistent prefix of the registrations, but a decode that has
/// already taken its snapshot will not see formats added afterwards.
#[derive(Default)]
pub struct FormatRegistry {
    formats: RwLock<Vec<Arc<FormatDescriptor>>>,
}

impl FormatRegistry {
    /// An empty registry. Nothing will be recognized until formats are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in format compiled into this crate.
    pub fn with_builtin_formats() -> Self {
        let registry = Self::new();
        crate::codecs::register_builtin_formats(&registry);
        registry
    }

    /// Append a format. Never fails.
    ///
    /// Duplicate names and overlapping patterns are allowed; later entries
    /// are simply tried after earlier ones.
    pub fn register(
        &self,
        name: impl Into<String>,
        magic: impl Into<MagicPattern>,
        decoder: impl FormatDecoder + 'static,
    ) {
        self.register_shared(name, magic, Arc::new(decoder));
    }

    /// Append a format whose decoder is shared with other entries, such as
    /// one decoder registered under several alternative headers.
    pub fn register_shared(
        &self,
        name: impl Into<String>,
        magic: impl Into<MagicPattern>,
        decoder: Arc<dyn FormatDecoder>,
    ) {
        let descriptor = Arc::new(FormatDescriptor::new(name, magic, decoder));
        log::debug!(
            "registering format {:?} with {}-byte magic",
            descriptor.name(),
            descriptor.magic().len()
        );
        self.formats
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(descriptor);
    }

    /// Append a format from a pair of decode functions.
    pub fn register_fn<D, C>(
        &self,
        name: impl Into<String>,
        magic: impl Into<MagicPattern>,
        decode: D,
        decode_config: C,
    ) where
        D: Fn(&mut dyn Read) -> Result<PixelData, BoxError> + Send + Sync + 'static,
        C: Fn(&mut dyn Read) -> Result<ImageConfig, BoxError> + Send + Sync + 'static,
    {
        self.register(name, magic, FnDecoder::new(decode, decode_config));
    }

    /// Current contents in registration order.
    pub fn snapshot(&self) -> Vec<Arc<FormatDescriptor>> {
        self.formats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// First format registered under `name`.
    pub fn find(&self, name: &str) -> Option<Arc<FormatDescriptor>> {
        self.formats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|f| f.name() == name)
            .cloned()
    }

    /// Registered names in order, including duplicates.
    pub fn names(&self) -> Vec<String> {
        self.formats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|f| f.name().to_owned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.formats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.names())
            .finish()
    }
}

static GLOBAL: LazyLock<FormatRegistry> = LazyLock::new(FormatRegistry::with_builtin_formats);

/// The process-wide registry, populated with the built-in formats on first use.
pub fn global() -> &'static FormatRegistry {
    &GLOBAL
}

/// Register a format in the process-wide registry.
///
/// Call this during initialization, before any thread starts decoding.
/// Built-in formats are registered first, so a custom format only takes
/// precedence for inputs none of them match.
///
/// To have a custom format tried before the built-ins, start from an empty
/// [`FormatRegistry::new`], register it, then append the built-ins with
/// [`codecs::register_builtin_formats`](crate::codecs::register_builtin_formats)
/// and pass the registry to
/// [`DecodeRequest::with_registry`](crate::DecodeRequest::with_registry):
///
/// ```
/// use imgsniff::{DecodeRequest, FormatRegistry};
///
/// let registry = FormatRegistry::new();
/// registry.register_fn(
///     "jfif-sniffer",
///     b"\xff\xd8",
///     |_| Err("not a real decoder".into()),
///     |_| Err("not a real decoder".into()),
/// );
/// imgsniff::codecs::register_builtin_formats(&registry);
///
/// let err = DecodeRequest::new(&b"\xff\xd8\xff\xe0"[..])
///     .with_registry(&registry)
///     .decode()
///     .unwrap_err();
/// assert_eq!(err.format(), Some("jfif-sniffer"));
/// ```
pub fn register_format(
    name: impl Into<String>,
    magic: impl Into<MagicPattern>,
    decoder: impl FormatDecoder + 'static,
) {
    global().register(name, magic, decoder);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Echo, Failing};

    #[test]
    fn keeps_registration_order_and_duplicates() {
        let registry = FormatRegistry::new();
        assert!(registry.is_empty());

        registry.register("tiff", b"II\x2a\x00", Echo);
        registry.register("tiff", b"MM\x00\x2a", Echo);
        registry.register("gif", b"GIF8?a", Failing);

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(), ["tiff", "tiff", "gif"]);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot[1].magic(), &MagicPattern::parse(b"MM\x00\x2a"));
    }

    #[test]
    fn find_returns_first_with_name() {
        let registry = FormatRegistry::new();
        registry.register("tiff", b"II\x2a\x00", Echo);
        registry.register("tiff", b"MM\x00\x2a", Echo);

        let found = registry.find("tiff").unwrap();
        assert_eq!(found.magic().len(), 4);
        assert!(found.magic().matches(b"II\x2a\x00"));
        assert!(registry.find("png").is_none());
    }

    #[test]
    fn snapshot_is_not_affected_by_later_registration() {
        let registry = FormatRegistry::new();
        registry.register("a", b"A", Echo);
        let before = registry.snapshot();
        registry.register("b", b"B", Echo);

        assert_eq!(before.len(), 1);
        assert_eq!(registry.snapshot().len(), 2);
    }

    #[test]
    fn register_fn_wraps_closures() {
        let registry = FormatRegistry::new();
        registry.register_fn(
            "closure",
            b"CL",
            |_r: &mut dyn Read| Err("nope".into()),
            |_r: &mut dyn Read| Ok(ImageConfig::new(1, 1, crate::ColorModel::Gray, 8)),
        );

        let f = registry.find("closure").unwrap();
        let mut empty: &[u8] = &[];
        assert!(f.decoder().decode(&mut empty).is_err());
        assert_eq!(f.decoder().decode_config(&mut empty).unwrap().width, 1);
    }

    #[test]
    fn shared_decoder_is_reused() {
        let shared: Arc<dyn FormatDecoder> = Arc::new(Echo);
        let registry = FormatRegistry::new();
        registry.register_shared("x", b"X", shared.clone());
        registry.register_shared("y", b"Y", shared.clone());
        assert_eq!(Arc::strong_count(&shared), 3);
    }

    #[test]
    fn concurrent_snapshots_agree() {
        let registry = FormatRegistry::new();
        for i in 0..16u8 {
            registry.register(format!("f{i}"), MagicPattern::exact(&[i]), Echo);
        }

        let expected = registry.names();
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..100 {
                        let names: Vec<String> = registry
                            .snapshot()
                            .iter()
                            .map(|f| f.name().to_owned())
                            .collect();
                        assert_eq!(names, expected);
                    }
                });
            }
        });
    }

    #[test]
    fn global_has_builtins_in_order() {
        let names = global().names();
        let builtin: Vec<&str> = crate::ImageFormat::ALL
            .iter()
            .filter(|f| f.is_compiled_in())
            .map(|f| f.name())
            .collect();

        // Other tests may append to the global registry; the prefix is fixed.
        let mut deduped: Vec<&str> = names.iter().map(String::as_str).collect();
        deduped.dedup();
        assert!(deduped.starts_with(&builtin));
    }
}
