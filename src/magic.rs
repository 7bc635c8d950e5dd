//! Fixed-length magic byte patterns with single-byte wildcards.

use core::fmt;

/// One position of a [`MagicPattern`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MagicByte {
    /// The candidate byte must equal this value.
    Exact(u8),
    /// Any byte is accepted at this position.
    Any,
}

impl MagicByte {
    /// Whether `byte` is accepted at this position.
    #[inline]
    pub fn accepts(self, byte: u8) -> bool {
        match self {
            MagicByte::Exact(b) => b == byte,
            MagicByte::Any => true,
        }
    }
}

/// A fixed-length detection pattern.
///
/// The pattern length is the number of bytes that must be available at the
/// start of a stream before the pattern can be tested.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MagicPattern(Vec<MagicByte>);

impl MagicPattern {
    /// Build a pattern from typed tokens.
    pub fn new(tokens: Vec<MagicByte>) -> Self {
        MagicPattern(tokens)
    }

    /// Parse the literal registration syntax: `?` is a wildcard, every
    /// other byte must match exactly.
    ///
    /// ```
    /// use imgsniff::{MagicByte, MagicPattern};
    ///
    /// let gif = MagicPattern::parse(b"GIF8?a");
    /// assert_eq!(gif.len(), 6);
    /// assert_eq!(gif.tokens()[4], MagicByte::Any);
    /// ```
    pub fn parse(literal: &[u8]) -> Self {
        literal
            .iter()
            .map(|&b| {
                if b == b'?' {
                    MagicByte::Any
                } else {
                    MagicByte::Exact(b)
                }
            })
            .collect()
    }

    /// A pattern without wildcards. A literal `?` is matched as itself.
    pub fn exact(bytes: &[u8]) -> Self {
        bytes.iter().map(|&b| MagicByte::Exact(b)).collect()
    }

    /// Number of bytes this pattern needs to inspect.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tokens(&self) -> &[MagicByte] {
        &self.0
    }

    /// Whether `candidate` satisfies this pattern. See [`matches`].
    #[inline]
    pub fn matches(&self, candidate: &[u8]) -> bool {
        matches(&self.0, candidate)
    }
}

impl FromIterator<MagicByte> for MagicPattern {
    fn from_iter<I: IntoIterator<Item = MagicByte>>(iter: I) -> Self {
        MagicPattern(iter.into_iter().collect())
    }
}

impl From<&[u8]> for MagicPattern {
    fn from(literal: &[u8]) -> Self {
        MagicPattern::parse(literal)
    }
}

impl<const N: usize> From<&[u8; N]> for MagicPattern {
    fn from(literal: &[u8; N]) -> Self {
        MagicPattern::parse(literal)
    }
}

impl fmt::Debug for MagicPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MagicPattern(\"")?;
        for token in &self.0 {
            match *token {
                MagicByte::Any => f.write_str("??")?,
                MagicByte::Exact(b) => write!(f, "{b:02x}")?,
            }
        }
        f.write_str("\")")
    }
}

/// Compare a candidate slice against a pattern.
///
/// A length mismatch is simply "no match". Wildcard positions accept any
/// byte, every other position must be equal.
pub fn matches(pattern: &[MagicByte], candidate: &[u8]) -> bool {
    pattern.len() == candidate.len()
        && pattern
            .iter()
            .zip(candidate)
            .all(|(token, &byte)| token.accepts(byte))
}
