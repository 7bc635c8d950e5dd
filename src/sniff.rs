//! Format detection over a peekable stream.

use std::io;
use std::sync::Arc;

use crate::error::PeekError;
use crate::peek::Peek;
use crate::registry::{FormatDescriptor, FormatRegistry};

/// Find the first registered format whose magic matches the start of `source`.
///
/// Formats are tried in registration order, each against exactly as many
/// bytes as its pattern is long. A stream too short for a pattern is just
/// a non-match for that format. Nothing is consumed from `source`.
///
/// Returns `Ok(None)` when no format matches. Only a failing reader is an
/// error.
pub fn sniff<P: Peek + ?Sized>(
    registry: &FormatRegistry,
    source: &mut P,
) -> io::Result<Option<Arc<FormatDescriptor>>> {
    for format in registry.snapshot() {
        let wanted = format.magic().len();
        match source.peek(wanted) {
            Ok(prefix) if format.magic().matches(prefix) => {
                log::debug!("sniffed format {:?}", format.name());
                return Ok(Some(format));
            }
            Ok(_) => log::trace!("{:?}: magic mismatch", format.name()),
            Err(PeekError::InsufficientData { available, .. }) => log::trace!(
                "{:?}: needs {wanted} bytes, stream has {available}",
                format.name()
            ),
            Err(PeekError::Io(e)) => return Err(e),
        }
    }

    log::debug!("no registered format matched");
    Ok(None)
}

/// Find the first registered format matching the start of an in-memory buffer.
pub fn sniff_bytes(registry: &FormatRegistry, data: &[u8]) -> Option<Arc<FormatDescriptor>> {
    registry.snapshot().into_iter().find(|format| {
        data.get(..format.magic().len())
            .is_some_and(|prefix| format.magic().matches(prefix))
    })
}
