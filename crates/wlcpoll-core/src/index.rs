// ── Index resolution ──
//
// A metric identifier is `<prefix><suffix>`; the suffix names the table
// row. Controllers lay rows out in two ways, each handled by one pure
// function below. Both produce bytes that are then hex-normalized into an
// EntityKey, so the same hardware address resolves to the same key
// whichever table it came from.

use crate::error::ReadingError;
use crate::model::EntityKey;

/// Length of an 802 hardware address.
pub const HARDWARE_ADDRESS_LEN: usize = 6;

/// Turns an identifier suffix into an entity key.
pub trait IndexResolver {
    fn resolve(&self, suffix: &str) -> Result<EntityKey, ReadingError>;
}

/// Row layout of a metric's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexEncoding {
    /// Suffix kept verbatim: each arc is copied as key material.
    BinarySuffix,
    /// Each arc is one decimal byte. `hardware_address` keeps only the
    /// first six bytes, discarding trailing instance arcs such as a radio
    /// slot number.
    DecimalDotted { hardware_address: bool },
}

impl IndexResolver for IndexEncoding {
    fn resolve(&self, suffix: &str) -> Result<EntityKey, ReadingError> {
        match *self {
            Self::BinarySuffix => binary_suffix(suffix),
            Self::DecimalDotted { hardware_address } => {
                let bytes =
                    decimal_dotted(suffix, hardware_address.then_some(HARDWARE_ADDRESS_LEN))?;
                Ok(EntityKey::from_bytes(&bytes))
            }
        }
    }
}

fn arcs(suffix: &str) -> Result<std::str::Split<'_, char>, ReadingError> {
    match suffix.strip_prefix('.') {
        Some(rest) if !rest.is_empty() => Ok(rest.split('.')),
        _ => Err(ReadingError::malformed(suffix, "missing row index")),
    }
}

/// Keep the suffix verbatim as key material. Distinct suffixes always
/// give distinct keys; see [`EntityKey::from_arcs`].
pub fn binary_suffix(suffix: &str) -> Result<EntityKey, ReadingError> {
    let values = arcs(suffix)?
        .map(|arc| {
            arc.parse::<u32>()
                .map_err(|_| ReadingError::malformed(suffix, format!("arc '{arc}' is not numeric")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(EntityKey::from_arcs(&values))
}

/// Parse one byte per arc, optionally truncating to `truncate_to` bytes.
pub fn decimal_dotted(suffix: &str, truncate_to: Option<usize>) -> Result<Vec<u8>, ReadingError> {
    let mut out = Vec::with_capacity(HARDWARE_ADDRESS_LEN + 1);
    for arc in arcs(suffix)? {
        let byte: u8 = arc.parse().map_err(|_| {
            ReadingError::malformed(suffix, format!("arc '{arc}' is not a byte value"))
        })?;
        out.push(byte);
    }

    if let Some(len) = truncate_to {
        if out.len() < len {
            return Err(ReadingError::malformed(
                suffix,
                format!("expected at least {len} arcs, got {}", out.len()),
            ));
        }
        out.truncate(len);
    }
    Ok(out)
}
