use serde::{Deserialize, Serialize};
use std::fmt;

/// A position on the identifier ring.
///
/// `Id` is a bare `u64` under the hood; the bit width that actually matters
/// (`Config::id_bits`) is enforced by whoever constructs one — `IdSpace::hash`
/// masks its output, and routing-state code never manufactures an `Id` out of
/// thin air. Arithmetic on top of the raw value lives in [`crate::idspace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(pub u64);

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
