//! Authorization levels: capability bitmasks carried inside a credential.
//!
//! Levels only ever gain bits when composed. A credential is authorized for a
//! requirement when every bit of that requirement is present in its level.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::credential::Credential;

/// A 32-bit capability bitmask.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(pub u32);

impl Level {
    /// No capabilities.
    pub const NONE: Self = Self(0);

    /// Create from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Get the raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Bitwise OR of all supplied levels.
    pub fn compose<I>(levels: I) -> Self
    where
        I: IntoIterator<Item = Level>,
    {
        levels.into_iter().fold(Self::NONE, |acc, l| acc | l)
    }

    /// True if every bit of `required` is set in `self`.
    pub const fn contains(self, required: Level) -> bool {
        self.0 & required.0 == required.0
    }

    /// True if every required level is contained. Vacuously true when empty.
    pub fn satisfies(self, required: &[Level]) -> bool {
        required.iter().all(|r| self.contains(*r))
    }
}

impl BitOr for Level {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Level {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<u32> for Level {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level({:#b})", self.0)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}

/// Compose levels for issuing or upgrading a credential.
pub fn compose(levels: &[Level]) -> Level {
    Level::compose(levels.iter().copied())
}

/// Check a credential's level against a list of requirements.
pub fn is_authorized(credential: &Credential, required: &[Level]) -> bool {
    credential.level.satisfies(required)
}
