use serde::Serialize;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

/// Kleene three-valued logic.
///
/// `False` dominates `and` and `True` dominates `or`, even against `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreeValuedLogic {
    True,
    False,
    Unknown,
}

impl ThreeValuedLogic {
    pub const fn from_bool(b: bool) -> Self {
        if b {
            Self::True
        } else {
            Self::False
        }
    }

    pub const fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::True, Self::True) => Self::True,
            _ => Self::Unknown,
        }
    }

    pub const fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::True, _) | (_, Self::True) => Self::True,
            (Self::False, Self::False) => Self::False,
            _ => Self::Unknown,
        }
    }

    pub const fn negate(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Unknown => Self::Unknown,
        }
    }

    pub const fn is_true(self) -> bool {
        matches!(self, Self::True)
    }

    pub const fn is_false(self) -> bool {
        matches!(self, Self::False)
    }

    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl From<bool> for ThreeValuedLogic {
    fn from(b: bool) -> Self {
        ThreeValuedLogic::from_bool(b)
    }
}

impl Not for ThreeValuedLogic {
    type Output = ThreeValuedLogic;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

impl BitAnd for ThreeValuedLogic {
    type Output = ThreeValuedLogic;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl BitOr for ThreeValuedLogic {
    type Output = ThreeValuedLogic;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl fmt::Display for ThreeValuedLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ThreeValuedLogic::True => "true",
            ThreeValuedLogic::False => "false",
            ThreeValuedLogic::Unknown => "unknown",
        })
    }
}
