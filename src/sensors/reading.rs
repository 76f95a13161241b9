//! Scalar sensor readings with an explicit failure state.
//!
//! The physical units report a failed sensor with a negative sentinel
//! (`-1`).  The sentinel is converted at the mailbox boundary and never
//! reaches level arithmetic.

/// A level or steam reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// Physically plausible, non-negative value.
    Valid(f64),
    /// The sensor reported failure (negative or non-finite value).
    Failed,
}

impl Reading {
    /// Convert a raw wire value.
    pub fn from_raw(raw: f64) -> Self {
        if raw.is_finite() && raw >= 0.0 {
            Self::Valid(raw)
        } else {
            Self::Failed
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Self::Valid(v) => Some(v),
            Self::Failed => None,
        }
    }

    pub fn is_failed(self) -> bool {
        matches!(self, Self::Failed)
    }

    /// True if the reading is valid and strictly above `bound`.
    pub fn exceeds(self, bound: f64) -> bool {
        matches!(self, Self::Valid(v) if v > bound)
    }

    /// True if the reading is failed or strictly above `bound`.
    pub fn failed_or_exceeds(self, bound: f64) -> bool {
        self.is_failed() || self.exceeds(bound)
    }

    /// True if the reading is valid and equal to `target`.
    pub fn is(self, target: f64) -> bool {
        matches!(self, Self::Valid(v) if v == target)
    }

    /// The value if it lies within `[0, max]`, otherwise `None`.
    pub fn within(self, max: f64) -> Option<f64> {
        match self {
            Self::Valid(v) if v <= max => Some(v),
            _ => None,
        }
    }
}
