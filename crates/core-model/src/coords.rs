//! Offset newtypes for the two coordinate spaces.
//!
//! `ModelOffset` indexes the persistent document; `ViewOffset` indexes the
//! rendered projection (after folding). Keeping them distinct types makes a
//! missing conversion a compile error instead of a silent off-by-fold bug.

use std::fmt;

macro_rules! offset_type {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub usize);

        impl $name {
            pub const fn get(self) -> usize {
                self.0
            }

            /// Move by a signed char delta, saturating at zero.
            pub fn shift(self, delta: isize) -> Self {
                Self(self.0.saturating_add_signed(delta))
            }

            /// Clamp into `[0, max]`.
            pub fn clamp_to(self, max: usize) -> Self {
                Self(self.0.min(max))
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self(v)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "{}"), self.0)
            }
        }
    };
}

offset_type!(
    /// Char offset into the persistent document.
    ModelOffset,
    "m"
);
offset_type!(
    /// Char offset into the rendered view projection.
    ViewOffset,
    "v"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_saturates_at_zero() {
        assert_eq!(ModelOffset(3).shift(-5), ModelOffset(0));
        assert_eq!(ModelOffset(3).shift(2), ModelOffset(5));
        assert_eq!(ViewOffset(0).shift(-1), ViewOffset(0));
    }

    #[test]
    fn clamp_and_display() {
        assert_eq!(ViewOffset(12).clamp_to(4), ViewOffset(4));
        assert_eq!(ModelOffset(2).clamp_to(4), ModelOffset(2));
        assert_eq!(ModelOffset(2).to_string(), "m2");
        assert_eq!(ViewOffset(9).to_string(), "v9");
    }
}
