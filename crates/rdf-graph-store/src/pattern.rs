//! Bind-pattern bitmasks shared by the matcher dispatcher (§4.G).
//!
//! A bind-pattern is a subset of {s, p, o, c}. It is encoded as a 4-bit mask:
//! bit 0 = s, bit 1 = p, bit 2 = o, bit 3 = c — 16 possible masks, matching
//! the 16-slot matcher array.

use crate::error::StoreError;
use std::sync::OnceLock;

pub const BIT_S: u8 = 0b0001;
pub const BIT_P: u8 = 0b0010;
pub const BIT_O: u8 = 0b0100;
pub const BIT_C: u8 = 0b1000;

pub const SLOT_COUNT: usize = 16;

/// Whether s/p/o/c are bound in a query, packed as a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mask(pub u8);

impl Mask {
    pub const EMPTY: Mask = Mask(0);

    pub fn new(s: bool, p: bool, o: bool, c: bool) -> Self {
        let mut m = 0u8;
        if s {
            m |= BIT_S;
        }
        if p {
            m |= BIT_P;
        }
        if o {
            m |= BIT_O;
        }
        if c {
            m |= BIT_C;
        }
        Mask(m)
    }

    pub fn has_s(self) -> bool {
        self.0 & BIT_S != 0
    }
    pub fn has_p(self) -> bool {
        self.0 & BIT_P != 0
    }
    pub fn has_o(self) -> bool {
        self.0 & BIT_O != 0
    }
    pub fn has_c(self) -> bool {
        self.0 & BIT_C != 0
    }

    /// Canonical pattern string in fixed s→p→o→c order, e.g. `"pc"`, `"spoc"`.
    /// The empty mask yields `""` (the trivial, fully-unbound pattern).
    pub fn pattern_string(self) -> String {
        let mut s = String::with_capacity(4);
        if self.has_s() {
            s.push('s');
        }
        if self.has_p() {
            s.push('p');
        }
        if self.has_o() {
            s.push('o');
        }
        if self.has_c() {
            s.push('c');
        }
        s
    }

    pub fn from_pattern_string(pattern: &str) -> Result<Self, StoreError> {
        validate_pattern(pattern)?;
        let mut m = 0u8;
        if pattern.contains('s') {
            m |= BIT_S;
        }
        if pattern.contains('p') {
            m |= BIT_P;
        }
        if pattern.contains('o') {
            m |= BIT_O;
        }
        if pattern.contains('c') {
            m |= BIT_C;
        }
        Ok(Mask(m))
    }

    pub fn as_index(self) -> usize {
        self.0 as usize
    }

    /// True iff `other`'s bound positions are a subset of this mask's.
    pub fn contains(self, other: Mask) -> bool {
        self.0 & other.0 == other.0
    }
}

fn pattern_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new("^s?p?o?c?$").unwrap())
}

/// Validate a configured indexed-pattern string against `s?p?o?c?`: each
/// position at most once, in canonical order, and non-empty.
pub fn validate_pattern(pattern: &str) -> Result<(), StoreError> {
    if pattern.is_empty() || !pattern_regex().is_match(pattern) {
        return Err(StoreError::InvalidPattern {
            pattern: pattern.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_string_is_canonical_order() {
        assert_eq!(Mask::new(true, false, true, true).pattern_string(), "soc");
        assert_eq!(Mask::new(false, true, false, true).pattern_string(), "pc");
        assert_eq!(Mask::EMPTY.pattern_string(), "");
    }

    #[test]
    fn rejects_out_of_order_or_duplicate() {
        assert!(validate_pattern("ps").is_err());
        assert!(validate_pattern("ssp").is_err());
        assert!(validate_pattern("").is_err());
        assert!(validate_pattern("x").is_err());
    }

    #[test]
    fn accepts_all_fifteen_non_empty_subsets() {
        for s in [false, true] {
            for p in [false, true] {
                for o in [false, true] {
                    for c in [false, true] {
                        if !(s || p || o || c) {
                            continue;
                        }
                        let pattern = Mask::new(s, p, o, c).pattern_string();
                        assert!(validate_pattern(&pattern).is_ok(), "{pattern}");
                    }
                }
            }
        }
    }
}
