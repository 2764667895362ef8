//! Signal width table
//!
//! The compiler never resolves identifiers on its own; callers hand in a
//! read-only [`SignalTable`] describing the design the property refers to.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Resolved bit width of a property subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Width {
    /// Not pinned to a concrete width, used for bare constants
    Any,
    /// Concrete width in bits
    Bits(u32),
}

impl Width {
    /// Combine two widths, `Any` unifies with everything
    pub fn join(self, other: Width) -> Option<Width> {
        match (self, other) {
            (Width::Any, w) | (w, Width::Any) => Some(w),
            (Width::Bits(a), Width::Bits(b)) if a == b => Some(Width::Bits(a)),
            _ => None,
        }
    }

    /// True unless the width is concrete and above one bit
    pub fn is_single_bit(self) -> bool {
        !matches!(self, Width::Bits(w) if w > 1)
    }

    /// The concrete bit count, if any
    pub fn bits(self) -> Option<u32> {
        match self {
            Width::Any => None,
            Width::Bits(w) => Some(w),
        }
    }
}

impl std::fmt::Display for Width {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Width::Any => f.write_str("any"),
            Width::Bits(w) => write!(f, "{}", w),
        }
    }
}

/// Mapping from signal names to their declared bit widths
///
/// Preserves insertion order so diagnostics and iteration are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalTable {
    widths: IndexMap<String, u32>,
}

impl SignalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a signal. Widths are in bits and must be at least 1.
    pub fn insert(&mut self, name: impl Into<String>, width: u32) {
        debug_assert!(width > 0, "signal width must be at least 1");
        self.widths.insert(name.into(), width);
    }

    /// Look up a signal width
    ///
    /// A bit select such as `bus[3]` that is not declared on its own falls
    /// back to its base name: when `bus` is declared, the select resolves to
    /// a single bit. Selects produced by multi-bit expansion stay resolvable
    /// this way without registering every bit.
    pub fn width(&self, name: &str) -> Option<u32> {
        if let Some(&width) = self.widths.get(name) {
            return Some(width);
        }
        bit_select_base(name)
            .filter(|base| self.widths.contains_key(*base))
            .map(|_| 1)
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Iterate over declared signals in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.widths.iter().map(|(name, &width)| (name.as_str(), width))
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for SignalTable {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut table = SignalTable::new();
        for (name, width) in iter {
            table.insert(name, width);
        }
        table
    }
}

/// Split `name[k]` into its base name when the suffix is a literal bit index
fn bit_select_base(name: &str) -> Option<&str> {
    let stripped = name.strip_suffix(']')?;
    let open = stripped.rfind('[')?;
    let index = &stripped[open + 1..];
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(&stripped[..open])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SignalTable {
        [("clk", 1), ("bus", 8)].into_iter().collect()
    }

    #[test]
    fn test_exact_lookup() {
        let table = table();
        assert_eq!(table.width("clk"), Some(1));
        assert_eq!(table.width("bus"), Some(8));
        assert_eq!(table.width("missing"), None);
    }

    #[test]
    fn test_bit_select_falls_back_to_base() {
        let table = table();
        assert_eq!(table.width("bus[0]"), Some(1));
        assert_eq!(table.width("bus[7]"), Some(1));
        assert_eq!(table.width("nope[0]"), None);
    }

    #[test]
    fn test_declared_select_wins_over_fallback() {
        let mut table = table();
        table.insert("bus[3]", 1);
        assert_eq!(table.width("bus[3]"), Some(1));
    }

    #[test]
    fn test_malformed_selects_do_not_fall_back() {
        let table = table();
        assert_eq!(table.width("bus[x]"), None);
        assert_eq!(table.width("bus[]"), None);
        assert_eq!(table.width("bus["), None);
    }

    #[test]
    fn test_width_join() {
        assert_eq!(Width::Any.join(Width::Bits(4)), Some(Width::Bits(4)));
        assert_eq!(Width::Bits(4).join(Width::Any), Some(Width::Bits(4)));
        assert_eq!(Width::Any.join(Width::Any), Some(Width::Any));
        assert_eq!(Width::Bits(4).join(Width::Bits(4)), Some(Width::Bits(4)));
        assert_eq!(Width::Bits(4).join(Width::Bits(2)), None);
    }

    #[test]
    fn test_single_bit_predicate() {
        assert!(Width::Any.is_single_bit());
        assert!(Width::Bits(1).is_single_bit());
        assert!(!Width::Bits(2).is_single_bit());
    }

    #[test]
    fn test_iteration_order_is_stable() {
        let names: Vec<_> = table().iter().map(|(name, _)| name.to_string()).collect();
        assert_eq!(names, vec!["clk", "bus"]);
    }
}
