//! Interned HDL identifiers.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// An interned module, port, net, or instance name.
///
/// Comparing two `Ident`s is a `u32` comparison, which keeps instance-to-module
/// lookups in the structural front end cheap.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Wraps a raw interner index. Intended for tests and deserialization.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw interner index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `try_from_usize` only produces indices that fit in `u32`, and
// `into_usize` widens losslessly.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// Thread-safe string interner shared by every parse in a session.
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates an empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns `s`, returning the existing identifier if already present.
    pub fn get_or_intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Looks up `s` without interning it.
    pub fn get(&self, s: &str) -> Option<Ident> {
        self.rodeo.get(s)
    }

    /// Resolves an identifier back to its text.
    ///
    /// # Panics
    ///
    /// Panics if `ident` came from a different interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_resolve_roundtrip() {
        let interner = Interner::new();
        let id = interner.get_or_intern("u1");
        assert_eq!(interner.resolve(id), "u1");
    }

    #[test]
    fn same_name_same_ident() {
        let interner = Interner::new();
        assert_eq!(interner.get_or_intern("A"), interner.get_or_intern("A"));
        assert_ne!(interner.get_or_intern("A"), interner.get_or_intern("B"));
    }

    #[test]
    fn get_does_not_intern() {
        let interner = Interner::new();
        assert!(interner.get("clk").is_none());
        let id = interner.get_or_intern("clk");
        assert_eq!(interner.get("clk"), Some(id));
    }

    #[test]
    fn raw_roundtrip() {
        assert_eq!(Ident::from_raw(7).as_raw(), 7);
    }
}
