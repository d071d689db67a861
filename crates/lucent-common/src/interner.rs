//! String interning for identifier deduplication.
//!
//! Identifiers (declaration names, member names, operator stems) are
//! compared and hashed constantly during resolution, so we intern them
//! once into a small `Copy` handle rather than passing `String`s around.

use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// An interned string handle. Cheap to copy, compare, and hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom(u32);

impl Atom {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Construct an `Atom` from a raw index. Only meaningful when paired
    /// with the `Interner` that produced it; exposed for tests and for
    /// property maps that need a sentinel.
    #[inline]
    pub const fn from_u32(raw: u32) -> Self {
        Atom(raw)
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({})", self.0)
    }
}

struct InternerData {
    strings: Vec<Arc<str>>,
    lookup: FxHashMap<Arc<str>, Atom>,
}

/// A thread-safe string interner.
///
/// Reads (resolving an `Atom` back to text) and writes (interning a new
/// string) can both happen concurrently from downstream IR workers that
/// hold a shared, read-only checker; the interner itself stays mutable
/// behind a lock so new operator stems discovered late in resolution can
/// still be interned.
pub struct Interner {
    data: RwLock<InternerData>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    pub fn new() -> Self {
        Interner {
            data: RwLock::new(InternerData {
                strings: Vec::new(),
                lookup: FxHashMap::default(),
            }),
        }
    }

    /// Intern `text`, returning its handle. Repeated interning of the
    /// same text returns the same `Atom`.
    pub fn intern(&self, text: &str) -> Atom {
        if let Some(atom) = self.data.read().unwrap().lookup.get(text) {
            return *atom;
        }
        let mut data = self.data.write().unwrap();
        if let Some(atom) = data.lookup.get(text) {
            return *atom;
        }
        let shared: Arc<str> = Arc::from(text);
        let atom = Atom(data.strings.len() as u32);
        data.strings.push(shared.clone());
        data.lookup.insert(shared, atom);
        atom
    }

    /// Resolve an `Atom` back to its text.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        self.data.read().unwrap().strings[atom.0 as usize].clone()
    }

    pub fn len(&self) -> usize {
        self.data.read().unwrap().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_text_yields_same_atom() {
        let interner = Interner::new();
        let a = interner.intern("Self");
        let b = interner.intern("Self");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_text_yields_distinct_atoms() {
        let interner = Interner::new();
        let a = interner.intern("Movable");
        let b = interner.intern("Copyable");
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_round_trips() {
        let interner = Interner::new();
        let atom = interner.intern("Destructible");
        assert_eq!(&*interner.resolve(atom), "Destructible");
    }
}
