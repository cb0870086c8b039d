//! String interning for identifiers.
//!
//! A [`Symbol`] is a compact handle into an [`Interner`]; comparing two
//! symbols is an integer comparison rather than a string comparison, and an
//! identifier that appears many times in a source file is stored only once.
//!
//! Unlike a process-wide interner, an [`Interner`] here is owned by the
//! compilation `Session` (see `portc-drv`) and dropped with it — the
//! compiler only ever processes one module per run, so there is nothing to
//! gain from a global, `'static` table.

use std::collections::HashMap;

/// A handle to an interned string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(u32);

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// Interns strings for the duration of one compilation.
#[derive(Default)]
pub struct Interner {
    strings: Vec<Box<str>>,
    lookup: HashMap<Box<str>, Symbol>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `s`, returning its existing symbol or allocating a new one.
    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.lookup.get(s) {
            return sym;
        }
        let sym = Symbol(self.strings.len() as u32);
        let boxed: Box<str> = s.into();
        self.strings.push(boxed.clone());
        self.lookup.insert(boxed, sym);
        sym
    }

    /// Resolve a symbol back to its string. Panics if `sym` was not
    /// produced by this interner, which would indicate a compiler bug.
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_string_twice_returns_same_symbol() {
        let mut i = Interner::new();
        let a = i.intern("entrada");
        let b = i.intern("entrada");
        assert_eq!(a, b);
    }

    #[test]
    fn interning_distinct_strings_returns_distinct_symbols() {
        let mut i = Interner::new();
        let a = i.intern("x");
        let b = i.intern("y");
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_round_trips_the_original_text() {
        let mut i = Interner::new();
        let sym = i.intern("raiz");
        assert_eq!(i.resolve(sym), "raiz");
    }

    quickcheck::quickcheck! {
        fn resolve_always_round_trips(s: String) -> bool {
            let mut i = Interner::new();
            let sym = i.intern(&s);
            i.resolve(sym) == s
        }
    }
}
