use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for identifiers — fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// A lightweight, interned identifier. Used both for block-template keys
/// (`printf`, `scanf`, …) and for flow-node ids (`start`, `node_3`, …).
/// Internally a `Spur` index — 4 bytes, Copy, Eq, Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident(Spur);

impl Ident {
    /// Intern a new string, or return the existing id if already interned.
    pub fn intern(s: &str) -> Self {
        Ident(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// The synthetic start-node id.
    pub fn start() -> Self {
        Self::intern("start")
    }

    /// The synthetic end-node id.
    pub fn end() -> Self {
        Self::intern("end")
    }

    /// Id for the flow node derived from the block at `index`.
    ///
    /// Flow graphs are rebuilt wholesale, so ids repeat across rebuilds and
    /// the interner stays bounded by the program size.
    pub fn flow_node(index: usize) -> Self {
        Self::intern(&format!("node_{index}"))
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Ident {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Ident {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Ident::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = Ident::intern("printf");
        let b = Ident::intern("printf");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "printf");
    }

    #[test]
    fn flow_node_ids_are_stable_across_rebuilds() {
        assert_eq!(Ident::flow_node(3), Ident::flow_node(3));
        assert_ne!(Ident::flow_node(3), Ident::flow_node(4));
    }
}
