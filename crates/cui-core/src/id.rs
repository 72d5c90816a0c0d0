use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner shared by element and container IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Counter behind generated IDs. Never rewinds, so a generated token is
/// never handed out twice in one process.
static COUNTER: AtomicU64 = AtomicU64::new(0);

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a string as an ID, or return the existing handle.
            pub fn intern(s: &str) -> Self {
                $name(INTERNER.get_or_intern(s))
            }

            /// Resolve back to a string slice.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }

            /// Generate a fresh ID (`el_12`, `ctr_3`, ...).
            ///
            /// Callers that hold a document should still check the candidate
            /// against it: imported documents may already use the same token.
            pub fn generate() -> Self {
                let n = COUNTER.fetch_add(1, Ordering::Relaxed);
                Self::intern(&format!("{}_{n}", $prefix))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok($name::intern(&s))
            }
        }
    };
}

interned_id!(
    /// Identifier of an element. Unique across the whole canvas, not just
    /// its container. 4 bytes, `Copy`, O(1) `Eq`/`Hash`.
    ElementId,
    "el"
);

interned_id!(
    /// Identifier of a container.
    ContainerId,
    "ctr"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ElementId::intern("panel_main");
        let b = ElementId::intern("panel_main");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "panel_main");
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = ElementId::generate();
        let b = ElementId::generate();
        let c = ContainerId::generate();
        assert_ne!(a, b);
        assert!(c.as_str().starts_with("ctr_"));
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ContainerId::intern("main_menu");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"main_menu\"");
        let back: ContainerId = serde_json::from_str("\"main_menu\"").unwrap();
        assert_eq!(back, id);
    }
}
