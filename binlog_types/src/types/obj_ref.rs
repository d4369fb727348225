use derive_more::{Deref, Display, From, Into};

/// A small integer standing in for a live object inside the binary format.
///
/// Tokens are allocated by an object-identity table and start at 1.
#[derive(From, Into, Deref, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ObjectRef(u32);

impl ObjectRef {
    pub const FIRST: Self = Self(1);

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}
