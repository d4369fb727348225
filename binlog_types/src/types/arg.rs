use num_derive::{FromPrimitive, ToPrimitive};
use std::borrow::Cow;

/// One printf-style argument, tagged with its kind.
///
/// The tag, not the template directive, decides how the value is stored and rendered.
/// A template whose directives disagree with the tags still renders, best-effort.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Arg<'a> {
    U16(u16),
    U32(u32),
    U64(u64),
    I16(i16),
    I32(i32),
    I64(i64),
    Ptr(u64),
    Char(char),
    Str(Cow<'a, str>),
    Bytes(Cow<'a, [u8]>, SliceMode),
}

/// How a length-prefixed byte slice is rendered: `%.*s` vs `%-.*s`.
#[repr(u8)]
#[derive(PartialEq, Eq, Clone, Copy, FromPrimitive, ToPrimitive, Debug)]
pub enum SliceMode {
    Literal = 0,
    Hex = 1,
}

impl<'a> Arg<'a> {
    /// `%zu` / `%zx`
    pub fn size(n: usize) -> Self {
        Arg::U64(n as u64)
    }
    /// `%zd`
    pub fn ssize(n: isize) -> Self {
        Arg::I64(n as i64)
    }
    /// `%p`
    pub fn ptr<T>(p: *const T) -> Self {
        Arg::Ptr(p as usize as u64)
    }
    pub fn addr(addr: usize) -> Self {
        Arg::Ptr(addr as u64)
    }
    /// `%s`
    pub fn str(s: &'a str) -> Self {
        Arg::Str(Cow::Borrowed(s))
    }
    /// `%.*s`
    pub fn slice(b: &'a [u8]) -> Self {
        Arg::Bytes(Cow::Borrowed(b), SliceMode::Literal)
    }
    /// `%-.*s`
    pub fn hex(b: &'a [u8]) -> Self {
        Arg::Bytes(Cow::Borrowed(b), SliceMode::Hex)
    }

    pub fn into_owned(self) -> Arg<'static> {
        match self {
            Arg::U16(i) => Arg::U16(i),
            Arg::U32(i) => Arg::U32(i),
            Arg::U64(i) => Arg::U64(i),
            Arg::I16(i) => Arg::I16(i),
            Arg::I32(i) => Arg::I32(i),
            Arg::I64(i) => Arg::I64(i),
            Arg::Ptr(p) => Arg::Ptr(p),
            Arg::Char(c) => Arg::Char(c),
            Arg::Str(s) => Arg::Str(Cow::Owned(s.into_owned())),
            Arg::Bytes(b, mode) => Arg::Bytes(Cow::Owned(b.into_owned()), mode),
        }
    }
}

impl From<u16> for Arg<'_> {
    fn from(i: u16) -> Self {
        Arg::U16(i)
    }
}
impl From<u32> for Arg<'_> {
    fn from(i: u32) -> Self {
        Arg::U32(i)
    }
}
impl From<u64> for Arg<'_> {
    fn from(i: u64) -> Self {
        Arg::U64(i)
    }
}
impl From<i16> for Arg<'_> {
    fn from(i: i16) -> Self {
        Arg::I16(i)
    }
}
impl From<i32> for Arg<'_> {
    fn from(i: i32) -> Self {
        Arg::I32(i)
    }
}
impl From<i64> for Arg<'_> {
    fn from(i: i64) -> Self {
        Arg::I64(i)
    }
}
impl From<char> for Arg<'_> {
    fn from(c: char) -> Self {
        Arg::Char(c)
    }
}
impl<'a> From<&'a str> for Arg<'a> {
    fn from(s: &'a str) -> Self {
        Arg::str(s)
    }
}
impl From<String> for Arg<'_> {
    fn from(s: String) -> Self {
        Arg::Str(Cow::Owned(s))
    }
}
