use crate::types::Arg;
use anyhow::{anyhow, Result};
use derive_more::{Deref, From};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use std::any;
use std::io::{self, Read};
use std::mem;

#[derive(From, Deref, Clone, Copy)]
pub struct ArgTypeInt(u8);
impl From<ArgType> for ArgTypeInt {
    fn from(arg_type: ArgType) -> Self {
        let int = arg_type.to_u8().unwrap();
        Self(int)
    }
}
impl ArgTypeInt {
    pub fn deser(r: &mut impl Read) -> Result<(usize, Self), io::Error> {
        let mut buf = [0u8; mem::size_of::<u8>()];
        r.read_exact(&mut buf)?;
        let int = u8::from_le_bytes(buf);
        Ok((buf.len(), Self(int)))
    }
}

/// Arg tags are mapped to integers by hand, because [`Arg`] carries data
/// and its automatic discriminants are not a stable wire contract.
/// Zero is never a valid tag.
#[repr(u8)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, FromPrimitive, ToPrimitive, Debug)]
pub enum ArgType {
    U16 = 1,
    U32 = 2,
    U64 = 3,
    I16 = 4,
    I32 = 5,
    I64 = 6,
    Ptr = 7,
    Char = 8,
    Str = 9,
    Bytes = 10,
}
impl TryFrom<ArgTypeInt> for ArgType {
    type Error = anyhow::Error;
    fn try_from(int: ArgTypeInt) -> Result<Self> {
        ArgType::from_u8(int.0).ok_or(anyhow!(
            "Unknown {} {}",
            any::type_name::<ArgTypeInt>(),
            int.0
        ))
    }
}
impl From<&Arg<'_>> for ArgType {
    fn from(arg: &Arg<'_>) -> Self {
        match arg {
            Arg::U16(_) => ArgType::U16,
            Arg::U32(_) => ArgType::U32,
            Arg::U64(_) => ArgType::U64,
            Arg::I16(_) => ArgType::I16,
            Arg::I32(_) => ArgType::I32,
            Arg::I64(_) => ArgType::I64,
            Arg::Ptr(_) => ArgType::Ptr,
            Arg::Char(_) => ArgType::Char,
            Arg::Str(_) => ArgType::Str,
            Arg::Bytes(..) => ArgType::Bytes,
        }
    }
}
