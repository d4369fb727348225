use crate::serde::{read_dynalen, read_le, ArgType, ArgTypeInt, ReadResult};
use crate::types::{Arg, SliceMode};
use anyhow::{anyhow, Result};
use num_traits::FromPrimitive;
use std::borrow::Cow;
use std::io::{ErrorKind, Read};

impl Arg<'static> {
    pub fn deser(r: &mut impl Read) -> Result<ReadResult<Self>> {
        /* arg_type */
        let (mut r_len, atype_int) = match ArgTypeInt::deser(r) {
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(ReadResult::EOF),
            Err(e) => return Err(anyhow!(e)),
            Ok((r_len, atype_int)) => (r_len, atype_int),
        };
        let atype = ArgType::try_from(atype_int)?;

        /* arg_body */
        let arg = match atype {
            ArgType::U16 => {
                let buf = read_le::<2>(r)?;
                r_len += buf.len();
                Arg::U16(u16::from_le_bytes(buf))
            }
            ArgType::U32 => {
                let buf = read_le::<4>(r)?;
                r_len += buf.len();
                Arg::U32(u32::from_le_bytes(buf))
            }
            ArgType::U64 => {
                let buf = read_le::<8>(r)?;
                r_len += buf.len();
                Arg::U64(u64::from_le_bytes(buf))
            }
            ArgType::I16 => {
                let buf = read_le::<2>(r)?;
                r_len += buf.len();
                Arg::I16(i16::from_le_bytes(buf))
            }
            ArgType::I32 => {
                let buf = read_le::<4>(r)?;
                r_len += buf.len();
                Arg::I32(i32::from_le_bytes(buf))
            }
            ArgType::I64 => {
                let buf = read_le::<8>(r)?;
                r_len += buf.len();
                Arg::I64(i64::from_le_bytes(buf))
            }
            ArgType::Ptr => {
                let buf = read_le::<8>(r)?;
                r_len += buf.len();
                Arg::Ptr(u64::from_le_bytes(buf))
            }
            ArgType::Char => {
                let buf = read_le::<4>(r)?;
                r_len += buf.len();
                let c = char::from_u32(u32::from_le_bytes(buf)).unwrap_or(char::REPLACEMENT_CHARACTER);
                Arg::Char(c)
            }
            ArgType::Str => {
                let body = read_dynalen(r, &mut r_len)?;
                let s = String::from_utf8(body)?;
                Arg::Str(Cow::Owned(s))
            }
            ArgType::Bytes => {
                let buf = read_le::<1>(r)?;
                r_len += buf.len();
                let mode = SliceMode::from_u8(buf[0])
                    .ok_or(anyhow!("Unknown slice mode {}", buf[0]))?;

                let body = read_dynalen(r, &mut r_len)?;
                Arg::Bytes(Cow::Owned(body), mode)
            }
        };

        Ok(ReadResult::Some(r_len, arg))
    }
}
