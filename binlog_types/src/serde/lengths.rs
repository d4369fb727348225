use anyhow::Result;
use derive_more::{Deref, From};
use std::io::{self, Read, Write};

pub(crate) fn read_le<const N: usize>(r: &mut impl Read) -> Result<[u8; N], io::Error> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

#[derive(Deref, Clone, Copy)]
pub struct BodyLen(u32);
impl BodyLen {
    pub fn from_dynalen_body(buf: &[u8]) -> Result<Self> {
        let int = u32::try_from(buf.len())?;
        Ok(Self(int))
    }
    pub fn deser(r: &mut impl Read) -> Result<(usize, Self), io::Error> {
        let buf = read_le::<4>(r)?;
        Ok((buf.len(), Self(u32::from_le_bytes(buf))))
    }
}

#[derive(Deref, Clone, Copy)]
pub struct ArgsCount(u16);
impl ArgsCount {
    pub fn from_args<T>(args: &[T]) -> Result<Self> {
        let ct = u16::try_from(args.len())?;
        Ok(Self(ct))
    }
    pub fn deser(r: &mut impl Read) -> Result<(usize, Self), io::Error> {
        let buf = read_le::<2>(r)?;
        Ok((buf.len(), Self(u16::from_le_bytes(buf))))
    }
}

/// Per-stream index of an interned domain name.
#[derive(From, Deref, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DomainId(u16);
impl DomainId {
    pub fn deser(r: &mut impl Read) -> Result<(usize, Self), io::Error> {
        let buf = read_le::<2>(r)?;
        Ok((buf.len(), Self(u16::from_le_bytes(buf))))
    }
}

pub(crate) fn write_buf(w: &mut impl Write, buf: &[u8]) -> Result<usize, io::Error> {
    w.write_all(buf)?;
    Ok(buf.len())
}

/// Writes `{ len: u32, body }`.
pub(crate) fn write_dynalen(w: &mut impl Write, body: &[u8]) -> Result<usize> {
    let body_len = BodyLen::from_dynalen_body(body)?;
    let mut w_len = write_buf(w, &body_len.to_le_bytes())?;
    w_len += write_buf(w, body)?;
    Ok(w_len)
}

/// Reads `{ len: u32, body }`.
pub(crate) fn read_dynalen(r: &mut impl Read, r_len: &mut usize) -> Result<Vec<u8>, io::Error> {
    let (delta_r_len, body_len) = BodyLen::deser(r)?;
    *r_len += delta_r_len;

    let mut buf = vec![0u8; *body_len as usize];
    r.read_exact(&mut buf)?;
    *r_len += buf.len();

    Ok(buf)
}
