use crate::serde::{
    read_dynalen, read_le, write_buf, write_dynalen, ArgsCount, DomainId, ReadResult, WriteLen,
};
use crate::types::{Arg, LevelInt, LogLevel, ObjectRef};
use anyhow::{anyhow, Result};
use chrono::{DateTime, TimeZone, Utc};
use std::borrow::Cow;
use std::io::{self, ErrorKind, Read, Write};

pub const STREAM_MAGIC: [u8; 4] = [0xcf, 0xb2, 0xab, 0x1b];
pub const FORMAT_VERSION: u8 = 1;

/// Written once, at the beginning of a binary stream.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct StreamHeader {
    /// Whole seconds. Every record's timestamp is a delta against this.
    pub start_secs: u64,
}

impl StreamHeader {
    /// Truncates `now` to whole seconds.
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            start_secs: now.timestamp().max(0) as u64,
        }
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.start_secs as i64, 0)
            .single()
            .unwrap_or_default()
    }

    pub fn ser(&self, w: &mut impl Write) -> Result<WriteLen> {
        let mut w_len = 0;
        w_len += write_buf(w, &STREAM_MAGIC)?;
        w_len += write_buf(w, &[FORMAT_VERSION])?;
        w_len += write_buf(w, &self.start_secs.to_le_bytes())?;
        Ok(WriteLen::new_manual(w_len))
    }

    pub fn deser(r: &mut impl Read) -> Result<ReadResult<Self>> {
        let magic = match read_le::<4>(r) {
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(ReadResult::EOF),
            Err(e) => return Err(anyhow!(e)),
            Ok(magic) => magic,
        };
        if magic != STREAM_MAGIC {
            return Err(anyhow!("Not a binary log stream. Magic {magic:02x?}"));
        }

        let [version] = read_le::<1>(r)?;
        if version != FORMAT_VERSION {
            return Err(anyhow!("Unsupported format version {version}"));
        }

        let start_secs = u64::from_le_bytes(read_le::<8>(r)?);

        let r_len = magic.len() + 1 + 8;
        Ok(ReadResult::Some(r_len, Self { start_secs }))
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum DomainField<'a> {
    Known(DomainId),
    Announce(DomainId, Cow<'a, str>),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ObjectField<'a> {
    None,
    Bare(ObjectRef),
    Announce(ObjectRef, Cow<'a, str>),
}

const OBJECT_FLAG_NONE: u8 = 0;
const OBJECT_FLAG_BARE: u8 = 1;
const OBJECT_FLAG_ANNOUNCE: u8 = 2;

/// A record as it appears on the wire, with stream-relative references unresolved.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct WireRecord<'a> {
    pub level: LogLevel,
    pub ts_delta_us: u64,
    pub domain: DomainField<'a>,
    pub object: ObjectField<'a>,
    pub template: Cow<'a, str>,
    pub args: Cow<'a, [Arg<'a>]>,
}

impl WireRecord<'_> {
    pub fn ser(&self, w: &mut impl Write) -> Result<WriteLen> {
        let mut w_len = 0;

        /* level */
        w_len += write_buf(w, &LevelInt::from(self.level).to_le_bytes())?;

        /* ts_delta_us */
        w_len += write_buf(w, &self.ts_delta_us.to_le_bytes())?;

        /* domain_id, domain_name */
        match &self.domain {
            DomainField::Known(id) => {
                w_len += write_buf(w, &id.to_le_bytes())?;
            }
            DomainField::Announce(id, name) => {
                w_len += write_buf(w, &id.to_le_bytes())?;
                w_len += write_dynalen(w, name.as_bytes())?;
            }
        }

        /* object_flag, token, object_name */
        match &self.object {
            ObjectField::None => {
                w_len += write_buf(w, &[OBJECT_FLAG_NONE])?;
            }
            ObjectField::Bare(token) => {
                w_len += write_buf(w, &[OBJECT_FLAG_BARE])?;
                w_len += write_buf(w, &token.to_le_bytes())?;
            }
            ObjectField::Announce(token, name) => {
                w_len += write_buf(w, &[OBJECT_FLAG_ANNOUNCE])?;
                w_len += write_buf(w, &token.to_le_bytes())?;
                w_len += write_dynalen(w, name.as_bytes())?;
            }
        }

        /* template */
        w_len += write_dynalen(w, self.template.as_bytes())?;

        /* args_count, args */
        w_len += write_buf(w, &ArgsCount::from_args(&self.args[..])?.to_le_bytes())?;
        for arg in self.args.iter() {
            w_len += *arg.ser(w)?;
        }

        Ok(WriteLen::new_manual(w_len))
    }
}

impl WireRecord<'static> {
    /// `domains_known` is the count of domains announced so far in this stream.
    /// A `domain_id` equal to it carries a new name; a larger one is corrupt.
    pub fn deser(r: &mut impl Read, domains_known: usize) -> Result<ReadResult<Self>> {
        /* level */
        let (mut r_len, level_int) = match LevelInt::deser(r) {
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(ReadResult::EOF),
            Err(e) => return Err(anyhow!(e)),
            Ok((r_len, level_int)) => (r_len, level_int),
        };
        let level = LogLevel::try_from(level_int)?;

        /* ts_delta_us */
        let buf = read_le::<8>(r)?;
        r_len += buf.len();
        let ts_delta_us = u64::from_le_bytes(buf);

        /* domain_id, domain_name */
        let (delta_r_len, domain_id) = DomainId::deser(r)?;
        r_len += delta_r_len;
        let domain = match (*domain_id as usize).cmp(&domains_known) {
            std::cmp::Ordering::Less => DomainField::Known(domain_id),
            std::cmp::Ordering::Equal => {
                let name = String::from_utf8(read_dynalen(r, &mut r_len)?)?;
                DomainField::Announce(domain_id, Cow::Owned(name))
            }
            std::cmp::Ordering::Greater => {
                return Err(anyhow!(
                    "Domain id {} was never announced. {domains_known} domains known.",
                    *domain_id
                ))
            }
        };

        /* object_flag, token, object_name */
        let [object_flag] = read_le::<1>(r)?;
        r_len += 1;
        let object = match object_flag {
            OBJECT_FLAG_NONE => ObjectField::None,
            OBJECT_FLAG_BARE => {
                let token = ObjectRef::from(u32::from_le_bytes(read_le::<4>(r)?));
                r_len += 4;
                ObjectField::Bare(token)
            }
            OBJECT_FLAG_ANNOUNCE => {
                let token = ObjectRef::from(u32::from_le_bytes(read_le::<4>(r)?));
                r_len += 4;
                let name = String::from_utf8(read_dynalen(r, &mut r_len)?)?;
                ObjectField::Announce(token, Cow::Owned(name))
            }
            flag => return Err(anyhow!("Unknown object flag {flag}")),
        };

        /* template */
        let template = String::from_utf8(read_dynalen(r, &mut r_len)?)?;

        /* args_count, args */
        let (delta_r_len, args_ct) = ArgsCount::deser(r)?;
        r_len += delta_r_len;
        let mut args = Vec::with_capacity(*args_ct as usize);
        for _ in 0..*args_ct {
            match Arg::deser(r)? {
                ReadResult::EOF => {
                    return Err(anyhow!(io::Error::new(
                        ErrorKind::UnexpectedEof,
                        "EOF while reading record args."
                    )))
                }
                ReadResult::Some(delta_r_len, arg) => {
                    r_len += delta_r_len;
                    args.push(arg);
                }
            }
        }

        let rec = WireRecord {
            level,
            ts_delta_us,
            domain,
            object,
            template: Cow::Owned(template),
            args: Cow::Owned(args),
        };
        Ok(ReadResult::Some(r_len, rec))
    }
}
