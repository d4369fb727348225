//! The text form of log records, shared by the decoder and the plaintext encoder.
//!
//! ```text
//! HH:MM:SS.ffffffZ| [domain] LABEL: {token|name} message
//! ```

use binlog_types::types::{Arg, LevelLabels, LogLevel, ObjectRef, SliceMode};
use chrono::{DateTime, Utc};
use std::fmt::{self, Write};

/// How a record's object reference appears in its line.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum ObjectMention<'a> {
    /// `{token}`
    Token(ObjectRef),
    /// `{token|name}`
    Named(ObjectRef, &'a str),
}

pub struct Line<'a> {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub domain: &'a str,
    pub object: Option<ObjectMention<'a>>,
    pub template: &'a str,
    pub args: &'a [Arg<'a>],
}

fn write_timestamp(out: &mut impl Write, timestamp: DateTime<Utc>) -> fmt::Result {
    write!(out, "{}| ", timestamp.format("%H:%M:%S%.6fZ"))
}

/// `start` is expected to be whole seconds already.
pub fn write_banner(out: &mut impl Write, start: DateTime<Utc>) -> fmt::Result {
    write_timestamp(out, start)?;
    writeln!(
        out,
        "---- Logging begins on {} ----",
        start.format("%A %Y-%m-%dT%H:%M:%SZ")
    )
}

pub fn write_line(out: &mut impl Write, line: &Line<'_>, labels: &LevelLabels) -> fmt::Result {
    write_timestamp(out, line.timestamp)?;

    if line.domain.is_empty() == false {
        write!(out, "[{}] ", line.domain)?;
    }

    let label = labels.label(line.level);
    if label.is_empty() == false {
        write!(out, "{label}: ")?;
    }

    match &line.object {
        None => {}
        Some(ObjectMention::Token(token)) => write!(out, "{{{token}}} ")?,
        Some(ObjectMention::Named(token, name)) => write!(out, "{{{token}|{name}}} ")?,
    }

    write_message(out, line.template, line.args)?;
    out.write_char('\n')
}

pub fn format_message(template: &str, args: &[Arg<'_>]) -> String {
    let mut s = String::with_capacity(template.len());
    // Writing into a String does not fail.
    let _ = write_message(&mut s, template, args);
    s
}

/// Expands printf-style directives. Each directive consumes the next arg, and the arg's
/// own kind decides the rendering. Missing args leave their directives as-is.
pub fn write_message(out: &mut impl Write, template: &str, args: &[Arg<'_>]) -> fmt::Result {
    let mut args = args.iter();
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.write_str(&rest[..pos])?;
        rest = &rest[pos..];

        let (directive_len, directive) = parse_directive(rest);
        let directive_text = &rest[..directive_len];
        rest = &rest[directive_len..];

        match directive {
            Directive::Percent => out.write_char('%')?,
            Directive::Malformed => out.write_str(directive_text)?,
            Directive::Conversion(conv) => match args.next() {
                None => out.write_str(directive_text)?,
                Some(arg) => write_arg(out, conv, arg)?,
            },
        }
    }

    out.write_str(rest)
}

#[derive(PartialEq, Eq, Debug)]
enum Directive {
    Percent,
    Conversion(u8),
    Malformed,
}

const FLAGS: &[u8] = b"-+ #0";
const LENGTH_MODIFIERS: &[u8] = b"hljztqL";
const CONVERSIONS: &[u8] = b"diuxXocsp";

/// `s` starts with `%`. Every byte consumed is ASCII, so the returned length
/// is always a char boundary.
fn parse_directive(s: &str) -> (usize, Directive) {
    let b = s.as_bytes();
    if b.get(1) == Some(&b'%') {
        return (2, Directive::Percent);
    }

    let mut i = 1;
    let skip = |i: &mut usize, pred: &dyn Fn(u8) -> bool| {
        while *i < b.len() && pred(b[*i]) {
            *i += 1;
        }
    };

    skip(&mut i, &|c| FLAGS.contains(&c));
    if b.get(i) == Some(&b'*') {
        i += 1;
    } else {
        skip(&mut i, &|c| c.is_ascii_digit());
    }
    if b.get(i) == Some(&b'.') {
        i += 1;
        if b.get(i) == Some(&b'*') {
            i += 1;
        } else {
            skip(&mut i, &|c| c.is_ascii_digit());
        }
    }
    skip(&mut i, &|c| LENGTH_MODIFIERS.contains(&c));

    match b.get(i) {
        Some(c) if CONVERSIONS.contains(c) => (i + 1, Directive::Conversion(*c)),
        _ => (i, Directive::Malformed),
    }
}

fn write_unsigned(out: &mut impl Write, conv: u8, n: u64) -> fmt::Result {
    match conv {
        b'x' => write!(out, "{n:x}"),
        b'X' => write!(out, "{n:X}"),
        b'o' => write!(out, "{n:o}"),
        b'c' => out.write_char(
            u32::try_from(n)
                .ok()
                .and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER),
        ),
        _ => write!(out, "{n}"),
    }
}

/// `bits` is the value reinterpreted as unsigned at its own width, for hex and octal.
fn write_signed(out: &mut impl Write, conv: u8, n: i64, bits: u64) -> fmt::Result {
    match conv {
        b'x' | b'X' | b'o' | b'c' => write_unsigned(out, conv, bits),
        _ => write!(out, "{n}"),
    }
}

fn write_arg(out: &mut impl Write, conv: u8, arg: &Arg<'_>) -> fmt::Result {
    match arg {
        Arg::U16(n) => write_unsigned(out, conv, u64::from(*n)),
        Arg::U32(n) => write_unsigned(out, conv, u64::from(*n)),
        Arg::U64(n) => write_unsigned(out, conv, *n),
        Arg::I16(n) => write_signed(out, conv, i64::from(*n), u64::from(*n as u16)),
        Arg::I32(n) => write_signed(out, conv, i64::from(*n), u64::from(*n as u32)),
        Arg::I64(n) => write_signed(out, conv, *n, *n as u64),
        Arg::Ptr(p) => write!(out, "0x{p:x}"),
        Arg::Char(c) => out.write_char(*c),
        Arg::Str(s) => out.write_str(s),
        Arg::Bytes(b, SliceMode::Literal) => out.write_str(&String::from_utf8_lossy(b)),
        Arg::Bytes(b, SliceMode::Hex) => {
            for byte in b.iter() {
                write!(out, "{byte:02x}")?;
            }
            Ok(())
        }
    }
}
