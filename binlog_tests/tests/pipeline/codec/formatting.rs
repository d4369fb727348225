use crate::pipeline::helpers::{decode_bytes, stream_regex, SharedBuf};
use anyhow::Result;
use binlog_codec::{LogDecoder, LogEncoder, ObjectTable};
use binlog_types::types::{Arg, LevelLabels, LogLevel};
use std::io::Cursor;

const SLICE: &[u8] = b"hello";

fn cases() -> Vec<(&'static str, Vec<Arg<'static>>, &'static str)> {
    vec![
        (
            "Unsigned %u, Long %lu, LongLong %llu, Size %zx, Pointer %p",
            vec![
                Arg::U32(1234567890),
                Arg::U64(2345678901),
                Arg::U64(123456789123456789),
                Arg::size(0xabcdabcd),
                Arg::addr(0x7fff5fbc),
            ],
            "Unsigned 1234567890, Long 2345678901, LongLong 123456789123456789, Size abcdabcd, Pointer 0x7fff5fbc",
        ),
        (
            "Int %d, Long %ld, LongLong %lld, Size %zd, Char %c",
            vec![
                Arg::I32(1234567890),
                Arg::I64(234567890),
                Arg::I64(123456789123456789),
                Arg::ssize(1234567890),
                Arg::Char('@'),
            ],
            "Int 1234567890, Long 234567890, LongLong 123456789123456789, Size 1234567890, Char @",
        ),
        (
            "Int %d, Long %ld, LongLong %lld, Size %zd, Char %c",
            vec![
                Arg::I32(-1234567890),
                Arg::I64(-234567890),
                Arg::I64(-123456789123456789),
                Arg::ssize(-1234567890),
                Arg::Char('@'),
            ],
            "Int -1234567890, Long -234567890, LongLong -123456789123456789, Size -1234567890, Char @",
        ),
        (
            "String is '%s', slice is '%.*s' (hex %-.*s)",
            vec![Arg::str("C string"), Arg::slice(SLICE), Arg::hex(SLICE)],
            "String is 'C string', slice is 'hello' (hex 68656c6c6f)",
        ),
    ]
}

fn encode_cases() -> Result<Vec<u8>> {
    let buf = SharedBuf::default();
    let enc = LogEncoder::new(buf.clone(), ObjectTable::new())?;
    for (template, args, _) in cases() {
        enc.log("Test", LogLevel::Info, None, template, &args)?;
    }
    enc.flush()?;
    Ok(buf.contents())
}

pub fn test_round_trip() -> Result<()> {
    let decoded = decode_bytes(encode_cases()?, &LevelLabels::none())?;

    let lines = cases()
        .into_iter()
        .map(|(_, _, expected)| regex::escape(&format!("[Test] {expected}")))
        .collect::<Vec<_>>();
    let lines = lines.iter().map(String::as_str).collect::<Vec<_>>();
    let re = stream_regex(&lines)?;
    assert!(re.is_match(&decoded), "\n{decoded}");

    Ok(())
}

pub fn test_accessors() -> Result<()> {
    let mut dec = LogDecoder::new(Cursor::new(encode_cases()?))?;

    let mut prev_ts = dec.start_time();
    for (_, _, expected) in cases() {
        assert!(dec.advance()?);
        assert_eq!(LogLevel::Info, dec.current_level()?);
        assert_eq!("Test", dec.current_domain()?);
        assert_eq!(None, dec.current_object()?);
        assert_eq!(expected, dec.current_message()?);

        let ts = dec.current_timestamp()?;
        assert!(prev_ts <= ts);
        prev_ts = ts;
    }
    assert!(dec.advance()? == false);

    Ok(())
}
