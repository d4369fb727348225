use crate::pipeline::helpers::SharedBuf;
use anyhow::Result;
use binlog_codec::{LogDecoder, LogEncoder, ObjectTable};
use binlog_types::types::{Arg, LogLevel};
use rand::seq::SliceRandom;
use rand::thread_rng;
use std::io::Cursor;
use std::sync::Arc;

const DOMAINS: [&str; 3] = ["Sync", "DB", ""];
const LEVELS: [LogLevel; 4] = [
    LogLevel::Verbose,
    LogLevel::Info,
    LogLevel::Warning,
    LogLevel::Error,
];

/// (level, domain, message) as seen by a decoder.
type Seen = (LogLevel, String, String);

fn decode(buf: &SharedBuf) -> Result<Vec<Seen>> {
    let mut dec = LogDecoder::new(Cursor::new(buf.contents()))?;
    let mut seen = vec![];
    while dec.advance()? {
        seen.push((
            dec.current_level()?,
            dec.current_domain()?.to_string(),
            dec.current_message()?,
        ));
    }
    Ok(seen)
}

pub fn test_minimum_levels() -> Result<()> {
    let mut msgs = vec![];
    for (i, domain) in DOMAINS.iter().cycle().take(24).enumerate() {
        let level = LEVELS[i % LEVELS.len()];
        msgs.push((level, *domain, i as i32));
    }
    msgs.shuffle(&mut thread_rng());

    let objects = ObjectTable::new();
    let mut encs = vec![];
    for min_level in LEVELS {
        let buf = SharedBuf::default();
        let enc = LogEncoder::with_minimum_level(buf.clone(), Arc::clone(&objects), min_level)?;
        encs.push((min_level, buf, enc));
    }

    for (level, domain, i) in msgs.iter() {
        for (_, _, enc) in encs.iter() {
            enc.log(domain, *level, None, "message #%d", &[Arg::I32(*i)])?;
        }
    }

    for (min_level, buf, enc) in encs.iter() {
        enc.flush()?;

        let expected = msgs
            .iter()
            .filter(|(level, _, _)| level >= min_level)
            .map(|(level, domain, i)| (*level, domain.to_string(), format!("message #{i}")))
            .collect::<Vec<Seen>>();
        assert_eq!(expected, decode(buf)?, "{min_level}");
    }

    Ok(())
}
