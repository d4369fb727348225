use crate::pipeline::helpers::{decode_bytes, stream_regex, SharedBuf};
use anyhow::Result;
use binlog_codec::{LogEncoder, ObjectTable};
use binlog_types::types::{LevelLabels, LogLevel, ObjectRef};
use std::sync::Arc;

fn assert_decodes_to(buf: &SharedBuf, lines: &[&str]) -> Result<()> {
    let decoded = decode_bytes(buf.contents(), &LevelLabels::none())?;
    let lines = lines.iter().map(|l| regex::escape(l)).collect::<Vec<_>>();
    let lines = lines.iter().map(String::as_str).collect::<Vec<_>>();
    assert!(stream_regex(&lines)?.is_match(&decoded), "\n{decoded}");
    Ok(())
}

pub fn test_first_use_per_stream() -> Result<()> {
    let objects = ObjectTable::new();
    let dum = objects.register("Tweedledum");
    let rattle = objects.register("rattle");
    let dee = objects.register("Tweedledee");
    assert_eq!(
        (1, 2, 3),
        (u32::from(dum), u32::from(rattle), u32::from(dee))
    );

    let buf_1 = SharedBuf::default();
    let enc_1 = LogEncoder::new(buf_1.clone(), Arc::clone(&objects))?;
    for token in [dum, dee, rattle, dum] {
        enc_1.log("Obj", LogLevel::Info, Some(token), "Hi there", &[])?;
    }
    enc_1.flush()?;

    let buf_2 = SharedBuf::default();
    let enc_2 = LogEncoder::new(buf_2.clone(), Arc::clone(&objects))?;
    enc_2.log("Obj", LogLevel::Info, Some(rattle), "Hi there", &[])?;
    enc_2.flush()?;

    assert_decodes_to(
        &buf_1,
        &[
            "[Obj] {1|Tweedledum} Hi there",
            "[Obj] {3|Tweedledee} Hi there",
            "[Obj] {2|rattle} Hi there",
            "[Obj] {1} Hi there",
        ],
    )?;
    assert_decodes_to(&buf_2, &["[Obj] {2|rattle} Hi there"])?;

    Ok(())
}

pub fn test_scoped_registration() -> Result<()> {
    let objects = ObjectTable::new();
    let buf = SharedBuf::default();
    let enc = LogEncoder::new(buf.clone(), Arc::clone(&objects))?;

    let token;
    {
        let handle = objects.register_scoped("Walrus");
        token = handle.token();
        assert_eq!(ObjectRef::FIRST, token);
        assert_eq!(Some("Walrus".to_string()), objects.name_for(token));
        enc.log("Obj", LogLevel::Info, Some(token), "alive", &[])?;
    }
    assert_eq!(None, objects.name_for(token));
    assert!(objects.is_empty());

    // A token nobody has named is still written, bare.
    enc.log("Obj", LogLevel::Info, Some(ObjectRef::from(7)), "stray", &[])?;
    enc.flush()?;

    assert_decodes_to(&buf, &["[Obj] {1|Walrus} alive", "[Obj] {7} stray"])
}
