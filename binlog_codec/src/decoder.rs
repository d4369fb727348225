use crate::render::{self, Line, ObjectMention};
use anyhow::{anyhow, Result};
use binlog_types::serde::{
    is_truncation, DomainField, ObjectField, ReadResult, StreamHeader, WireRecord,
};
use binlog_types::types::{Arg, LevelLabels, LogLevel, ObjectRef};
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::io::{BufReader, Read, Write};

/// Reads one binary stream, record by record.
pub struct LogDecoder<R: Read> {
    r: BufReader<R>,
    header: StreamHeader,
    domains: Vec<String>,
    object_names: HashMap<ObjectRef, String>,
    /// Tokens whose names were carried by this stream.
    announced: HashSet<ObjectRef>,
    banner_rendered: bool,
    current: Option<DecodedRecord>,
}

struct DecodedRecord {
    timestamp: DateTime<Utc>,
    level: LogLevel,
    domain_idx: usize,
    object: Option<ObjectRef>,
    /// Whether this record itself carried the object's name.
    announces: bool,
    template: String,
    args: Vec<Arg<'static>>,
}

impl<R: Read> LogDecoder<R> {
    pub fn new(r: R) -> Result<Self> {
        let mut r = BufReader::new(r);
        let header = match StreamHeader::deser(&mut r) {
            Ok(ReadResult::Some(_, header)) => header,
            Ok(ReadResult::EOF) => return Err(anyhow!("Log stream is empty.")),
            Err(e) if is_truncation(&e) => return Err(e.context("Log stream header is truncated.")),
            Err(e) => return Err(e),
        };

        Ok(Self {
            r,
            header,
            domains: vec![],
            object_names: HashMap::new(),
            announced: HashSet::new(),
            banner_rendered: false,
            current: None,
        })
    }

    /// Seeds names of tokens known from earlier streams, e.g. earlier files of a rotation set.
    pub fn with_object_names(mut self, names: HashMap<ObjectRef, String>) -> Self {
        self.object_names = names;
        self
    }

    /// All token names known after the records decoded so far.
    pub fn into_object_names(self) -> HashMap<ObjectRef, String> {
        self.object_names
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.header.start_time()
    }

    /// Moves to the next record. Returns false at the end of the stream,
    /// including when the stream ends partway through a record.
    pub fn advance(&mut self) -> Result<bool> {
        self.current = None;

        let wire = match WireRecord::deser(&mut self.r, self.domains.len()) {
            Ok(ReadResult::EOF) => return Ok(false),
            Err(e) if is_truncation(&e) => {
                tracing::debug!("Log stream ends partway through a record.");
                return Ok(false);
            }
            Err(e) => return Err(e),
            Ok(ReadResult::Some(_, wire)) => wire,
        };

        let domain_idx = match wire.domain {
            DomainField::Known(id) => *id as usize,
            DomainField::Announce(_, name) => {
                self.domains.push(name.into_owned());
                self.domains.len() - 1
            }
        };

        let (object, announces) = match wire.object {
            ObjectField::None => (None, false),
            ObjectField::Bare(token) => (Some(token), false),
            ObjectField::Announce(token, name) => {
                self.object_names.insert(token, name.into_owned());
                self.announced.insert(token);
                (Some(token), true)
            }
        };

        let start = self.header.start_time();
        let delta = Duration::microseconds(i64::try_from(wire.ts_delta_us).unwrap_or(i64::MAX));
        self.current = Some(DecodedRecord {
            timestamp: start.checked_add_signed(delta).unwrap_or(start),
            level: wire.level,
            domain_idx,
            object,
            announces,
            template: wire.template.into_owned(),
            args: wire.args.into_owned(),
        });
        Ok(true)
    }

    fn current(&self) -> Result<&DecodedRecord> {
        self.current
            .as_ref()
            .ok_or(anyhow!("No current record. Call advance() first."))
    }

    pub fn current_level(&self) -> Result<LogLevel> {
        Ok(self.current()?.level)
    }

    pub fn current_domain(&self) -> Result<&str> {
        let idx = self.current()?.domain_idx;
        Ok(&self.domains[idx])
    }

    pub fn current_timestamp(&self) -> Result<DateTime<Utc>> {
        Ok(self.current()?.timestamp)
    }

    /// The token, and its name if known in this context.
    pub fn current_object(&self) -> Result<Option<(ObjectRef, Option<&str>)>> {
        let object = self.current()?.object.map(|token| {
            let name = self.object_names.get(&token).map(String::as_str);
            (token, name)
        });
        Ok(object)
    }

    pub fn current_message(&self) -> Result<String> {
        let rec = self.current()?;
        Ok(render::format_message(&rec.template, &rec.args))
    }

    /// A token's name is printed when this record announces it, or when the name is known
    /// from earlier streams but this stream never announced it.
    fn current_mention(&self, rec: &DecodedRecord) -> Option<ObjectMention<'_>> {
        rec.object.map(|token| {
            let name = match self.object_names.get(&token) {
                Some(name) if rec.announces || self.announced.contains(&token) == false => {
                    Some(name.as_str())
                }
                _ => None,
            };
            match name {
                Some(name) => ObjectMention::Named(token, name),
                None => ObjectMention::Token(token),
            }
        })
    }

    /// Writes the banner, if not yet written, then every remaining record, as text lines.
    pub fn render_all(&mut self, out: &mut impl Write, labels: &LevelLabels) -> Result<()> {
        let mut buf = String::new();

        if self.banner_rendered == false {
            render::write_banner(&mut buf, self.start_time())?;
            self.banner_rendered = true;
        }

        while self.advance()? {
            let rec = self.current()?;
            let line = Line {
                timestamp: rec.timestamp,
                level: rec.level,
                domain: &self.domains[rec.domain_idx],
                object: self.current_mention(rec),
                template: &rec.template,
                args: &rec.args,
            };
            render::write_line(&mut buf, &line, labels)?;

            out.write_all(buf.as_bytes())?;
            buf.clear();
        }

        out.write_all(buf.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
