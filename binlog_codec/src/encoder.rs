use crate::output::PendingOutput;
use crate::{Appended, FlushRegistry, Flushable, LogWriter, ObjectTable};
use anyhow::{anyhow, Result};
use binlog_types::serde::{DomainField, DomainId, ObjectField, StreamHeader, WireRecord};
use binlog_types::types::{Arg, LogLevel, LogRecord, ObjectRef};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::{Arc, Weak};

/// Writes log records to one binary stream.
///
/// Records are buffered, and reach `W` when [`Self::flush`] is called, when the
/// buffer grows large, or when the periodic flush job finds them pending for a whole period.
pub struct LogEncoder<W: Write> {
    state: Mutex<EncoderState<W>>,
    objects: Arc<ObjectTable>,
    min_level: LogLevel,
}

struct EncoderState<W> {
    output: PendingOutput<W>,
    header: StreamHeader,
    domains: HashMap<String, DomainId>,
    /// Tokens whose names this stream has already carried.
    announced: HashSet<ObjectRef>,
    scratch: Vec<u8>,
}

impl<W: Write + Send + 'static> LogEncoder<W> {
    pub fn new(out: W, objects: Arc<ObjectTable>) -> Result<Arc<Self>> {
        Self::with_minimum_level(out, objects, LogLevel::None)
    }

    /// Records below `min_level` are skipped.
    pub fn with_minimum_level(
        out: W,
        objects: Arc<ObjectTable>,
        min_level: LogLevel,
    ) -> Result<Arc<Self>> {
        Self::with_start(out, objects, min_level, Utc::now())
    }

    /// `start` is truncated to whole seconds and becomes the stream's start time.
    pub fn with_start(
        out: W,
        objects: Arc<ObjectTable>,
        min_level: LogLevel,
        start: DateTime<Utc>,
    ) -> Result<Arc<Self>> {
        let header = StreamHeader::starting_at(start);
        let mut output = PendingOutput::new(out);

        let mut buf = vec![];
        header.ser(&mut buf)?;
        output.append(&buf)?;

        let enc = Arc::new(Self {
            state: Mutex::new(EncoderState {
                output,
                header,
                domains: HashMap::new(),
                announced: HashSet::new(),
                scratch: buf,
            }),
            objects,
            min_level,
        });

        let weak: Weak<dyn Flushable> = Arc::downgrade(&enc) as Weak<dyn Flushable>;
        FlushRegistry::global().register(weak);

        Ok(enc)
    }
}

impl<W: Write> LogEncoder<W> {
    pub fn log(
        &self,
        domain: &str,
        level: LogLevel,
        object: Option<ObjectRef>,
        template: &str,
        args: &[Arg<'_>],
    ) -> Result<Appended> {
        let rec = LogRecord::new(domain, level, object, template, args);
        self.log_record(&rec)
    }

    pub fn log_record(&self, rec: &LogRecord<'_>) -> Result<Appended> {
        self.append(rec, None)
    }

    fn append(&self, rec: &LogRecord<'_>, limit: Option<usize>) -> Result<Appended> {
        if rec.level < self.min_level {
            return Ok(Appended::Filtered);
        }

        let mut state = self.state.lock();
        let state = &mut *state;

        let wire = state.to_wire(rec, &self.objects)?;
        state.scratch.clear();
        let w_len = wire.ser(&mut state.scratch)?;

        if let Some(limit) = limit {
            if state.output.encoded_len() + *w_len > limit {
                return Ok(Appended::WouldExceed);
            }
        }

        if let DomainField::Announce(id, name) = &wire.domain {
            state.domains.insert(name.to_string(), *id);
        }
        if let ObjectField::Announce(token, _) = &wire.object {
            state.announced.insert(*token);
        }
        state.output.append(&state.scratch)?;

        Ok(Appended::Written(w_len))
    }

    /// Hands every pending byte to `W`, then flushes `W`.
    pub fn flush(&self) -> Result<()> {
        self.state.lock().output.flush()
    }

    pub fn encoded_len(&self) -> usize {
        self.state.lock().output.encoded_len()
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.state.lock().header.start_time()
    }

    /// Runs `f` with the pending bytes and the underlying sink, while no record can be appended.
    /// The lock is released however `f` exits.
    pub fn with_scoped_buffer_access<R>(&self, f: impl FnOnce(&[u8], &mut W) -> R) -> R {
        self.state.lock().output.with_parts(f)
    }
}

impl<W> EncoderState<W> {
    fn to_wire<'r>(
        &self,
        rec: &LogRecord<'r>,
        objects: &ObjectTable,
    ) -> Result<WireRecord<'r>> {
        let ts_delta_us = (rec.timestamp - self.header.start_time())
            .num_microseconds()
            .unwrap_or(0)
            .max(0) as u64;

        let domain = match self.domains.get(rec.domain) {
            Some(id) => DomainField::Known(*id),
            None => {
                let id = u16::try_from(self.domains.len())
                    .map_err(|_| anyhow!("Too many domains in one stream."))?;
                DomainField::Announce(DomainId::from(id), Cow::Borrowed(rec.domain))
            }
        };

        let object = match rec.object {
            None => ObjectField::None,
            Some(token) if self.announced.contains(&token) => ObjectField::Bare(token),
            Some(token) => match objects.name_for(token) {
                None => ObjectField::Bare(token),
                Some(name) => ObjectField::Announce(token, Cow::Owned(name)),
            },
        };

        Ok(WireRecord {
            level: rec.level,
            ts_delta_us,
            domain,
            object,
            template: Cow::Borrowed(rec.template),
            args: Cow::Borrowed(rec.args),
        })
    }
}

impl<W: Write + Send> Flushable for LogEncoder<W> {
    fn tick(&self) -> Result<()> {
        self.state.lock().output.tick()
    }

    fn flush(&self) -> Result<()> {
        LogEncoder::flush(self)
    }
}

impl<W: Write + Send> LogWriter for LogEncoder<W> {
    fn log_bounded(&self, rec: &LogRecord<'_>, limit: Option<usize>) -> Result<Appended> {
        self.append(rec, limit)
    }

    fn encoded_len(&self) -> usize {
        LogEncoder::encoded_len(self)
    }

    fn start_time(&self) -> DateTime<Utc> {
        LogEncoder::start_time(self)
    }
}

impl<W: Write> Drop for LogEncoder<W> {
    fn drop(&mut self) {
        if let Err(e) = self.state.get_mut().output.flush() {
            tracing::warn!(error = ?e, "Flush on close failed.");
        }
    }
}
