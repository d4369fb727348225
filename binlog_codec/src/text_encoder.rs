use crate::output::PendingOutput;
use crate::render::{self, Line, ObjectMention};
use crate::{Appended, FlushRegistry, Flushable, LogWriter, ObjectTable};
use anyhow::Result;
use binlog_types::serde::{StreamHeader, WriteLen};
use binlog_types::types::{Arg, LevelLabels, LogLevel, LogRecord, ObjectRef};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::io::Write;
use std::sync::{Arc, Weak};

/// Writes log records already rendered as text lines, the way [`crate::LogDecoder`] renders them.
pub struct TextEncoder<W: Write> {
    state: Mutex<TextState<W>>,
    objects: Arc<ObjectTable>,
    labels: LevelLabels,
    min_level: LogLevel,
}

struct TextState<W> {
    output: PendingOutput<W>,
    start: DateTime<Utc>,
    announced: HashSet<ObjectRef>,
    scratch: String,
}

impl<W: Write + Send + 'static> TextEncoder<W> {
    pub fn new(out: W, objects: Arc<ObjectTable>) -> Result<Arc<Self>> {
        Self::with_minimum_level(out, objects, LogLevel::None)
    }

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
        let start = StreamHeader::starting_at(start).start_time();
        let mut output = PendingOutput::new(out);

        let mut scratch = String::new();
        render::write_banner(&mut scratch, start)?;
        output.append(scratch.as_bytes())?;

        let enc = Arc::new(Self {
            state: Mutex::new(TextState {
                output,
                start,
                announced: HashSet::new(),
                scratch,
            }),
            objects,
            labels: LevelLabels::standard(),
            min_level,
        });

        let weak: Weak<dyn Flushable> = Arc::downgrade(&enc) as Weak<dyn Flushable>;
        FlushRegistry::global().register(weak);

        Ok(enc)
    }
}

impl<W: Write> TextEncoder<W> {
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

        let name = match rec.object {
            Some(token) if state.announced.contains(&token) == false => {
                self.objects.name_for(token)
            }
            _ => None,
        };
        let object = rec.object.map(|token| match &name {
            Some(name) => ObjectMention::Named(token, name),
            None => ObjectMention::Token(token),
        });

        state.scratch.clear();
        let line = Line {
            timestamp: rec.timestamp,
            level: rec.level,
            domain: rec.domain,
            object,
            template: rec.template,
            args: rec.args,
        };
        render::write_line(&mut state.scratch, &line, &self.labels)?;
        let w_len = state.scratch.len();

        if let Some(limit) = limit {
            if state.output.encoded_len() + w_len > limit {
                return Ok(Appended::WouldExceed);
            }
        }

        if let (Some(token), Some(_)) = (rec.object, &name) {
            state.announced.insert(token);
        }
        state.output.append(state.scratch.as_bytes())?;

        Ok(Appended::Written(WriteLen::new_manual(w_len)))
    }

    pub fn flush(&self) -> Result<()> {
        self.state.lock().output.flush()
    }

    pub fn encoded_len(&self) -> usize {
        self.state.lock().output.encoded_len()
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.state.lock().start
    }

    pub fn with_scoped_buffer_access<R>(&self, f: impl FnOnce(&[u8], &mut W) -> R) -> R {
        self.state.lock().output.with_parts(f)
    }
}

impl<W: Write + Send> Flushable for TextEncoder<W> {
    fn tick(&self) -> Result<()> {
        self.state.lock().output.tick()
    }

    fn flush(&self) -> Result<()> {
        TextEncoder::flush(self)
    }
}

impl<W: Write + Send> LogWriter for TextEncoder<W> {
    fn log_bounded(&self, rec: &LogRecord<'_>, limit: Option<usize>) -> Result<Appended> {
        self.append(rec, limit)
    }

    fn encoded_len(&self) -> usize {
        TextEncoder::encoded_len(self)
    }

    fn start_time(&self) -> DateTime<Utc> {
        TextEncoder::start_time(self)
    }
}

impl<W: Write> Drop for TextEncoder<W> {
    fn drop(&mut self) {
        if let Err(e) = self.state.get_mut().output.flush() {
            tracing::warn!(error = ?e, "Flush on close failed.");
        }
    }
}
