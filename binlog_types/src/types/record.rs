use crate::types::{Arg, LogLevel, ObjectRef};
use chrono::{DateTime, Utc};

/// One log call, as captured at the call site. Never mutated after creation.
#[derive(Clone, Debug)]
pub struct LogRecord<'a> {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub domain: &'a str,
    pub object: Option<ObjectRef>,
    pub template: &'a str,
    pub args: &'a [Arg<'a>],
}

impl<'a> LogRecord<'a> {
    pub fn new(
        domain: &'a str,
        level: LogLevel,
        object: Option<ObjectRef>,
        template: &'a str,
        args: &'a [Arg<'a>],
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            domain,
            object,
            template,
            args,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
