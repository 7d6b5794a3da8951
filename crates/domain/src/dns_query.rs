use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

/// Question section entry the proxy routes and logs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Name in presentation form, as received.
    pub name: Arc<str>,
    pub record_type: Arc<str>,
    pub record_class: Arc<str>,
}

impl Question {
    pub fn new(
        name: impl Into<Arc<str>>,
        record_type: impl Into<Arc<str>>,
        record_class: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            record_class: record_class.into(),
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.record_class, self.record_type, self.name)
    }
}

/// An incoming client query. `raw` is forwarded upstream unmodified.
#[derive(Debug, Clone)]
pub struct DnsQuery {
    pub id: u16,
    pub question: Question,
    pub raw: Bytes,
}

impl DnsQuery {
    pub fn new(id: u16, question: Question, raw: impl Into<Bytes>) -> Self {
        Self {
            id,
            question,
            raw: raw.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.question.name
    }
}
