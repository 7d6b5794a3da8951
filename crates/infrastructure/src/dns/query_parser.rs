//! Client query decoding on top of `hickory-proto`.
//!
//! Only the header id and the first question are interpreted; the raw bytes
//! are kept so the query can be forwarded upstream unmodified.

use bytes::Bytes;
use ferrous_relay_domain::{DnsQuery, DomainError, Question, DNS_HEADER_LEN};
use hickory_proto::op::Message;

const FLAG_QR: u8 = 0x80;

pub fn parse_query(raw: Bytes) -> Result<DnsQuery, DomainError> {
    if raw.len() < DNS_HEADER_LEN {
        return Err(DomainError::InvalidQuery(format!(
            "{} bytes is shorter than a DNS header",
            raw.len()
        )));
    }
    if raw[2] & FLAG_QR != 0 {
        return Err(DomainError::InvalidQuery(
            "QR bit set, message is a response".to_string(),
        ));
    }

    let message = Message::from_vec(&raw).map_err(|e| DomainError::InvalidQuery(e.to_string()))?;
    let query = message.queries().first().ok_or(DomainError::EmptyQuestion)?;

    let question = Question::new(
        query.name().to_ascii(),
        query.query_type().to_string(),
        query.query_class().to_string(),
    );

    Ok(DnsQuery::new(message.id(), question, raw))
}
