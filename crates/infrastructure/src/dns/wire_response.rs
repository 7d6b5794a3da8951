use ferrous_relay_domain::{DnsQuery, DNS_HEADER_LEN};

const RCODE_SERVFAIL: u8 = 2;
const FLAG_QR: u8 = 0x80;
const OPCODE_RD_MASK: u8 = 0x79;
const FLAG_RA: u8 = 0x80;

/// Returns the offset just past the first question entry, or `None` when the
/// question cannot be walked. Compression pointers end the name.
pub fn question_end(buf: &[u8]) -> Option<usize> {
    let mut pos = DNS_HEADER_LEN;
    loop {
        let label_len = *buf.get(pos)? as usize;
        if label_len == 0 {
            pos += 1;
            break;
        }
        if label_len & 0xC0 == 0xC0 {
            pos += 2;
            break;
        }
        if label_len & 0xC0 != 0 {
            return None;
        }
        pos += 1 + label_len;
    }

    let end = pos + 4;
    (end <= buf.len()).then_some(end)
}

/// Builds a SERVFAIL answer for `query` directly in wire format.
///
/// The reply carries the query's id, opcode and RD flag, and echoes the first
/// question when it can be located in the raw bytes. No answer, authority or
/// additional records are included.
pub fn build_servfail(query: &DnsQuery) -> Vec<u8> {
    let raw = &query.raw[..];
    let question = question_end(raw).map(|end| &raw[DNS_HEADER_LEN..end]);

    let mut buf = Vec::with_capacity(DNS_HEADER_LEN + question.map_or(0, <[u8]>::len));
    buf.extend_from_slice(&query.id.to_be_bytes());

    let request_flags = raw.get(2).copied().unwrap_or(0);
    buf.push(FLAG_QR | (request_flags & OPCODE_RD_MASK));
    buf.push(FLAG_RA | RCODE_SERVFAIL);

    let qdcount: u16 = if question.is_some() { 1 } else { 0 };
    buf.extend_from_slice(&qdcount.to_be_bytes());
    buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

    if let Some(question) = question {
        buf.extend_from_slice(question);
    }

    buf
}
