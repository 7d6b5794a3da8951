use std::net::SocketAddr;

pub const TYPE_A: u16 = 1;
pub const TYPE_AAAA: u16 = 28;

/// Encodes a standard recursive query with a single IN-class question.
pub fn build_query(id: u16, name: &str, qtype: u16) -> Vec<u8> {
    let labels: Vec<&[u8]> = name
        .trim_end_matches('.')
        .split('.')
        .filter(|l| !l.is_empty())
        .map(str::as_bytes)
        .collect();
    build_query_labels(id, &labels, qtype)
}

/// Same as [`build_query`] but with raw wire labels, which may contain dots.
pub fn build_query_labels(id: u16, labels: &[&[u8]], qtype: u16) -> Vec<u8> {
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(&id.to_be_bytes());
    buf.extend_from_slice(&[0x01, 0x00]);
    buf.extend_from_slice(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    for label in labels {
        buf.push(label.len() as u8);
        buf.extend_from_slice(label);
    }
    buf.push(0);
    buf.extend_from_slice(&qtype.to_be_bytes());
    buf.extend_from_slice(&[0x00, 0x01]);
    buf
}

/// A query header that declares no question.
pub fn build_empty_query(id: u16) -> Vec<u8> {
    let mut buf = vec![0u8; 12];
    buf[0..2].copy_from_slice(&id.to_be_bytes());
    buf[2] = 0x01;
    buf
}

pub fn message_id(buf: &[u8]) -> u16 {
    u16::from_be_bytes([buf[0], buf[1]])
}

pub fn rcode(buf: &[u8]) -> u8 {
    buf[3] & 0x0F
}

pub fn is_response(buf: &[u8]) -> bool {
    buf[2] & 0x80 != 0
}

pub fn is_truncated(buf: &[u8]) -> bool {
    buf[2] & 0x02 != 0
}

pub fn answer_count(buf: &[u8]) -> u16 {
    u16::from_be_bytes([buf[6], buf[7]])
}

/// Local address on which nothing listens, for either transport.
pub async fn closed_port_addr() -> SocketAddr {
    let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    drop(socket);
    addr
}
