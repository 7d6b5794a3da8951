use crate::DomainError;
use bytes::Bytes;

pub const DNS_HEADER_LEN: usize = 12;

const FLAG_QR: u8 = 0x80;
const FLAG_TC: u8 = 0x02;
const RCODE_MASK: u8 = 0x0F;

/// An upstream reply. Only the header is interpreted; `raw` is relayed verbatim.
#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub id: u16,
    pub truncated: bool,
    pub rcode: u8,
    pub raw: Bytes,
}

impl DnsResponse {
    pub fn from_wire(raw: impl Into<Bytes>) -> Result<Self, DomainError> {
        let raw = raw.into();
        if raw.len() < DNS_HEADER_LEN {
            return Err(DomainError::MalformedResponse(format!(
                "{} bytes is shorter than a DNS header",
                raw.len()
            )));
        }
        if raw[2] & FLAG_QR == 0 {
            return Err(DomainError::MalformedResponse(
                "QR bit not set, message is not a response".into(),
            ));
        }

        Ok(Self {
            id: u16::from_be_bytes([raw[0], raw[1]]),
            truncated: raw[2] & FLAG_TC != 0,
            rcode: raw[3] & RCODE_MASK,
            raw,
        })
    }

    pub fn size(&self) -> usize {
        self.raw.len()
    }

    pub fn rcode_name(&self) -> &'static str {
        match self.rcode {
            0 => "NOERROR",
            1 => "FORMERR",
            2 => "SERVFAIL",
            3 => "NXDOMAIN",
            4 => "NOTIMP",
            5 => "REFUSED",
            _ => "UNKNOWN",
        }
    }
}
