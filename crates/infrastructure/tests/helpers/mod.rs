#![allow(dead_code)]

mod builders;
mod dns_server_mock;
mod proxy;

pub use builders::*;
pub use dns_server_mock::{build_reply, MockBehavior, MockDnsServer};
pub use proxy::{read_frame, write_frame, RecordingObserver, TestProxy, QUERY_TIMEOUT};
