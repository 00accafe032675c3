//! Infrastructure layer - HTTP transport, submitters and persistence

pub mod http;
pub mod ledger;
pub mod storage;
