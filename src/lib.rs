//! NFS-e Relay — ABRASF invoice field extraction and webhook delivery.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod resolve;
