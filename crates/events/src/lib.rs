//! Export lifecycle notification infrastructure.
//!
//! Provides [`EventBus`], an in-process publish/subscribe hub backed by
//! `tokio::sync::broadcast`, and [`ExportEvent`], the event envelope
//! published when an export reaches a terminal state. Delivery
//! (mail, webhook) is a subscriber concern; publishing is
//! fire-and-forget and takes no part in the export state machine's
//! correctness.

pub mod bus;

pub use bus::{EventBus, ExportEvent, EXPORT_FAILED, EXPORT_GENERATED};
