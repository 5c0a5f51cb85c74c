//! Behavioral specifications for linkbus.
//!
//! Black-box tests that run a real producer and consumer against the
//! in-memory broker and observe handler invocations and stream contents.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/delivery.rs"]
mod delivery;
#[path = "specs/dispatch.rs"]
mod dispatch;
#[path = "specs/cancellation.rs"]
mod cancellation;
