//! Zest feedback relay domain logic.
//!
//! Everything in this crate is pure: no I/O, no clocks read implicitly.
//! The API crate wires these pieces to the counter store and the mailer.
//!
//! - [`feedback`] -- inbound submission, honeypot detection, validation.
//! - [`rate_limit`] -- fixed-window limiter with an escalating block.
//! - [`html`] -- HTML escaping for user-supplied text.
//! - [`error`] -- [`error::CoreError`], the shared domain error.

pub mod error;
pub mod feedback;
pub mod html;
pub mod rate_limit;
