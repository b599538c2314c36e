//! # Game Server Monitor Library
//!
//! Polls a configured list of game servers over the A2S_INFO UDP
//! protocol and delivers one complete status batch per cycle to a
//! presentation loop, without letting a slow or dead server hold up
//! the rest.
//!
//! ## Architecture Overview
//!
//! The pipeline has one background side and one consumer side, joined
//! by a single-slot channel:
//!
//! - `scheduler` triggers one polling cycle per interval, snapshotting
//!   the server list at the trigger point so concurrent edits never
//!   tear a running cycle, and re-arms itself only after the cycle's
//!   batch has been published. Cycles run serially, never overlapping.
//! - `poller` fans one query task out per server inside a cycle and
//!   joins them in input order, so batch order equals list order no
//!   matter which server answers first.
//! - `query` performs a single request/response exchange with its own
//!   timeout; every failure mode collapses into a typed failure
//!   outcome rather than an error that could abort the cycle.
//! - `channel` is the only crossing between the two sides: a
//!   latest-wins slot that the consumer drains without blocking.
//! - `dispatcher` ticks on the consumer side, draining the slot and
//!   forwarding finished batches to the presenter.
//!
//! ## Module Organization
//!
//! - `query` — single-server A2S_INFO exchange
//! - `poller` — per-cycle concurrent fan-out and ordered reassembly
//! - `channel` — single-slot producer/consumer hand-off
//! - `scheduler` — cycle timing, snapshotting, re-arm
//! - `dispatcher` — consumer tick loop and last-updated stamp
//! - `servers` — persisted server-list collaborator
//! - `display` — presenter seam and console table renderer

pub mod channel;
pub mod dispatcher;
pub mod display;
pub mod poller;
pub mod query;
pub mod scheduler;
pub mod servers;
