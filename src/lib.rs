//! Billing cycle and charge allocation engine for shared-room cost tracking.
//!
//! Given a room's membership, payer flags, per-member daily presence, and raw
//! utility totals, the engine deterministically computes each payer's monetary
//! share, manages the billing cycle lifecycle (create, update, auto-complete,
//! close), and guarantees that a cached allocation and a fresh recomputation
//! always agree to the cent.
//!
//! The engine performs no I/O of its own: persistence is supplied through the
//! [`services::RoomStore`] trait, and every computation is a pure function of
//! membership, presence, rates, and cycle bounds.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
