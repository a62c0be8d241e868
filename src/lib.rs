//! Coaching Billing - pending payment and invoice lifecycle
//!
//! A pending payment moves from `pending` to `completed`, `cancelled` or
//! `overdue`, driven by signed payment provider webhooks or admin actions.
//! Every committed transition renders an invoice PDF where relevant, emails
//! the client and appends an audit entry.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
