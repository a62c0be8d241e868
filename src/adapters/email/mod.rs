//! Email adapters.

mod resend;

pub use resend::{ResendConfig, ResendDispatcher};
