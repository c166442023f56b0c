pub mod auth;
mod beneficiaries;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod locations;
pub mod notify;
pub mod otp;
pub mod search;
mod session;
pub mod types;

pub use auth::AuthOutcome;
pub use client::SessionClient;
pub use error::ClientError;
pub use locations::LocationResolver;
pub use notify::{compose_summary, NotificationGate};
pub use otp::{hash_otp, OtpProvider};
pub use search::{search_slots, search_slots_from, session_matches};
pub use types::{BookingRequest, SlotMatch};
