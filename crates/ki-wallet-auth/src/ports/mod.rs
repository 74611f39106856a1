//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API that the HTTP layer calls
//! - **Outbound (Driven)**: Nonce persistence and the clock

pub mod inbound;
pub mod outbound;
