//! # oficio-pix
//!
//! HTTP client for the external PIX payment gateway, implementing the
//! `PaymentGateway` port. The gateway owns the PIX protocol; this crate
//! only speaks its REST surface: create a charge, read its status.

mod client;
mod types;

pub use client::PixClient;
pub use types::{ChargeResponse, CreateChargeRequest, StatusResponse};
