//! # Prepaid gateway server
//! This crate hosts the HTTP side of the prepaid order engine. It is responsible for:
//! * Receiving the buyer-side PayPal checkout callback, and handing approvals to the engine for verification.
//! * Serving the merchant API: opening orders, checking payment status, and issuing refunds.
//! * Relaying payment status changes to the merchant application.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/paypal/{instance_id}/onClose`: The callback the PayPal button on the checkout page posts to when it closes.
//! * `/api/...`: The merchant API. Only callers on the IP whitelist may use it.

pub mod cli;
pub mod config;
pub mod errors;

pub mod data_objects;
pub mod helpers;
pub mod integrations;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
