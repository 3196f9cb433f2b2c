pub mod paypal;
pub mod status_relay;
