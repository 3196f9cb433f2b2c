//! Helpers for tests that need a real database or a stand-in payment processor.
pub mod gateway;
pub mod prepare_env;
pub mod scripted_processor;
