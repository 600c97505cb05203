//! Test utilities
//!
//! They contain fake data builders and dumb doubles of the upstream fetchers.

pub mod fake_data;
