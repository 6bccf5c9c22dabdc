//! Wallet test suite

mod wallet_tests;

pub mod helpers;
