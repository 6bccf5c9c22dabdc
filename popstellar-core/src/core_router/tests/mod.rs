//! Router test suite


pub mod helpers;
