//! Message registry test suite


pub mod helpers;
