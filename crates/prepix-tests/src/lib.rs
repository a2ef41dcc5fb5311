//! Integration tests for prepix crates.
//!
//! End-to-end pipelines across decode, the preprocessing operations and
//! encode, plus the cross-cutting properties every operation must hold.
