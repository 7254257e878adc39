//! # Memory Management
//!
//! Pre-allocated pools for short-lived objects.
//!
//! All memory is allocated once at construction. Inserting into a full
//! pool recycles the oldest slot instead of growing.

mod pool;

pub use pool::{PoolHandle, RecyclingPool};
