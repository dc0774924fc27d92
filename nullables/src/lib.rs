//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano. The external
//! dependencies of the signing flow (wall clock, camera scan stream, node
//! submission) sit behind traits or plain values; this crate provides
//! test-friendly stand-ins that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the camera or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod scans;
pub mod submitter;

pub use clock::NullClock;
pub use scans::ScriptedScans;
pub use submitter::NullSubmitter;
