// LogScope - app/mod.rs
//
// Application layer: orchestration of one analysis session.
// Dependencies: core and platform layers.

pub mod session;
