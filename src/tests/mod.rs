//! Integration tests for the engine as a whole.

mod engine;
