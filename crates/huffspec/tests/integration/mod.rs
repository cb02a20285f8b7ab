//! Integration tests for the speculative decoding pipeline.
//!
//! These tests drive the full path from raw symbols through code
//! construction, encoding and speculative decoding, and check the result
//! against a plain sequential decode of the same bitstream.

mod persistence;
mod scenarios;
mod speculation;
