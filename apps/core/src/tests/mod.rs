//! Test Module
//!
//! Cross-module test suite for the assistant core.
//!
//! ## Test Categories
//! - `matcher_tests`: matching properties over the embedded corpus and small hand-built ones
//! - `knowledge_tests`: loading corpora from disk and from JSON
//! - `actor_tests`: assistant actor under concurrent load
//! - `chat_tests`: the line-oriented chat loop against a mock assistant
