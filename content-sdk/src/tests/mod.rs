//! Unit tests for the content SDK
//!
//! This module contains tests that exercise several components together.
