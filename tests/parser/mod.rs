//! Selector parser integration tests.
