//! IDE layer integration tests.
