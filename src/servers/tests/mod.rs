//! Unit tests for the server registry module.

mod service_tests;
