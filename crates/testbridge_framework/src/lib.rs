//! Reference framework module and sample test modules for the testbridge driver.
//!
//! The driver treats a framework as an opaque [`testbridge_core::Module`] that must define a controller type
//! with a well-known name. This crate provides one such framework (in a current, a legacy and a
//! count-less flavour) plus a small catalog of test modules, for the host CLI and for tests.

#![deny(clippy::unwrap_used)]

pub mod catalog;
pub mod controller;
pub mod filter;
pub mod xml;

pub use catalog::{
    MOCK_TEST_COUNT, framework, framework_module, legacy_framework_module, mock_module, module,
    no_count_framework_module,
};
pub use controller::{CONTROLLER_TYPE, ControllerBuilder};
