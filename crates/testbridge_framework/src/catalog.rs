//! Named framework modules and sample test modules.
//!
//! Hosts (the CLI, integration tests) pick modules from here by name. The bridge never depends on this
//! catalog; it only sees the [`Module`] values handed to it.

use std::sync::Arc;
use std::time::Duration;

use testbridge_core::{Fault, MethodInfo, Module, TypeInfo, Value};

use crate::controller::{COUNT_TESTS, ControllerBuilder, IGNORE_ATTRIBUTE, TEST_ATTRIBUTE};

pub const FRAMEWORK_NAME: &str = "testbridge.framework";
/// Version published by the current framework module.
pub const FRAMEWORK_VERSION: &str = "3.4.0";
const LEGACY_VERSION: &str = "2.6.4";
const NO_COUNT_VERSION: &str = "3.0.0";

pub const MOCK_MODULE: &str = "mock-assembly";
pub const EMPTY_MODULE: &str = "empty-assembly";
pub const SLOW_MODULE: &str = "slow-assembly";

/// Number of tests in the mock module (3 pass, 1 fails, 1 is ignored).
pub const MOCK_TEST_COUNT: usize = 5;
/// Number of tests in the slow module.
pub const SLOW_TEST_COUNT: usize = 20;

/// Framework names accepted by [`framework`].
pub const FRAMEWORKS: [&str; 3] = ["current", "legacy", "no-count"];
/// Test module names accepted by [`module`].
pub const MODULES: &[&str] = &[MOCK_MODULE, EMPTY_MODULE, SLOW_MODULE];

/// The current framework module, exposing the full controller.
pub fn framework_module() -> Module {
    Module::new(FRAMEWORK_NAME, FRAMEWORK_VERSION).with_type(ControllerBuilder::new().build())
}

/// An unsupported framework version: it defines types, but no controller.
pub fn legacy_framework_module() -> Module {
    Module::new(FRAMEWORK_NAME, LEGACY_VERSION)
        .with_type(TypeInfo::builder("TestBridge.Framework.TestFixtureAttribute").build())
        .with_type(TypeInfo::builder("TestBridge.Framework.Assert").build())
}

/// A framework whose controller predates test counting.
pub fn no_count_framework_module() -> Module {
    Module::new(FRAMEWORK_NAME, NO_COUNT_VERSION).with_type(ControllerBuilder::new().without(COUNT_TESTS).build())
}

pub fn framework(name: &str) -> Option<Module> {
    match name {
        "current" => Some(framework_module()),
        "legacy" => Some(legacy_framework_module()),
        "no-count" => Some(no_count_framework_module()),
        _ => None,
    }
}

pub fn module(name: &str) -> Option<Arc<Module>> {
    match name {
        MOCK_MODULE => Some(mock_module()),
        EMPTY_MODULE => Some(empty_module()),
        SLOW_MODULE => Some(slow_module()),
        _ => None,
    }
}

fn test_method(name: &str, body: impl Fn() -> Result<(), Fault> + Send + Sync + 'static) -> MethodInfo {
    MethodInfo::public(name)
        .static_method()
        .attribute(TEST_ATTRIBUTE)
        .body(move |_, _| body().map(|()| Value::Null))
}

fn check(condition: bool, message: &str) -> Result<(), Fault> {
    if condition { Ok(()) } else { Err(Fault::assertion(message)) }
}

/// Five tests across two fixtures: three pass, one fails, one is ignored.
pub fn mock_module() -> Arc<Module> {
    let fixture = TypeInfo::builder("TestBridge.Tests.Assemblies.MockFixture")
        .method(test_method("AddsNumbers", || check(2 + 2 == 4, "Expected: 4")))
        .method(test_method("ConcatenatesStrings", || {
            check(["mock", "assembly"].join("-") == MOCK_MODULE, "Expected: mock-assembly")
        }))
        .method(test_method("FailingTest", || {
            let answer = 2 + 2;
            check(answer == 5, &format!("Expected: 5 But was: {answer}"))
        }))
        .method(test_method("IgnoredTest", || Err(Fault::assertion("ignored tests never run"))).attribute(IGNORE_ATTRIBUTE))
        .method(MethodInfo::public("Helper").static_method())
        .build();

    let other = TypeInfo::builder("TestBridge.Tests.Assemblies.OtherFixture")
        .method(test_method("ParsesInput", || {
            check("42".parse::<i32>().is_ok_and(|n| n == 42), "Expected: 42")
        }))
        .build();

    Arc::new(
        Module::new(MOCK_MODULE, "1.0.0")
            .with_type(fixture)
            .with_type(other),
    )
}

pub fn empty_module() -> Arc<Module> {
    Arc::new(
        Module::new(EMPTY_MODULE, "1.0.0").with_type(TypeInfo::builder("TestBridge.Tests.Assemblies.NoTests").build()),
    )
}

/// Tests that each take a little while, so a run can be stopped part-way.
pub fn slow_module() -> Arc<Module> {
    let mut fixture = TypeInfo::builder("TestBridge.Tests.Assemblies.SlowFixture");
    for i in 0..SLOW_TEST_COUNT {
        fixture = fixture.method(test_method(&format!("Slow{i:02}"), || {
            std::thread::sleep(Duration::from_millis(25));
            Ok(())
        }));
    }
    Arc::new(Module::new(SLOW_MODULE, "1.0.0").with_type(fixture.build()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::CONTROLLER_TYPE;

    #[test]
    fn every_catalog_name_resolves() {
        for name in FRAMEWORKS {
            assert!(framework(name).is_some(), "framework {name} missing");
        }
        for name in MODULES {
            assert!(module(name).is_some(), "module {name} missing");
        }
        assert!(framework("unknown").is_none());
        assert!(module("unknown").is_none());
    }

    #[test]
    fn only_the_legacy_framework_lacks_a_controller() {
        assert!(framework_module().find_type(CONTROLLER_TYPE).is_some());
        assert!(no_count_framework_module().find_type(CONTROLLER_TYPE).is_some());
        assert!(legacy_framework_module().find_type(CONTROLLER_TYPE).is_none());
    }

    #[test]
    fn mock_module_declares_the_advertised_number_of_tests() {
        let count: usize = mock_module()
            .types()
            .iter()
            .map(|t| t.declared_methods().iter().filter(|m| m.has_attribute(TEST_ATTRIBUTE)).count())
            .sum();
        assert_eq!(count, MOCK_TEST_COUNT);
    }
}
