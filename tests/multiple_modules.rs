//! End-to-end driver tests against the reference framework and its sample modules.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use testbridge::{BridgeError, CONTROLLER_TYPE, Driver, Settings};
use testbridge_core::{Action, ConstructorInfo, MethodInfo, Module, ParamInfo, Type, TypeInfo, Value};
use testbridge_framework::ControllerBuilder;
use testbridge_framework::catalog::{self, MOCK_TEST_COUNT};
use testbridge_framework::controller::{LOAD_TESTS, RUN_TESTS, STOP_ON_ERROR_SETTING};

const ALL: &str = "<filter />";

fn loaded_twice() -> Driver {
    let framework = catalog::framework_module();
    let mut driver = Driver::new();
    for _ in 0..2 {
        driver
            .load(&framework, catalog::mock_module(), &Settings::new())
            .unwrap();
    }
    driver
}

/// A framework whose controller loads an empty suite and answers every count with `count`.
fn fixed_count_framework(count: Value) -> Module {
    let param = |name: &str, ty: Type| ParamInfo {
        name: name.to_string(),
        ty,
    };
    let controller = TypeInfo::builder(CONTROLLER_TYPE)
        .constructor(ConstructorInfo::new(
            vec![
                param("module", Type::Module),
                param("idPrefix", Type::String),
                param("settings", Type::Map),
            ],
            |_| Ok(Box::new(()) as Box<dyn Any + Send + Sync>),
        ))
        .method(
            MethodInfo::public("LoadTests")
                .returns(Type::String)
                .body(|_, _| Ok(Value::from("<test-suite />"))),
        )
        .method(
            MethodInfo::public("CountTests")
                .param("filter", Type::String)
                .body(move |_, _| Ok(count.clone())),
        )
        .build();
    Module::new("fixed-count.framework", "1.0").with_type(controller)
}

fn count_with(framework: &Module, loads: usize) -> i64 {
    let mut driver = Driver::new();
    for _ in 0..loads {
        driver.load(framework, catalog::mock_module(), &Settings::new()).unwrap();
    }
    driver.count_test_cases(ALL).unwrap()
}

#[test]
fn loading_a_module_twice_yields_two_sessions() {
    let driver = loaded_twice();
    assert_eq!(driver.session_count(), 2);
    assert_eq!(
        driver.count_test_cases(ALL).unwrap(),
        2 * MOCK_TEST_COUNT as i64
    );
    let names: Vec<_> = driver.sessions().iter().map(|s| s.display_name()).collect();
    assert_eq!(names, [catalog::MOCK_MODULE, catalog::MOCK_MODULE]);
}

#[test]
fn load_returns_the_module_fragment() {
    let mut driver = Driver::new();
    let fragment = driver
        .load(&catalog::framework_module(), catalog::mock_module(), &Settings::new())
        .unwrap();
    assert!(fragment.contains(r#"type="Assembly""#));
    assert!(fragment.contains(&format!(r#"testcasecount="{MOCK_TEST_COUNT}""#)));
}

#[test]
fn explore_combines_one_fragment_per_session() {
    let document = loaded_twice().explore(ALL).unwrap();
    assert_eq!(document.len(), 2);
    for fragment in document.fragments() {
        assert!(fragment.contains(r#"runstate="Runnable""#));
        assert!(!fragment.contains("result="));
    }
    let xml = document.to_xml();
    assert!(xml.starts_with("<test-run>"));
    assert!(xml.ends_with("</test-run>"));
}

#[test]
fn run_combines_one_result_per_session() {
    let noop = Action::progress(|_| {});
    let document = loaded_twice().run(Some(&noop), ALL).unwrap();
    assert_eq!(document.len(), 2);
    for fragment in document.fragments() {
        assert!(fragment.contains(r#"runstate="Runnable""#));
        assert!(fragment.contains(r#"passed="3" failed="1" skipped="1""#));
    }
}

#[test]
fn run_reports_progress_through_the_callback() {
    let notices = Arc::new(Mutex::new(Vec::new()));
    let sink = notices.clone();
    let callback = Action::progress(move |text| sink.lock().unwrap().push(text.to_string()));

    let mut driver = Driver::new();
    driver
        .load(&catalog::framework_module(), catalog::mock_module(), &Settings::new())
        .unwrap();
    driver.run(Some(&callback), ALL).unwrap();

    let notices = notices.lock().unwrap();
    assert!(notices[0].starts_with("<start-suite"));
    assert_eq!(notices.iter().filter(|n| n.starts_with("<start-test")).count(), 4);
    assert!(notices.last().unwrap().starts_with("<test-suite"));
}

#[test]
fn filters_are_forwarded_to_every_session() {
    let driver = loaded_twice();
    let filter = "<filter><test>TestBridge.Tests.Assemblies.MockFixture.AddsNumbers</test></filter>";
    assert_eq!(driver.count_test_cases(filter).unwrap(), 2);
}

#[test]
fn operations_before_load_fail_with_not_loaded() {
    let driver = Driver::new();
    assert!(matches!(driver.count_test_cases(ALL), Err(BridgeError::NotLoaded)));
    assert!(matches!(driver.run(None, ALL), Err(BridgeError::NotLoaded)));
    assert!(matches!(driver.explore(ALL), Err(BridgeError::NotLoaded)));
}

#[test]
fn stop_without_sessions_is_a_no_op() {
    let driver = Driver::new();
    driver.stop_run(false).unwrap();
    driver.stop_run(true).unwrap();
}

#[test]
fn stop_when_idle_does_not_fail() {
    loaded_twice().stop_run(false).unwrap();
}

#[test]
fn stop_before_a_run_does_not_cancel_it() {
    let driver = loaded_twice();
    driver.stop_run(false).unwrap();
    driver.stop_run(true).unwrap();

    let document = driver.run(None, ALL).unwrap();
    for fragment in document.fragments() {
        assert!(!fragment.contains("Cancelled"));
        assert!(fragment.contains(r#"passed="3""#));
    }
}

#[test]
fn legacy_framework_is_incompatible_and_appends_nothing() {
    let mut driver = Driver::new();
    let err = driver
        .load(&catalog::legacy_framework_module(), catalog::mock_module(), &Settings::new())
        .unwrap_err();

    assert!(matches!(err, BridgeError::FrameworkIncompatible { .. }));
    assert!(err.is_framework_incompatible());
    assert_eq!(driver.session_count(), 0);
    assert!(matches!(driver.count_test_cases(ALL), Err(BridgeError::NotLoaded)));
}

#[test]
fn framework_without_counting_counts_zero() {
    let framework = catalog::no_count_framework_module();
    let mut driver = Driver::new();
    driver.load(&framework, catalog::mock_module(), &Settings::new()).unwrap();

    assert_eq!(driver.count_test_cases(ALL).unwrap(), 0);
    assert_eq!(driver.explore(ALL).unwrap().len(), 1);
}

#[test]
fn non_integer_counts_contribute_zero() {
    assert_eq!(count_with(&fixed_count_framework(Value::from("seven")), 2), 0);
    assert_eq!(count_with(&fixed_count_framework(Value::Double(7.0)), 1), 0);
}

#[test]
fn integer_counts_of_any_width_are_summed() {
    assert_eq!(count_with(&fixed_count_framework(Value::Int64(7)), 3), 21);
}

#[test]
fn count_totals_saturate_instead_of_overflowing() {
    assert_eq!(count_with(&fixed_count_framework(Value::Int64(i64::MAX)), 2), i64::MAX);
    assert_eq!(count_with(&fixed_count_framework(Value::Int64(i64::MIN)), 2), i64::MIN);
}

#[test]
fn missing_load_operation_still_keeps_the_session() {
    let framework =
        Module::new("partial.framework", "0.1").with_type(ControllerBuilder::new().without(LOAD_TESTS).build());
    let mut driver = Driver::new();
    let err = driver
        .load(&framework, catalog::mock_module(), &Settings::new())
        .unwrap_err();

    assert!(matches!(err, BridgeError::OperationUnavailable { .. }));
    assert_eq!(driver.session_count(), 1);
}

#[test]
fn id_prefixes_every_test_id() {
    let mut driver = Driver::with_id("7");
    let fragment = driver
        .load(&catalog::framework_module(), catalog::mock_module(), &Settings::new())
        .unwrap();
    assert!(fragment.contains(r#"id="7-1000""#));

    let explored = driver.explore(ALL).unwrap();
    assert!(explored.fragments()[0].contains(r#"id="7-1001""#));
}

#[test]
fn settings_reach_the_controller() {
    let mut settings: Settings = BTreeMap::new();
    settings.insert(STOP_ON_ERROR_SETTING.to_string(), Value::Bool(true));

    let mut driver = Driver::new();
    driver
        .load(&catalog::framework_module(), catalog::mock_module(), &settings)
        .unwrap();
    let document = driver.run(None, ALL).unwrap();
    assert!(document.fragments()[0].contains(r#"label="Cancelled""#));
}

#[test]
fn run_async_collects_every_session_when_waited() {
    let driver = loaded_twice();
    let handle = driver.run_async(None, ALL).unwrap();
    assert_eq!(handle.runs().len(), 2);

    let document = handle.wait().unwrap();
    assert_eq!(document.len(), 2);
    assert!(document.fragments()[1].contains(r#"passed="3""#));
}

#[test]
fn run_async_reports_an_unresolvable_run_before_starting_any_worker() {
    let notices = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = notices.clone();
    let callback = Action::progress(move |text| sink.lock().unwrap().push(text.to_string()));

    let mut driver = Driver::new();
    driver
        .load(&catalog::framework_module(), catalog::mock_module(), &Settings::new())
        .unwrap();
    let no_run = Module::new("no-run.framework", "0.1").with_type(ControllerBuilder::new().without(RUN_TESTS).build());
    driver.load(&no_run, catalog::mock_module(), &Settings::new()).unwrap();

    let result = driver.run_async(Some(callback), ALL);
    assert!(matches!(
        result,
        Err(BridgeError::OperationUnavailable { ref operation, .. }) if operation == RUN_TESTS
    ));

    // A worker for the first session would have reported its suite start by now.
    thread::sleep(Duration::from_millis(50));
    assert!(notices.lock().unwrap().is_empty());
}

#[test]
fn stop_run_cancels_an_async_run() {
    let mut driver = Driver::new();
    driver
        .load(&catalog::framework_module(), catalog::slow_module(), &Settings::new())
        .unwrap();

    let (tx, rx) = mpsc::channel::<String>();
    let callback = Action::progress(move |text| {
        let _ = tx.send(text.to_string());
    });
    let handle = driver.run_async(Some(callback), ALL).unwrap();

    while let Ok(notice) = rx.recv() {
        if notice.starts_with("<start-test") {
            break;
        }
    }
    driver.stop_run(false).unwrap();

    let document = handle.wait().unwrap();
    assert!(document.fragments()[0].contains(r#"label="Cancelled""#));
}

proptest::proptest! {
    #![proptest_config(proptest::prelude::ProptestConfig::with_cases(16))]

    #[test]
    fn every_load_adds_one_session_and_one_fragment(loads in 1usize..5) {
        let framework = catalog::framework_module();
        let mut driver = Driver::new();
        for _ in 0..loads {
            driver.load(&framework, catalog::mock_module(), &Settings::new()).unwrap();
        }

        proptest::prop_assert_eq!(driver.session_count(), loads);
        proptest::prop_assert_eq!(driver.count_test_cases(ALL).unwrap(), (loads * MOCK_TEST_COUNT) as i64);
        proptest::prop_assert_eq!(driver.explore(ALL).unwrap().len(), loads);
    }
}
