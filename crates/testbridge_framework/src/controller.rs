//! The framework controller: the type the driver discovers by name and drives through dynamic dispatch.
//!
//! ## Operations
//!
//! | Operation      | Parameters                      | Returns           |
//! |----------------|---------------------------------|-------------------|
//! | `LoadTests`    | none                            | suite fragment    |
//! | `CountTests`   | `filter: String`                | `Int32`           |
//! | `ExploreTests` | `filter: String`                | suite fragment    |
//! | `RunTests`     | `callback: Action<String>, filter: String` | result fragment |
//! | `StopRun`      | `force: Boolean`                | `Void`            |
//!
//! Tests are public static methods tagged `Test` on the types of the bound test module. Stop requests are
//! honoured between test cases. Each `RunTests` clears any pending request when it starts, so a `StopRun`
//! that arrives before the run begins (including one racing a freshly dispatched worker) is discarded.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use testbridge_core::{
    ClassType, ConstructorInfo, Fault, Instance, MethodInfo, Module, ParamInfo, PrimitiveKind, Type, TypeInfo,
    Value,
};

use crate::filter::TestFilter;
use crate::xml::Element;

/// Fully-qualified name of the controller type.
pub const CONTROLLER_TYPE: &str = "TestBridge.Framework.Api.FrameworkController";
const CONTROLLER_INTERFACE: &str = "TestBridge.Framework.Api.ITestController";

pub const LOAD_TESTS: &str = "LoadTests";
pub const COUNT_TESTS: &str = "CountTests";
pub const EXPLORE_TESTS: &str = "ExploreTests";
pub const RUN_TESTS: &str = "RunTests";
pub const STOP_RUN: &str = "StopRun";

/// Attribute marking a test method.
pub const TEST_ATTRIBUTE: &str = "Test";
/// Attribute marking a test that is reported but never executed.
pub const IGNORE_ATTRIBUTE: &str = "Ignore";
/// Setting key: stop the run after the first failing test.
pub const STOP_ON_ERROR_SETTING: &str = "StopOnError";

const SUITE_ID: u32 = 1000;

const STOP_NONE: u8 = 0;
const STOP_COOPERATIVE: u8 = 1;
const STOP_FORCED: u8 = 2;

struct ControllerState {
    module: Arc<Module>,
    id_prefix: String,
    settings: BTreeMap<String, Value>,
    stop: AtomicU8,
}

struct TestCase {
    id: String,
    name: String,
    full_name: String,
    method: Arc<MethodInfo>,
    ignored: bool,
}

impl ControllerState {
    fn from_args(args: &[Value]) -> Result<Self, Fault> {
        let module = args
            .first()
            .and_then(Value::as_module)
            .cloned()
            .ok_or_else(|| Fault::invalid_argument("a test module is required"))?;
        let id_prefix = args.get(1).and_then(Value::as_str).unwrap_or_default().to_string();
        let settings = args.get(2).and_then(Value::as_map).cloned().unwrap_or_default();

        Ok(Self {
            module,
            id_prefix,
            settings,
            stop: AtomicU8::new(STOP_NONE),
        })
    }

    fn suite_id(&self) -> String {
        format!("{}{}", self.id_prefix, SUITE_ID)
    }

    fn stop_on_error(&self) -> bool {
        self.settings
            .get(STOP_ON_ERROR_SETTING)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Every test in the module, ids assigned in discovery order.
    fn discover(&self) -> Vec<TestCase> {
        let mut next_id = SUITE_ID + 1;
        let mut cases = Vec::new();
        for ty in self.module.types() {
            for method in ty.declared_methods() {
                if !(method.is_public() && method.is_static && method.has_attribute(TEST_ATTRIBUTE)) {
                    continue;
                }
                cases.push(TestCase {
                    id: format!("{}{}", self.id_prefix, next_id),
                    name: method.name.clone(),
                    full_name: format!("{}.{}", ty.name, method.name),
                    method: method.clone(),
                    ignored: method.has_attribute(IGNORE_ATTRIBUTE),
                });
                next_id += 1;
            }
        }
        cases
    }

    fn select(&self, filter: &str) -> Vec<TestCase> {
        let filter = TestFilter::parse(filter);
        self.discover()
            .into_iter()
            .filter(|t| filter.matches(&t.full_name))
            .collect()
    }

    fn suite(&self, test_count: usize) -> Element {
        Element::new("test-suite")
            .attr("type", "Assembly")
            .attr("id", self.suite_id())
            .attr("name", &self.module.name)
            .attr("fullname", self.module.full_name())
            .attr("runstate", "Runnable")
            .attr("testcasecount", test_count)
    }

    fn load(&self) -> String {
        self.suite(self.discover().len()).render()
    }

    fn explore(&self, filter: &str) -> String {
        let selected = self.select(filter);
        let mut suite = self.suite(selected.len());
        for case in &selected {
            suite = suite.child(case_element(case).render());
        }
        suite.render()
    }

    fn run(&self, callback: Option<&testbridge_core::Action>, filter: &str) -> String {
        let notify = |text: String| {
            if let Some(callback) = callback {
                callback.invoke(&[Value::from(text)]);
            }
        };

        self.stop.store(STOP_NONE, Ordering::SeqCst);
        let selected = self.select(filter);
        notify(
            Element::new("start-suite")
                .attr("id", self.suite_id())
                .attr("name", &self.module.name)
                .attr("fullname", self.module.full_name())
                .render(),
        );

        let (mut passed, mut failed, mut skipped) = (0usize, 0usize, 0usize);
        let mut cancelled = false;
        let mut children = Vec::with_capacity(selected.len());

        for case in &selected {
            if self.stop.load(Ordering::SeqCst) != STOP_NONE {
                cancelled = true;
                break;
            }

            let element = if case.ignored {
                skipped += 1;
                case_element(case).attr("result", "Skipped").attr("label", "Ignored")
            } else {
                notify(
                    Element::new("start-test")
                        .attr("id", &case.id)
                        .attr("name", &case.name)
                        .attr("fullname", &case.full_name)
                        .render(),
                );
                match case.method.invoke(None, &[]) {
                    Ok(_) => {
                        passed += 1;
                        case_element(case).attr("result", "Passed")
                    }
                    Err(fault) => {
                        failed += 1;
                        if self.stop_on_error() {
                            self.stop.store(STOP_COOPERATIVE, Ordering::SeqCst);
                        }
                        case_element(case)
                            .attr("result", "Failed")
                            .child(Element::new("failure").attr("message", &fault).render())
                    }
                }
            };

            let rendered = element.render();
            notify(rendered.clone());
            children.push(rendered);
        }

        let result = if cancelled || failed > 0 { "Failed" } else { "Passed" };
        let mut suite = self
            .suite(selected.len())
            .attr("result", result)
            .attr("total", passed + failed + skipped)
            .attr("passed", passed)
            .attr("failed", failed)
            .attr("skipped", skipped);
        if cancelled {
            suite = suite.attr("label", "Cancelled");
        }
        for child in children {
            suite = suite.child(child);
        }

        let fragment = suite.render();
        notify(fragment.clone());
        fragment
    }

    fn request_stop(&self, force: bool) {
        let level = if force { STOP_FORCED } else { STOP_COOPERATIVE };
        let previous = self.stop.fetch_max(level, Ordering::SeqCst);
        tracing::debug!(module = %self.module.name, force, previous, "stop requested");
    }
}

fn case_element(case: &TestCase) -> Element {
    Element::new("test-case")
        .attr("id", &case.id)
        .attr("name", &case.name)
        .attr("fullname", &case.full_name)
        .attr("runstate", if case.ignored { "Ignored" } else { "Runnable" })
}

fn state(this: Option<&Instance>) -> Result<&ControllerState, Fault> {
    this.and_then(|i| i.state::<ControllerState>())
        .ok_or_else(|| Fault::invalid_operation("controller operations require a controller instance"))
}

fn string_arg(args: &[Value], index: usize) -> Result<&str, Fault> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s),
        Some(Value::Null) => Ok(""),
        _ => Err(Fault::invalid_argument(format!("argument {index} must be a string"))),
    }
}

/// Which operations a built controller exposes.
#[derive(Debug, Clone, Default)]
pub struct ControllerBuilder {
    omitted: Vec<&'static str>,
}

impl ControllerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave out one of the operations (emulates an older framework).
    pub fn without(mut self, operation: &'static str) -> Self {
        self.omitted.push(operation);
        self
    }

    pub fn build(self) -> Arc<TypeInfo> {
        let mut builder = TypeInfo::builder(CONTROLLER_TYPE)
            .implements(Arc::new(ClassType::interface(CONTROLLER_INTERFACE)))
            .constructor(ConstructorInfo::new(
                vec![
                    ParamInfo {
                        name: "assembly".into(),
                        ty: Type::Module,
                    },
                    ParamInfo {
                        name: "idPrefix".into(),
                        ty: Type::String,
                    },
                    ParamInfo {
                        name: "settings".into(),
                        ty: Type::Map,
                    },
                ],
                |args| Ok(Box::new(ControllerState::from_args(args)?) as Box<dyn Any + Send + Sync>),
            ));

        let operations = [
            MethodInfo::public(LOAD_TESTS)
                .returns(Type::String)
                .body(|this, _| Ok(Value::from(state(this)?.load()))),
            MethodInfo::public(COUNT_TESTS)
                .param("filter", Type::String)
                .returns(Type::Primitive(PrimitiveKind::Int32))
                .body(|this, args| {
                    let count = state(this)?.select(string_arg(args, 0)?).len();
                    let count = i32::try_from(count).map_err(|_| Fault::invalid_operation("too many tests"))?;
                    Ok(Value::Int32(count))
                }),
            MethodInfo::public(EXPLORE_TESTS)
                .param("filter", Type::String)
                .returns(Type::String)
                .body(|this, args| Ok(Value::from(state(this)?.explore(string_arg(args, 0)?)))),
            MethodInfo::public(RUN_TESTS)
                .param("callback", Type::string_action())
                .param("filter", Type::String)
                .returns(Type::String)
                .body(|this, args| {
                    let callback = args.first().and_then(Value::as_action);
                    Ok(Value::from(state(this)?.run(callback, string_arg(args, 1)?)))
                }),
            MethodInfo::public(STOP_RUN)
                .param("force", Type::Primitive(PrimitiveKind::Boolean))
                .body(|this, args| {
                    let force = args.first().and_then(Value::as_bool).unwrap_or(false);
                    state(this)?.request_stop(force);
                    Ok(Value::Null)
                }),
        ];

        for op in operations {
            if !self.omitted.iter().any(|omitted| *omitted == op.name) {
                builder = builder.method(op);
            }
        }
        builder.build()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog;

    fn controller() -> (Arc<TypeInfo>, Arc<Instance>) {
        let ty = ControllerBuilder::new().build();
        let args = [
            Value::Module(catalog::mock_module()),
            Value::from("0-"),
            Value::from(BTreeMap::new()),
        ];
        let instance = ty.constructors()[0].invoke(&ty, &args).unwrap();
        (ty, instance)
    }

    #[test]
    fn load_reports_assembly_suite() {
        let (ty, instance) = controller();
        let load = ty.find_method_exact(LOAD_TESTS, &[]).unwrap();
        let fragment = load.invoke(Some(&instance), &[]).unwrap();
        let xml = fragment.as_str().unwrap();

        assert!(xml.starts_with(r#"<test-suite type="Assembly" id="0-1000""#));
        assert!(xml.contains(r#"runstate="Runnable""#));
        assert!(xml.contains(&format!(r#"testcasecount="{}""#, catalog::MOCK_TEST_COUNT)));
    }

    #[test]
    fn run_reports_each_case_and_counts() {
        let (ty, instance) = controller();
        let run = ty
            .find_method_exact(RUN_TESTS, &[Type::string_action(), Type::String])
            .unwrap();
        let fragment = run.invoke(Some(&instance), &[Value::Null, Value::from("<filter />")]).unwrap();
        let xml = fragment.as_str().unwrap();

        assert_eq!(xml.matches("<test-case ").count(), catalog::MOCK_TEST_COUNT);
        assert!(xml.contains(r#"passed="3" failed="1" skipped="1""#));
        assert!(xml.contains(r#"result="Failed""#));
    }

    #[test]
    fn stop_issued_before_a_run_is_discarded_when_it_starts() {
        let (ty, instance) = controller();
        let stop = ty
            .find_method_exact(STOP_RUN, &[Type::Primitive(PrimitiveKind::Boolean)])
            .unwrap();
        stop.invoke(Some(&instance), &[Value::Bool(true)]).unwrap();

        let run = ty
            .find_method_exact(RUN_TESTS, &[Type::string_action(), Type::String])
            .unwrap();
        let fragment = run.invoke(Some(&instance), &[Value::Null, Value::from("<filter />")]).unwrap();
        assert!(!fragment.as_str().unwrap().contains("Cancelled"));
    }

    #[test]
    fn stop_on_error_setting_cancels_after_first_failure() {
        let ty = ControllerBuilder::new().build();
        let mut settings = BTreeMap::new();
        settings.insert(STOP_ON_ERROR_SETTING.to_string(), Value::Bool(true));
        let args = [
            Value::Module(catalog::mock_module()),
            Value::from(""),
            Value::from(settings),
        ];
        let instance = ty.constructors()[0].invoke(&ty, &args).unwrap();
        let run = ty
            .find_method_exact(RUN_TESTS, &[Type::string_action(), Type::String])
            .unwrap();
        let fragment = run.invoke(Some(&instance), &[Value::Null, Value::from("<filter />")]).unwrap();

        assert!(fragment.as_str().unwrap().contains(r#"label="Cancelled""#));
    }

    #[test]
    fn omitted_operations_are_not_published() {
        let ty = ControllerBuilder::new().without(COUNT_TESTS).build();
        assert!(ty.methods_named(COUNT_TESTS).is_empty());
        assert_eq!(ty.methods_named(EXPLORE_TESTS).len(), 1);
    }
}
