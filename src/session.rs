//! One test module bound to one dynamically created controller.
//!
//! All name- and shape-directed lookup against the controller happens here. The driver only asks for
//! operations by name and hands over [`Value`] arguments.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use testbridge_core::{Compatibility, Instance, MethodInfo, Module, Type, Value};

use crate::errors::{BridgeError, BridgeResult};

/// Fully-qualified name of the type every supported framework module defines.
pub const CONTROLLER_TYPE: &str = "TestBridge.Framework.Api.FrameworkController";

/// Controller settings, passed through to the constructor untouched.
pub type Settings = BTreeMap<String, Value>;

#[derive(Debug, Clone)]
pub struct AssemblySession {
    module: Arc<Module>,
    controller: Arc<Instance>,
    compat: Compatibility<'static>,
}

impl AssemblySession {
    /// Instantiate the controller of `framework` for `module`.
    ///
    /// ## Errors
    /// - [`BridgeError::FrameworkIncompatible`] if `framework` defines no controller type, or the controller
    ///   has no constructor accepting `(module, id_prefix, settings)`.
    /// - [`BridgeError::Construction`] if the constructor raises a fault.
    pub fn create(framework: &Module, module: Arc<Module>, id_prefix: &str, settings: &Settings) -> BridgeResult<Self> {
        let Some(controller_type) = framework.find_type(CONTROLLER_TYPE) else {
            tracing::error!(framework = %framework.full_name(), "{CONTROLLER_TYPE} type not found");
            return Err(BridgeError::FrameworkIncompatible {
                framework: framework.full_name(),
                detail: format!("{CONTROLLER_TYPE} type not found"),
            });
        };

        let compat = Compatibility::standard();
        let args = [
            Value::Module(module.clone()),
            Value::from(id_prefix),
            Value::from(settings.clone()),
        ];
        let arg_types: Vec<Type> = args.iter().map(Value::runtime_type).collect();
        let signatures: Vec<Vec<Type>> = controller_type
            .constructors()
            .iter()
            .map(|c| c.param_types())
            .collect();
        let candidates: Vec<&[Type]> = signatures.iter().map(Vec::as_slice).collect();

        let Some(index) = compat.select_overload(&candidates, &arg_types) else {
            return Err(BridgeError::FrameworkIncompatible {
                framework: framework.full_name(),
                detail: format!("{CONTROLLER_TYPE} has no constructor accepting (Module, String, Map)"),
            });
        };

        let controller = controller_type.constructors()[index]
            .invoke(controller_type, &args)
            .map_err(|source| BridgeError::Construction {
                type_name: controller_type.name.clone(),
                source,
            })?;

        Ok(Self {
            module,
            controller,
            compat,
        })
    }

    pub fn display_name(&self) -> &str {
        &self.module.name
    }

    pub fn module(&self) -> &Arc<Module> {
        &self.module
    }

    fn unavailable(&self, operation: &str) -> BridgeError {
        BridgeError::OperationUnavailable {
            operation: operation.to_string(),
            controller: self.controller.type_info().name.clone(),
        }
    }

    /// Find the public instance operation `name` that accepts `args`.
    ///
    /// Among several compatible overloads the most specific one wins; see
    /// [`Compatibility::select_overload`].
    pub fn resolve(&self, name: &str, args: &[Value]) -> BridgeResult<BoundOperation> {
        let methods = self.controller.type_info().methods_named(name);
        let signatures: Vec<Vec<Type>> = methods.iter().map(|m| m.param_types()).collect();
        let candidates: Vec<&[Type]> = signatures.iter().map(Vec::as_slice).collect();
        let arg_types: Vec<Type> = args.iter().map(Value::runtime_type).collect();

        let index = self
            .compat
            .select_overload(&candidates, &arg_types)
            .ok_or_else(|| self.unavailable(name))?;
        Ok(self.bind(methods[index].clone()))
    }

    /// Find the public instance operation `name` whose parameter types are exactly `types`.
    pub fn resolve_exact(&self, name: &str, types: &[Type]) -> BridgeResult<BoundOperation> {
        self.controller
            .type_info()
            .find_method_exact(name, types)
            .map(|method| self.bind(method))
            .ok_or_else(|| self.unavailable(name))
    }

    /// [`Self::resolve_exact`], then check that `args` fit `types`.
    pub fn bind_exact(&self, name: &str, types: &[Type], args: &[Value]) -> BridgeResult<BoundOperation> {
        let op = self.resolve_exact(name, types)?;
        let arg_types: Vec<Type> = args.iter().map(Value::runtime_type).collect();
        if !self.compat.parameters_match(types, &arg_types) {
            return Err(BridgeError::ArgumentMismatch {
                operation: name.to_string(),
                expected: types.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
            });
        }
        Ok(op)
    }

    pub fn invoke(&self, name: &str, args: &[Value]) -> BridgeResult<Value> {
        self.resolve(name, args)?.call(args)
    }

    pub fn invoke_exact(&self, name: &str, types: &[Type], args: &[Value]) -> BridgeResult<Value> {
        self.bind_exact(name, types, args)?.call(args)
    }

    fn bind(&self, method: Arc<MethodInfo>) -> BoundOperation {
        BoundOperation {
            controller: self.controller.clone(),
            method,
        }
    }
}

/// A resolved controller operation, ready to call (possibly from another thread).
#[derive(Clone)]
pub struct BoundOperation {
    controller: Arc<Instance>,
    method: Arc<MethodInfo>,
}

impl BoundOperation {
    pub fn name(&self) -> &str {
        &self.method.name
    }

    pub fn call(&self, args: &[Value]) -> BridgeResult<Value> {
        self.method
            .invoke(Some(&self.controller), args)
            .map_err(|source| BridgeError::Invocation {
                operation: self.method.name.clone(),
                source,
            })
    }
}

impl fmt::Debug for BoundOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundOperation")
            .field("controller", &self.controller.type_info().name)
            .field("method", &self.method.name)
            .finish()
    }
}
