//! Narrow dynamic object model: modules expose types, types expose constructors and methods, methods are
//! invoked on instances with dynamically typed arguments.
//!
//! This is the only place dynamic lookup happens. Callers find a type by fully-qualified name
//! ([`Module::find_type`]), enumerate candidate methods ([`TypeInfo::public_instance_methods`],
//! [`TypeInfo::find_method_exact`]) and invoke a chosen [`MethodInfo`]. Choosing among overloads is left to
//! [`crate::compat::Compatibility::select_overload`].

mod value;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub use value::{Action, Value};

use crate::errors::Fault;
use crate::types::{ClassType, Type};

/// Body of a method: receives the instance (`None` for static methods) and the arguments.
pub type MethodBody = Arc<dyn Fn(Option<&Instance>, &[Value]) -> Result<Value, Fault> + Send + Sync>;

/// Body of a constructor: builds the instance state from the arguments.
pub type ConstructorBody = Arc<dyn Fn(&[Value]) -> Result<Box<dyn Any + Send + Sync>, Fault> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: String,
    pub ty: Type,
}

/// A method declared on a [`TypeInfo`].
#[derive(Clone)]
pub struct MethodInfo {
    pub name: String,
    pub params: Vec<ParamInfo>,
    pub returns: Type,
    pub visibility: Visibility,
    pub is_static: bool,
    pub attributes: Vec<String>,
    body: MethodBody,
}

impl MethodInfo {
    /// A public instance method returning `Void` whose body does nothing; refine with the builder methods.
    pub fn public(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: Type::Void,
            visibility: Visibility::Public,
            is_static: false,
            attributes: Vec::new(),
            body: Arc::new(|_, _| Ok(Value::Null)),
        }
    }

    pub fn param(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.params.push(ParamInfo { name: name.into(), ty });
        self
    }

    pub fn returns(mut self, ty: Type) -> Self {
        self.returns = ty;
        self
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn attribute(mut self, tag: impl Into<String>) -> Self {
        self.attributes.push(tag.into());
        self
    }

    pub fn body(
        mut self,
        body: impl Fn(Option<&Instance>, &[Value]) -> Result<Value, Fault> + Send + Sync + 'static,
    ) -> Self {
        self.body = Arc::new(body);
        self
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn has_attribute(&self, tag: &str) -> bool {
        self.attributes.iter().any(|a| a == tag)
    }

    pub fn param_types(&self) -> Vec<Type> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }

    /// Whether the declared parameter types equal `types` exactly.
    pub fn has_signature(&self, types: &[Type]) -> bool {
        self.params.len() == types.len() && self.params.iter().zip(types).all(|(p, t)| p.ty == *t)
    }

    /// Invoke the body. Argument count is checked; argument types are the caller's responsibility.
    pub fn invoke(&self, target: Option<&Instance>, args: &[Value]) -> Result<Value, Fault> {
        if args.len() != self.params.len() {
            return Err(Fault::invalid_argument(format!(
                "{} expects {} argument(s), got {}",
                self.name,
                self.params.len(),
                args.len()
            )));
        }
        (self.body)(target, args)
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .field("visibility", &self.visibility)
            .field("is_static", &self.is_static)
            .finish_non_exhaustive()
    }
}

/// A public constructor declared on a [`TypeInfo`].
#[derive(Clone)]
pub struct ConstructorInfo {
    pub params: Vec<ParamInfo>,
    body: ConstructorBody,
}

impl ConstructorInfo {
    pub fn new(
        params: Vec<ParamInfo>,
        body: impl Fn(&[Value]) -> Result<Box<dyn Any + Send + Sync>, Fault> + Send + Sync + 'static,
    ) -> Self {
        Self {
            params,
            body: Arc::new(body),
        }
    }

    pub fn param_types(&self) -> Vec<Type> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }

    /// Run the constructor and wrap the resulting state into an instance of `ty`.
    pub fn invoke(&self, ty: &Arc<TypeInfo>, args: &[Value]) -> Result<Arc<Instance>, Fault> {
        if args.len() != self.params.len() {
            return Err(Fault::invalid_argument(format!(
                "constructor of {} expects {} argument(s), got {}",
                ty.name,
                self.params.len(),
                args.len()
            )));
        }
        let state = (self.body)(args)?;
        Ok(Arc::new(Instance {
            type_info: ty.clone(),
            state,
        }))
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Runtime description of a type defined in a [`Module`].
#[derive(Debug)]
pub struct TypeInfo {
    pub name: String,
    descriptor: Arc<ClassType>,
    base: Option<Arc<TypeInfo>>,
    constructors: Vec<ConstructorInfo>,
    methods: Vec<Arc<MethodInfo>>,
}

impl TypeInfo {
    pub fn builder(name: impl Into<String>) -> TypeInfoBuilder {
        TypeInfoBuilder {
            descriptor: ClassType::class(name),
            base: None,
            constructors: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn descriptor(&self) -> &Arc<ClassType> {
        &self.descriptor
    }

    pub fn base(&self) -> Option<&Arc<TypeInfo>> {
        self.base.as_ref()
    }

    pub fn constructors(&self) -> &[ConstructorInfo] {
        &self.constructors
    }

    pub fn declared_methods(&self) -> &[Arc<MethodInfo>] {
        &self.methods
    }

    /// Public non-static methods, declared ones first, then inherited ones that are not overridden.
    pub fn public_instance_methods(&self) -> Vec<Arc<MethodInfo>> {
        let mut methods: Vec<Arc<MethodInfo>> = self
            .methods
            .iter()
            .filter(|m| m.is_public() && !m.is_static)
            .cloned()
            .collect();

        if let Some(base) = &self.base {
            for inherited in base.public_instance_methods() {
                let overridden = methods
                    .iter()
                    .any(|m| m.name == inherited.name && m.has_signature(&inherited.param_types()));
                if !overridden {
                    methods.push(inherited);
                }
            }
        }
        methods
    }

    /// Public instance methods called `name`, in declaration order.
    pub fn methods_named(&self, name: &str) -> Vec<Arc<MethodInfo>> {
        self.public_instance_methods()
            .into_iter()
            .filter(|m| m.name == name)
            .collect()
    }

    /// The public instance method called `name` whose parameter types are exactly `types`.
    pub fn find_method_exact(&self, name: &str, types: &[Type]) -> Option<Arc<MethodInfo>> {
        self.public_instance_methods()
            .into_iter()
            .find(|m| m.name == name && m.has_signature(types))
    }
}

/// Builder for [`TypeInfo`].
pub struct TypeInfoBuilder {
    descriptor: ClassType,
    base: Option<Arc<TypeInfo>>,
    constructors: Vec<ConstructorInfo>,
    methods: Vec<Arc<MethodInfo>>,
}

impl TypeInfoBuilder {
    pub fn base(mut self, base: Arc<TypeInfo>) -> Self {
        self.descriptor = self.descriptor.with_base(base.descriptor.clone());
        self.base = Some(base);
        self
    }

    pub fn implements(mut self, interface: Arc<ClassType>) -> Self {
        self.descriptor = self.descriptor.implementing(interface);
        self
    }

    pub fn constructor(mut self, ctor: ConstructorInfo) -> Self {
        self.constructors.push(ctor);
        self
    }

    pub fn method(mut self, method: MethodInfo) -> Self {
        self.methods.push(Arc::new(method));
        self
    }

    pub fn build(self) -> Arc<TypeInfo> {
        Arc::new(TypeInfo {
            name: self.descriptor.name.clone(),
            descriptor: Arc::new(self.descriptor),
            base: self.base,
            constructors: self.constructors,
            methods: self.methods,
        })
    }
}

/// A live object created from a [`TypeInfo`].
pub struct Instance {
    type_info: Arc<TypeInfo>,
    state: Box<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn type_info(&self) -> &Arc<TypeInfo> {
        &self.type_info
    }

    /// Borrow the instance state as `T`.
    pub fn state<T: Any>(&self) -> Option<&T> {
        self.state.downcast_ref::<T>()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.type_info.name)
            .finish_non_exhaustive()
    }
}

/// A loaded module: a named, versioned, ordered set of types.
#[derive(Debug)]
pub struct Module {
    pub name: String,
    pub version: String,
    types: Vec<Arc<TypeInfo>>,
}

impl Module {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            types: Vec::new(),
        }
    }

    pub fn with_type(mut self, ty: Arc<TypeInfo>) -> Self {
        self.types.push(ty);
        self
    }

    /// `"<name>, Version=<version>"`.
    pub fn full_name(&self) -> String {
        format!("{}, Version={}", self.name, self.version)
    }

    pub fn types(&self) -> &[Arc<TypeInfo>] {
        &self.types
    }

    /// The first defined type whose fully-qualified name is exactly `full_name`.
    pub fn find_type(&self, full_name: &str) -> Option<&Arc<TypeInfo>> {
        self.types.iter().find(|t| t.name == full_name)
    }
}
