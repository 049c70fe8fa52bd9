//! Runtime values and the callable object model: user functions, native
//! functions, classes and instances.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::ast::FunctionDecl;
use crate::environment::Environment;
use crate::error::{FendError, Result};
use crate::interpreter::{Completion, Interpreter, INITIALIZER_NAME};
use crate::token::Token;

/// Anything that can appear after a call's callee position.
pub trait Callable {
    /// Exact number of arguments the callable accepts.
    fn arity(&self) -> usize;

    /// Invoke with already evaluated arguments; `args.len() == self.arity()`.
    /// `paren` locates errors raised by host code.
    fn call(&self, interpreter: &mut Interpreter, args: Vec<Value>, paren: &Token)
        -> Result<Value>;
}

/// A dynamically typed Fend value.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    String(Rc<str>),
    Bool(bool),
    Null,
    Function(Rc<Function>),
    NativeFunction(Rc<NativeFunction>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
}

impl Value {
    /// Only `null` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    /// The callable view of this value, if it has one.
    pub fn as_callable(&self) -> Option<&dyn Callable> {
        match self {
            Value::Function(function) => Some(function.as_ref() as &dyn Callable),
            Value::NativeFunction(native) => Some(native.as_ref() as &dyn Callable),
            Value::Class(class) => Some(class as &dyn Callable),
            _ => None,
        }
    }

    /// Structural equality for plain data, identity for heap objects.
    pub fn is_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::NativeFunction(a), Value::NativeFunction(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                // 2.0 prints as "2", -0.0 as "-0"
                if *n == 0.0 && n.is_sign_negative() {
                    write!(f, "-0")
                } else if n.fract() == 0.0 && n.abs() < 1e15 {
                    let mut buf = itoa::Buffer::new();
                    write!(f, "{}", buf.format(*n as i64))
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Null => write!(f, "null"),

            Value::Function(function) => write!(f, "<func {}>", function.name()),

            Value::NativeFunction(native) => write!(f, "<native func {}>", native.name),

            Value::Class(class) => write!(f, "{}", class.name),

            Value::Instance(instance) => write!(f, "Instance of {}", instance.class.name),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User functions
// ─────────────────────────────────────────────────────────────────────────────

/// A user-defined function or method together with its defining frame.
pub struct Function {
    declaration: Rc<FunctionDecl>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl Function {
    pub fn new(
        declaration: Rc<FunctionDecl>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    /// A copy of this method whose closure is a fresh frame binding `this`.
    pub fn bind(&self, instance: Rc<Instance>) -> Function {
        let mut environment = Environment::with_enclosing(Rc::clone(&self.closure));
        environment.define("this", Value::Instance(instance));

        Function {
            declaration: Rc::clone(&self.declaration),
            closure: Rc::new(RefCell::new(environment)),
            is_initializer: self.is_initializer,
        }
    }

    /// The instance bound by [`Function::bind`], read from the closure.
    fn bound_this(&self, paren: &Token) -> Result<Value> {
        self.closure
            .borrow()
            .get_at(0, "this")
            .ok_or_else(|| FendError::runtime(paren, "Initializer is not bound to an instance."))
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The closure may (indirectly) contain this function again.
        f.debug_struct("Function")
            .field("name", &self.name())
            .field("arity", &self.declaration.params.len())
            .field("is_initializer", &self.is_initializer)
            .finish()
    }
}

impl Callable for Function {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        args: Vec<Value>,
        paren: &Token,
    ) -> Result<Value> {
        debug!("Calling user-defined function '{}'", self.name());

        let mut environment = Environment::with_enclosing(Rc::clone(&self.closure));
        for (param, arg) in self.declaration.params.iter().zip(args) {
            environment.define(&param.lexeme, arg);
        }

        let completion =
            interpreter.execute_block(&self.declaration.body, Rc::new(RefCell::new(environment)))?;

        if self.is_initializer {
            return self.bound_this(paren);
        }

        Ok(match completion {
            Completion::Return(value) => value,
            Completion::Normal => Value::Null,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Native functions
// ─────────────────────────────────────────────────────────────────────────────

/// A host-implemented function exposed as a global.
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: fn(&[Value]) -> std::result::Result<Value, String>,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native func {}>", self.name)
    }
}

impl Callable for NativeFunction {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(
        &self,
        _interpreter: &mut Interpreter,
        args: Vec<Value>,
        paren: &Token,
    ) -> Result<Value> {
        debug!("Calling native function '{}'", self.name);

        (self.func)(&args).map_err(|message| FendError::runtime(paren, message))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Classes and instances
// ─────────────────────────────────────────────────────────────────────────────

/// A class: name, optional parent and method table. Immutable once built.
#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub parent: Option<Rc<Class>>,
    methods: HashMap<String, Rc<Function>>,
}

impl Class {
    pub fn new(
        name: String,
        parent: Option<Rc<Class>>,
        methods: HashMap<String, Rc<Function>>,
    ) -> Self {
        Self {
            name,
            parent,
            methods,
        }
    }

    /// Look `name` up on this class, then up the parent chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        match self.methods.get(name) {
            Some(method) => Some(Rc::clone(method)),
            None => self.parent.as_ref()?.find_method(name),
        }
    }
}

/// Calling a class constructs an instance and runs its initializer.
impl Callable for Rc<Class> {
    fn arity(&self) -> usize {
        self.find_method(INITIALIZER_NAME)
            .map_or(0, |initializer| initializer.arity())
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        args: Vec<Value>,
        paren: &Token,
    ) -> Result<Value> {
        debug!("Constructing instance of '{}'", self.name);

        let instance = Rc::new(Instance::new(Rc::clone(self)));

        if let Some(initializer) = self.find_method(INITIALIZER_NAME) {
            initializer
                .bind(Rc::clone(&instance))
                .call(interpreter, args, paren)?;
        }

        Ok(Value::Instance(instance))
    }
}

/// An object: its class plus a mutable field table.
#[derive(Debug)]
pub struct Instance {
    pub class: Rc<Class>,
    fields: RefCell<HashMap<String, Value>>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Self {
            class,
            fields: RefCell::new(HashMap::new()),
        }
    }

    /// Property access: fields shadow methods; methods come back bound.
    pub fn get(self: &Rc<Self>, name: &Token) -> Result<Value> {
        if let Some(value) = self.fields.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(method) = self.class.find_method(&name.lexeme) {
            return Ok(Value::Function(Rc::new(method.bind(Rc::clone(self)))));
        }

        Err(FendError::runtime(
            name,
            format!("Undefined property '{}'.", name.lexeme),
        ))
    }

    pub fn set(&self, name: &Token, value: Value) {
        self.fields.borrow_mut().insert(name.lexeme.clone(), value);
    }
}
