//! Tree‑walking evaluator.
//!
//! Statements produce a [`Completion`]; a `return` travels upward as
//! `Completion::Return` until the enclosing function call consumes it.
//! Runtime errors travel as `Err(FendError::Runtime)` and abandon the whole
//! [`Interpreter::interpret`] call.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, LiteralValue, Stmt};
use crate::environment::Environment;
use crate::error::{FendError, Result};
use crate::resolver::Resolutions;
use crate::token::{Token, TokenType};
use crate::value::{Class, Function, NativeFunction, Value};

/// Methods with this name run automatically on construction.
pub const INITIALIZER_NAME: &str = "Init";

/// How a statement finished.
#[derive(Debug, Clone)]
pub enum Completion {
    Normal,
    Return(Value),
}

pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
    output: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an Interpreter printing to stdout.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Creates an Interpreter whose `print` statements write to `output`, and
    /// defines native functions such as `Clock`.
    pub fn with_output(output: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals = Rc::new(RefCell::new(Environment::new()));

        debug!("Defining native function 'Clock'");

        globals.borrow_mut().define(
            "Clock",
            Value::NativeFunction(Rc::new(NativeFunction {
                name: "Clock",
                arity: 0,
                func: |_args: &[Value]| {
                    let millis = chrono::Utc::now().timestamp_millis() as f64;
                    Ok(Value::Number(millis))
                },
            })),
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    /// Adopt the scope distances computed by the resolver.
    pub fn resolve(&mut self, resolutions: Resolutions) {
        debug!("Recording {} resolved reference(s)", resolutions.len());
        self.locals.extend(resolutions);
    }

    /// Bindings of the global frame, sorted by name.
    pub fn globals(&self) -> Vec<(String, Value)> {
        self.globals.borrow().bindings()
    }

    /// Interprets a list of statements (a "program"). The first runtime error
    /// abandons the remaining statements.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            self.execute(stmt)?;
        }

        self.output.flush()?;

        info!("Interpretation completed successfully");
        Ok(())
    }

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt) -> Result<Completion> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Completion::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.output, "{}", value)?;
                debug!("Printed value: {}", value);
                Ok(Completion::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Completion::Normal)
            }

            Stmt::Block(statements) => {
                let environment = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, Rc::new(RefCell::new(environment)))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(Completion::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Completion::Return(value) = self.execute(body)? {
                        return Ok(Completion::Return(value));
                    }
                }
                Ok(Completion::Normal)
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);
                let function = Function::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );
                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));
                Ok(Completion::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                debug!("Returning value: {}", value);
                Ok(Completion::Return(value))
            }

            Stmt::Class {
                name,
                parent,
                methods,
            } => {
                let parent_class: Option<Rc<Class>> = match parent {
                    Some(parent_expr) => match self.evaluate(parent_expr)? {
                        Value::Class(class) => Some(class),
                        _ => {
                            let token = match parent_expr {
                                Expr::Variable { name, .. } => name,
                                _ => name,
                            };
                            return Err(FendError::runtime(token, "Parent must be a class."));
                        }
                    },
                    None => None,
                };

                // Pre-declared so methods can refer to the class by name.
                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Null);

                let enclosing = Rc::clone(&self.environment);
                let method_closure = match &parent_class {
                    Some(parent_class) => {
                        let mut environment = Environment::with_enclosing(Rc::clone(&enclosing));
                        environment.define("parent", Value::Class(Rc::clone(parent_class)));
                        Rc::new(RefCell::new(environment))
                    }
                    None => Rc::clone(&enclosing),
                };

                let methods: HashMap<String, Rc<Function>> = methods
                    .iter()
                    .map(|method| {
                        let function = Function::new(
                            Rc::clone(method),
                            Rc::clone(&method_closure),
                            method.name.lexeme == INITIALIZER_NAME,
                        );
                        (method.name.lexeme.clone(), Rc::new(function))
                    })
                    .collect();

                let class = Class::new(name.lexeme.clone(), parent_class, methods);
                info!("Class '{}' defined", name.lexeme);

                enclosing
                    .borrow_mut()
                    .assign(name, Value::Class(Rc::new(class)))?;
                Ok(Completion::Normal)
            }
        }
    }

    /// Run `statements` in `environment`, restoring the previous frame
    /// however execution ends.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<Completion> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let result = self.execute_all(statements);

        self.environment = previous;
        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> Result<Completion> {
        for stmt in statements {
            if let Completion::Return(value) = self.execute(stmt)? {
                return Ok(Completion::Return(value));
            }
        }
        Ok(Completion::Normal)
    }

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::from(s.as_str()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Null => Value::Null,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left_val = self.evaluate(left)?;

                let short_circuit = if operator.token_type == TokenType::OR {
                    left_val.is_truthy()
                } else {
                    !left_val.is_truthy()
                };

                if short_circuit {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => self.environment.borrow_mut().assign_at(
                        distance,
                        name,
                        value.clone(),
                    )?,
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                debug!("Assigned {} to '{}'", value, name.lexeme);
                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_val = self.evaluate(callee)?;

                let mut args = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.evaluate(arg)?);
                }

                self.call_value(&callee_val, paren, args)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => instance.get(name),
                _ => Err(FendError::runtime(name, "Only instances have properties.")),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(FendError::runtime(name, "Only instances have fields."));
                };

                let value = self.evaluate(value)?;
                instance.set(name, value.clone());
                Ok(value)
            }

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let right_val = self.evaluate(right)?;

        match operator.token_type {
            TokenType::BANG => Ok(Value::Bool(!right_val.is_truthy())),
            TokenType::MINUS => match right_val {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(FendError::runtime(operator, "Operand must be a number.")),
            },
            _ => Err(FendError::runtime(operator, "Invalid unary operator.")),
        }
    }

    /// Both operands are always evaluated, left first.
    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left_val = self.evaluate(left)?;
        let right_val = self.evaluate(right)?;

        match operator.token_type {
            TokenType::EQUAL_EQUAL => return Ok(Value::Bool(left_val.is_equal(&right_val))),
            TokenType::BANG_EQUAL => return Ok(Value::Bool(!left_val.is_equal(&right_val))),
            TokenType::PLUS => {
                return match (&left_val, &right_val) {
                    (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                    (Value::String(a), Value::String(b)) => {
                        Ok(Value::from(format!("{}{}", a, b)))
                    }
                    _ => Err(FendError::runtime(
                        operator,
                        "Operands must be two numbers or two strings.",
                    )),
                };
            }
            _ => {}
        }

        let (Value::Number(a), Value::Number(b)) = (&left_val, &right_val) else {
            return Err(FendError::runtime(operator, "Operands must be numbers."));
        };
        let (a, b) = (*a, *b);

        match operator.token_type {
            TokenType::MINUS => Ok(Value::Number(a - b)),
            TokenType::STAR => Ok(Value::Number(a * b)),
            TokenType::SLASH => Ok(Value::Number(a / b)),
            TokenType::GREATER => Ok(Value::Bool(a > b)),
            TokenType::GREATER_EQUAL => Ok(Value::Bool(a >= b)),
            TokenType::LESS => Ok(Value::Bool(a < b)),
            TokenType::LESS_EQUAL => Ok(Value::Bool(a <= b)),
            _ => Err(FendError::runtime(operator, "Invalid binary operator.")),
        }
    }

    fn call_value(&mut self, callee: &Value, paren: &Token, args: Vec<Value>) -> Result<Value> {
        let Some(callable) = callee.as_callable() else {
            return Err(FendError::runtime(
                paren,
                "Can only call functions and classes.",
            ));
        };

        if args.len() != callable.arity() {
            return Err(FendError::runtime(
                paren,
                format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    args.len()
                ),
            ));
        }

        let result = callable.call(self, args, paren)?;
        debug!("Call at line {} returned {}", paren.line, result);
        Ok(result)
    }

    /// `parent.method`: the parent class sits `distance` frames out, the
    /// receiving instance one frame closer.
    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> Result<Value> {
        let distance = *self
            .locals
            .get(&id)
            .ok_or_else(|| FendError::runtime(keyword, "Unresolved 'parent' expression."))?;

        let parent = self.environment.borrow().get_at(distance, "parent");
        let Some(Value::Class(parent)) = parent else {
            return Err(FendError::runtime(keyword, "Parent must be a class."));
        };

        let this = distance
            .checked_sub(1)
            .and_then(|d| self.environment.borrow().get_at(d, "this"));
        let Some(Value::Instance(instance)) = this else {
            return Err(FendError::runtime(keyword, "Can't use 'parent' without an instance."));
        };

        let Some(found) = parent.find_method(&method.lexeme) else {
            return Err(FendError::runtime(
                method,
                format!("Undefined property '{}'.", method.lexeme),
            ));
        };

        Ok(Value::Function(Rc::new(found.bind(instance))))
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => self
                .environment
                .borrow()
                .get_at(distance, &name.lexeme)
                .ok_or_else(|| {
                    FendError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
                }),
            None => self.globals.borrow().get(name),
        }
    }
}
