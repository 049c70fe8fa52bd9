//! Abstract syntax tree produced by the [`Parser`](crate::parser::Parser).
//!
//! Nodes are plain data and never change after parsing. Expressions that the
//! resolver annotates (`Variable`, `Assign`, `This`, `Super`) carry an
//! [`ExprId`]; the annotation map is keyed by that id, so two textually
//! identical references at different positions stay distinct.

use std::rc::Rc;

use serde::Serialize;

use crate::token::Token;

/// Identity of an expression node, unique within one [`ExprIds`] allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ExprId(pub usize);

/// Monotonic allocator for [`ExprId`]s.
///
/// A REPL session keeps one allocator alive across every line it parses, so
/// closures created by earlier lines never share ids with later code.
#[derive(Debug, Default)]
pub struct ExprIds {
    next: usize,
}

impl ExprIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> ExprId {
        let id = ExprId(self.next);
        self.next += 1;
        id
    }
}

/// A **literal constant** that appears directly in the source code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// The boolean constant `true`.
    True,

    /// The boolean constant `false`.
    False,

    /// The `null` literal.
    Null,
}

/// **Abstract‑Syntax‑Tree node** representing every kind of *expression*.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// A literal constant: number, string, `true`, `false`, or `null`.
    Literal(LiteralValue),

    /// Prefix unary operator expression, `!ready` or `-42`.
    Unary {
        /// The operator token (`!` or `-`).
        operator: Token,
        right: Box<Expr>,
    },

    /// Infix arithmetic, comparison or equality expression.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// `and` / `or`. Evaluates to one of its operands.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Parenthesised sub‑expression.
    Grouping(Box<Expr>),

    /// Variable access.
    Variable { id: ExprId, name: Token },

    /// Assignment expression: `identifier "=" expression`.
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    /// Function‑, method‑ or constructor‑call expression.
    Call {
        callee: Box<Expr>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// `object.name`
    Get { object: Box<Expr>, name: Token },

    /// `object.name = value`
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    /// The `this` keyword inside a method.
    This { id: ExprId, keyword: Token },

    /// `parent.method`, looked up on the enclosing class's parent.
    Super {
        id: ExprId,
        keyword: Token,
        method: Token,
    },
}

/// A named function or method: `name(params) { body }`.
///
/// Shared behind an `Rc` because every closure created from the declaration
/// (and every method bound from it) points at the same node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

/// **Abstract‑Syntax‑Tree node** for *statements*.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    /// `print` statement used for output.
    Print(Expr),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    /// `if` / `else` conditional.
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while` loop. `for` loops are desugared into this.
    While { condition: Expr, body: Box<Stmt> },

    /// Function declaration ‑ becomes a first‑class callable value.
    Function(Rc<FunctionDecl>),

    /// `return` statement inside a function body.
    Return {
        /// The `return` keyword token (for error locations).
        keyword: Token,

        /// Absent ⇒ `null` is returned.
        value: Option<Expr>,
    },

    /// `class NAME (< PARENT)? { methods }`.
    Class {
        name: Token,
        /// Always an [`Expr::Variable`] naming the parent class.
        parent: Option<Expr>,
        methods: Vec<Rc<FunctionDecl>>,
    },
}
