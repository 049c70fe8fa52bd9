//! Debug rendering of the AST as parenthesized prefix notation.

use crate::ast::{Expr, FunctionDecl, LiteralValue, Stmt};

pub struct AstPrinter;

impl AstPrinter {
    pub fn print_program(&self, statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(|stmt| self.print_stmt(stmt))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn print_stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => format!("(; {})", self.print(expr)),

            Stmt::Print(expr) => format!("(print {})", self.print(expr)),

            Stmt::Var { name, initializer } => match initializer {
                Some(expr) => format!("(var {} {})", name.lexeme, self.print(expr)),
                None => format!("(var {})", name.lexeme),
            },

            Stmt::Block(statements) => {
                let mut out = String::from("(block");
                for stmt in statements {
                    out.push(' ');
                    out.push_str(&self.print_stmt(stmt));
                }
                out.push(')');
                out
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    self.print(condition),
                    self.print_stmt(then_branch),
                    self.print_stmt(else_branch)
                ),
                None => format!(
                    "(if {} {})",
                    self.print(condition),
                    self.print_stmt(then_branch)
                ),
            },

            Stmt::While { condition, body } => format!(
                "(while {} {})",
                self.print(condition),
                self.print_stmt(body)
            ),

            Stmt::Function(function) => self.print_function("func", function),

            Stmt::Return { value, .. } => match value {
                Some(expr) => format!("(return {})", self.print(expr)),
                None => "(return)".to_string(),
            },

            Stmt::Class {
                name,
                parent,
                methods,
            } => {
                let mut out = format!("(class {}", name.lexeme);
                if let Some(parent) = parent {
                    out.push_str(&format!(" < {}", self.print(parent)));
                }
                for method in methods {
                    out.push(' ');
                    out.push_str(&self.print_function("method", method));
                }
                out.push(')');
                out
            }
        }
    }

    fn print_function(&self, keyword: &str, function: &FunctionDecl) -> String {
        let params: Vec<&str> = function.params.iter().map(|p| p.lexeme.as_str()).collect();
        let body: Vec<String> = function.body.iter().map(|s| self.print_stmt(s)).collect();

        format!(
            "({} {}({}) {})",
            keyword,
            function.name.lexeme,
            params.join(" "),
            body.join(" ")
        )
    }

    pub fn print(&self, expr: &Expr) -> String {
        match expr {
            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                self.print(left),
                self.print(right)
            ),

            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, self.print(right))
            }

            Expr::Literal(literal) => match literal {
                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        format!("{:.1}", n)
                    } else {
                        n.to_string()
                    }
                }

                LiteralValue::Str(s) => s.to_string(),

                LiteralValue::True => "true".to_string(),

                LiteralValue::False => "false".to_string(),

                LiteralValue::Null => "null".to_string(),
            },

            Expr::Grouping(expr) => format!("(group {})", self.print(expr)),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, self.print(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut out = format!("(call {}", self.print(callee));
                for arg in arguments {
                    out.push(' ');
                    out.push_str(&self.print(arg));
                }
                out.push(')');
                out
            }

            Expr::Get { object, name } => format!("(. {} {})", self.print(object), name.lexeme),

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(.= {} {} {})",
                self.print(object),
                name.lexeme,
                self.print(value)
            ),

            Expr::This { .. } => "this".to_string(),

            Expr::Super { method, .. } => format!("(parent {})", method.lexeme),
        }
    }
}
