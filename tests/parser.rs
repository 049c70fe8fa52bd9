#[cfg(test)]
mod parser_tests {
    use fend::ast::*;
    use fend::ast_printer::AstPrinter;
    use fend::error::FendError;
    use fend::parser::Parser;
    use fend::scanner::scan;

    fn parse(source: &str) -> Result<Vec<Stmt>, Vec<FendError>> {
        let (tokens, errors) = scan(source);
        assert!(errors.is_empty(), "unexpected lex errors: {:?}", errors);

        let mut ids = ExprIds::new();
        Parser::new(&tokens, &mut ids).parse()
    }

    fn print(source: &str) -> String {
        match parse(source) {
            Ok(statements) => AstPrinter.print_program(&statements),
            Err(errors) => panic!("unexpected parse errors: {:?}", errors),
        }
    }

    fn error_messages(source: &str) -> Vec<String> {
        match parse(source) {
            Ok(statements) => panic!("expected errors, got {:?}", statements),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(print("print 1 + 2 * 3;"), "(print (+ 1.0 (* 2.0 3.0)))");
        assert_eq!(print("print (1 + 2) * 3;"), "(print (* (group (+ 1.0 2.0)) 3.0))");
        assert_eq!(print("print 1 - 2 - 3;"), "(print (- (- 1.0 2.0) 3.0))");
    }

    #[test]
    fn test_unary_and_equality() {
        assert_eq!(print("print -a == !b;"), "(print (== (- a) (! b)))");
        assert_eq!(print("print 1 < 2 != 3 >= 4;"), "(print (!= (< 1.0 2.0) (>= 3.0 4.0)))");
    }

    #[test]
    fn test_logical_precedence() {
        assert_eq!(print("x or y and z;"), "(; (or x (and y z)))");
    }

    #[test]
    fn test_assignment_is_right_associative() {
        assert_eq!(print("a = b = c;"), "(; (= a (= b c)))");
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            print("print true; print false; print null; print \"hi\"; print 2.5;"),
            "(print true)\n(print false)\n(print null)\n(print hi)\n(print 2.5)"
        );
    }

    #[test]
    fn test_for_desugars_to_block_and_while() {
        assert_eq!(
            print("for (var i = 0; i < 3; i = i + 1) print i;"),
            "(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"
        );
    }

    #[test]
    fn test_empty_for_clauses() {
        assert_eq!(print("for (;;) print 1;"), "(block (while true (print 1.0)))");
    }

    #[test]
    fn test_if_else_and_while() {
        assert_eq!(
            print("if (a) print 1; else { print 2; } while (b) b = false;"),
            "(if a (print 1.0) (block (print 2.0)))\n(while b (; (= b false)))"
        );
    }

    #[test]
    fn test_calls_chain() {
        assert_eq!(
            print("f(1, g(2))(3);"),
            "(; (call (call f 1.0 (call g 2.0)) 3.0))"
        );
    }

    #[test]
    fn test_get_and_set() {
        assert_eq!(print("a.b.c = 1;"), "(; (.= (. a b) c 1.0))");
        assert_eq!(print("print a.b().c;"), "(print (. (call (. a b)) c))");
    }

    #[test]
    fn test_function_declaration() {
        assert_eq!(
            print("func add(a, b) { return a + b; }"),
            "(func add(a b) (return (+ a b)))"
        );
    }

    #[test]
    fn test_class_with_parent() {
        let statements = parse(
            "class B < A {\n  Init(x) { this.x = x; }\n  m() { return parent.m(); }\n}",
        )
        .unwrap();

        assert_eq!(statements.len(), 1);

        match &statements[0] {
            Stmt::Class {
                name,
                parent,
                methods,
            } => {
                assert_eq!(name.lexeme, "B");
                assert!(matches!(
                    parent,
                    Some(Expr::Variable { name, .. }) if name.lexeme == "A"
                ));
                assert_eq!(methods.len(), 2);
                assert_eq!(methods[0].name.lexeme, "Init");
                assert_eq!(methods[0].params.len(), 1);
            }
            other => panic!("expected class, got {:?}", other),
        }

        assert_eq!(
            AstPrinter.print_program(&statements),
            "(class B < A (method Init(x) (; (.= this x x))) (method m() (return (call (parent m)))))"
        );
    }

    #[test]
    fn test_parent_access_is_super_expression() {
        let statements = parse("parent.go;").unwrap();

        match &statements[0] {
            Stmt::Expression(Expr::Super {
                keyword, method, ..
            }) => {
                assert_eq!(keyword.lexeme, "parent");
                assert_eq!(method.lexeme, "go");
            }
            other => panic!("expected parent access, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_parent_is_an_error() {
        assert_eq!(
            error_messages("print parent;"),
            vec!["[line 1] Error at ';': Expect '.' after 'parent'."]
        );
    }

    #[test]
    fn test_expression_ids_are_unique() {
        let statements = parse("a; a;").unwrap();

        let ids: Vec<ExprId> = statements
            .iter()
            .map(|stmt| match stmt {
                Stmt::Expression(Expr::Variable { id, .. }) => *id,
                other => panic!("expected variable, got {:?}", other),
            })
            .collect();

        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_shared_allocator_continues_numbering() {
        let mut ids = ExprIds::new();

        let (tokens, _) = scan("a;");
        let first = Parser::new(&tokens, &mut ids).parse().unwrap();
        let second = Parser::new(&tokens, &mut ids).parse().unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_recovers_and_reports_every_error() {
        let errors = error_messages("var = 1;\nprint 2;\nvar x 3;\nprint ;");

        assert_eq!(
            errors,
            vec![
                "[line 1] Error at '=': Expect variable name.",
                "[line 3] Error at '3': Expect ';' after variable declaration.",
                "[line 4] Error at ';': Expect expression.",
            ]
        );
    }

    #[test]
    fn test_error_at_end() {
        assert_eq!(
            error_messages("class A {"),
            vec!["[line 1] Error at end: Expect '}' after class body."]
        );
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert_eq!(
            error_messages("1 = 2;"),
            vec!["[line 1] Error at '=': Invalid assignment target."]
        );
        assert_eq!(
            error_messages("a + b = c;"),
            vec!["[line 1] Error at '=': Invalid assignment target."]
        );
    }

    #[test]
    fn test_invalid_assignment_does_not_stop_parsing() {
        let errors = error_messages("1 = 2;\nprint ;");

        assert_eq!(errors.len(), 2);
        assert!(errors[1].starts_with("[line 2]"));
    }

    #[test]
    fn test_too_many_parameters() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
        let source = format!("func f({}) {{}}", params.join(", "));

        let errors = error_messages(&source);

        assert_eq!(errors.len(), 1);
        assert!(errors[0].ends_with("Can't have more than 255 parameters."));
    }

    #[test]
    fn test_too_many_arguments() {
        let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        let source = format!("f({});\nprint ;", args.join(", "));

        let errors = error_messages(&source);

        assert_eq!(
            errors,
            vec![
                "[line 1] Error at '255': Can't have more than 255 arguments.",
                "[line 2] Error at ';': Expect expression.",
            ]
        );
    }

    #[test]
    fn test_serializes_to_json() {
        let statements = parse("print 1;").unwrap();
        let json = serde_json::to_string(&statements).unwrap();

        assert!(json.starts_with("[{\"Print\":{\"Literal\":{\"Number\":1.0}}}"));
    }
}
