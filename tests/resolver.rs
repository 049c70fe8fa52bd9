#[cfg(test)]
mod resolver_tests {
    use fend::ast::ExprIds;
    use fend::error::FendError;
    use fend::parser::Parser;
    use fend::resolver::{Resolutions, Resolver};
    use fend::scanner::scan;

    fn resolve(source: &str) -> Result<Resolutions, Vec<FendError>> {
        let (tokens, lex_errors) = scan(source);
        assert!(lex_errors.is_empty(), "unexpected lex errors: {:?}", lex_errors);

        let mut ids = ExprIds::new();
        let statements = match Parser::new(&tokens, &mut ids).parse() {
            Ok(statements) => statements,
            Err(errors) => panic!("unexpected parse errors: {:?}", errors),
        };

        Resolver::new().resolve(&statements)
    }

    /// Recorded distances, ordered by expression id (i.e. source order).
    fn distances(source: &str) -> Vec<usize> {
        let resolutions = match resolve(source) {
            Ok(resolutions) => resolutions,
            Err(errors) => panic!("unexpected resolve errors: {:?}", errors),
        };

        let mut entries: Vec<_> = resolutions.into_iter().collect();
        entries.sort();
        entries.into_iter().map(|(_, depth)| depth).collect()
    }

    fn error_messages(source: &str) -> Vec<String> {
        match resolve(source) {
            Ok(resolutions) => panic!("expected errors, got {:?}", resolutions),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn test_globals_are_not_recorded() {
        assert_eq!(distances("var a = 1; print a; a = 2;"), Vec::<usize>::new());
    }

    #[test]
    fn test_local_in_same_scope() {
        assert_eq!(distances("{ var a = 1; print a; }"), vec![0]);
    }

    #[test]
    fn test_local_in_enclosing_scope() {
        assert_eq!(distances("{ var a = 1; { print a; } }"), vec![1]);
    }

    #[test]
    fn test_shadowing_uses_nearest_declaration() {
        assert_eq!(
            distances("{ var a = 1; { var a = 2; print a; } print a; }"),
            vec![0, 0]
        );
    }

    #[test]
    fn test_assignment_is_resolved() {
        assert_eq!(distances("{ var a = 1; { a = 2; } }"), vec![1]);
    }

    #[test]
    fn test_closure_captures_enclosing_function_local() {
        assert_eq!(
            distances("func f() { var x = 1; func g() { return x; } }"),
            vec![1]
        );
    }

    #[test]
    fn test_parameters_share_the_body_scope() {
        assert_eq!(distances("func f(a) { print a; }"), vec![0]);
    }

    #[test]
    fn test_this_is_one_scope_outside_the_method() {
        assert_eq!(distances("class A { m() { return this; } }"), vec![1]);
    }

    #[test]
    fn test_parent_is_two_scopes_outside_the_method() {
        assert_eq!(
            distances("class A {} class B < A { m() { return parent.m(); } }"),
            vec![2]
        );
    }

    #[test]
    fn test_global_read_in_own_initializer() {
        assert_eq!(
            error_messages("var a = a;"),
            vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
        );
    }

    #[test]
    fn test_local_read_in_own_initializer() {
        assert_eq!(
            error_messages("{ var a = a; }"),
            vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
        );
    }

    #[test]
    fn test_shadowing_outer_in_initializer_is_still_an_error() {
        let errors = error_messages("var a = 1; { var a = a + 1; }");

        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_global_redefinition_cannot_read_previous_value() {
        assert_eq!(
            error_messages("var a = 1;\nvar a = a + 1;"),
            vec!["[line 2] Error at 'a': Can't read local variable in its own initializer."]
        );
    }

    #[test]
    fn test_global_initializer_may_read_other_globals() {
        assert!(resolve("var a = 1; var b = a;").is_ok());
    }

    #[test]
    fn test_local_redeclaration() {
        assert_eq!(
            error_messages("{ var a = 1;\nvar a = 2; }"),
            vec!["[line 2] Error at 'a': Already a variable with this name in this scope."]
        );
    }

    #[test]
    fn test_global_redeclaration_is_allowed() {
        assert!(resolve("var a = 1; var a = 2;").is_ok());
    }

    #[test]
    fn test_duplicate_parameter() {
        assert_eq!(
            error_messages("func f(a, a) {}"),
            vec!["[line 1] Error at 'a': Already a variable with this name in this scope."]
        );
    }

    #[test]
    fn test_return_at_top_level() {
        assert_eq!(
            error_messages("return 1;"),
            vec!["[line 1] Error at 'return': Can't return from top-level code."]
        );
    }

    #[test]
    fn test_return_value_from_initializer() {
        assert_eq!(
            error_messages("class A { Init() { return 1; } }"),
            vec!["[line 1] Error at 'return': Can't return a value from an initializer."]
        );
    }

    #[test]
    fn test_bare_return_from_initializer_is_allowed() {
        assert!(resolve("class A { Init() { return; } }").is_ok());
    }

    #[test]
    fn test_this_outside_class() {
        assert_eq!(
            error_messages("print this;"),
            vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
        );
        assert_eq!(
            error_messages("func f() { return this; }"),
            vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
        );
    }

    #[test]
    fn test_parent_outside_class() {
        assert_eq!(
            error_messages("print parent.x;"),
            vec!["[line 1] Error at 'parent': Can't use 'parent' outside of a class."]
        );
    }

    #[test]
    fn test_parent_in_class_without_parent() {
        assert_eq!(
            error_messages("class A { m() { parent.m(); } }"),
            vec!["[line 1] Error at 'parent': Can't use 'parent' in a class with no parent."]
        );
    }

    #[test]
    fn test_class_inheriting_from_itself() {
        assert_eq!(
            error_messages("class A < A {}"),
            vec!["[line 1] Error at 'A': A class can't inherit from itself."]
        );
    }

    #[test]
    fn test_every_error_is_collected() {
        let errors = error_messages("return;\nprint this;\n{ var b = 1; var b = 2; }");

        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("[line 1]"));
        assert!(errors[1].starts_with("[line 2]"));
        assert!(errors[2].starts_with("[line 3]"));
    }
}
