#[cfg(test)]
mod scanner_tests {
    use fend::scanner::*;
    use fend::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len(), "tokens: {:?}", tokens);

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_two_char_operators() {
        assert_token_sequence(
            "! != = == < <= > >= /",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::SLASH, "/"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "class Foo < parent func var_1 null this Init",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "Foo"),
                (TokenType::LESS, "<"),
                (TokenType::PARENT, "parent"),
                (TokenType::FUNC, "func"),
                (TokenType::IDENTIFIER, "var_1"),
                (TokenType::NULL, "null"),
                (TokenType::THIS, "this"),
                (TokenType::IDENTIFIER, "Init"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_super_and_fun_are_plain_identifiers() {
        assert_token_sequence(
            "super fun nil",
            &[
                (TokenType::IDENTIFIER, "super"),
                (TokenType::IDENTIFIER, "fun"),
                (TokenType::IDENTIFIER, "nil"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_number_literals() {
        let tokens: Vec<Token> = Scanner::new("12 3.25 7. -4")
            .filter_map(Result::ok)
            .collect();

        let kinds: Vec<&TokenType> = tokens.iter().map(|t| &t.token_type).collect();
        assert!(matches!(kinds[0], TokenType::NUMBER(n) if *n == 12.0));
        assert!(matches!(kinds[1], TokenType::NUMBER(n) if *n == 3.25));
        // a trailing '.' is not part of the number
        assert!(matches!(kinds[2], TokenType::NUMBER(n) if *n == 7.0));
        assert_eq!(*kinds[3], TokenType::DOT);
        assert_eq!(*kinds[4], TokenType::MINUS);
        assert!(matches!(kinds[5], TokenType::NUMBER(n) if *n == 4.0));
    }

    #[test]
    fn test_multiline_string_advances_line() {
        let tokens: Vec<Token> = Scanner::new("\"a\nb\" x")
            .filter_map(Result::ok)
            .collect();

        match &tokens[0].token_type {
            TokenType::STRING(s) => assert_eq!(s, "a\nb"),
            other => panic!("expected string, got {:?}", other),
        }
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_unterminated_string_is_reported() {
        let results: Vec<_> = Scanner::new("print \"oops").collect();

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.to_string())
            .collect();
        assert_eq!(errors, vec!["[line 1] Error: Unterminated string.".to_string()]);

        let last = results.last().unwrap().as_ref().unwrap();
        assert_eq!(last.token_type, TokenType::EOF);
    }

    #[test]
    fn test_line_comment_skipped() {
        assert_token_sequence(
            "a // b c\nd",
            &[
                (TokenType::IDENTIFIER, "a"),
                (TokenType::IDENTIFIER, "d"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_nested_block_comment_is_one_unit() {
        assert_token_sequence(
            "x /* a /* b */ c */ y",
            &[
                (TokenType::IDENTIFIER, "x"),
                (TokenType::IDENTIFIER, "y"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_block_comment_counts_lines() {
        let tokens: Vec<Token> = Scanner::new("/* one\ntwo /*\n*/\n*/ z")
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens[0].lexeme, "z");
        assert_eq!(tokens[0].line, 4);
    }

    #[test]
    fn test_unterminated_block_comment_is_silent() {
        let results: Vec<_> = Scanner::new("a /* never /* closed */").collect();

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].as_ref().unwrap().token_type, TokenType::EOF);
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let scanner = Scanner::new(source);

        let results: Vec<_> = scanner.collect();

        // 0: COMMA ','
        // 1: DOT '.'
        // 2: Error for '$'
        // 3: LEFT_PAREN '('
        // 4: Error for '#'
        // 5: EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let error_count = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(error_count, 2, "Expected 2 error messages");

        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(
                err.to_string().contains("Unexpected character"),
                "Error message should contain 'Unexpected character', got: {}",
                err
            );
        }

        fn assert_token_matches(
            result: &fend::error::Result<Token>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(token.token_type, expected_type);
                    assert_eq!(token.lexeme, expected_lexeme);
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }

    #[test]
    fn test_non_ascii_character_reported_once() {
        let results: Vec<_> = Scanner::new("é").collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].as_ref().unwrap_err().to_string().contains('é'));
    }

    #[test]
    fn test_scan_collects_tokens_and_errors() {
        let (tokens, errors) = scan("var a = 1; @\nprint a;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().starts_with("[line 1]"));
        assert_eq!(tokens.last().unwrap().token_type, TokenType::EOF);
        assert_eq!(tokens.last().unwrap().line, 2);
    }

    #[test]
    fn test_token_display() {
        let tokens: Vec<Token> = Scanner::new("x 3 \"s\"").filter_map(Result::ok).collect();

        assert_eq!(tokens[0].to_string(), "IDENTIFIER x null");
        assert_eq!(tokens[1].to_string(), "NUMBER 3 3.0");
        assert_eq!(tokens[2].to_string(), "STRING \"s\" s");
        assert_eq!(tokens[3].to_string(), "EOF  null");
    }
}
