#[cfg(test)]
mod tests {
    use crate::analysis::ast::Function;
    use crate::analysis::symbol_table::SymbolKind;
    use crate::analysis::AstBuilder;
    use crate::error::{CompileError, ErrorKind};
    use crate::execution::ExecutionContext;
    use crate::parser::Parser;
    use crate::source::SourceBuffer;

    fn analyze(input: &str) -> Result<Function, CompileError> {
        let source = SourceBuffer::new(input);
        let mut parser = Parser::new(&source);
        let tree = parser
            .parse_function_definition()
            .unwrap_or_else(|| panic!("Parser error: {:?}", parser.error()));
        AstBuilder::build(&source, &tree)
    }

    fn analyze_ok(input: &str) -> Function {
        analyze(input).expect("analysis failed")
    }

    fn analyze_error(input: &str) -> ErrorKind {
        analyze(input).expect_err("expected an analysis failure").kind
    }

    fn execute(input: &str, parameters: &[i64]) -> Option<i64> {
        let function = analyze_ok(input);
        let mut context = ExecutionContext::new(&function.symbols, parameters);
        function.evaluate(&mut context)
    }

    // === Symbol table ===

    #[test]
    fn symbol_table_partitioning() {
        let function = analyze_ok(
            "PARAM width, height, depth;\n\
             VAR volume, some;\n\
             CONST density = 2400;\n\
             BEGIN\n\
             volume := width * height * depth;\n\
             some := volume + width * 10 + height;\n\
             RETURN density * volume\n\
             END.",
        );
        let symbols = &function.symbols;
        assert_eq!(symbols.number_of_parameters(), 3);
        assert_eq!(symbols.number_of_variables(), 2);
        assert_eq!(symbols.number_of_constants(), 1);
        assert_eq!(symbols.size(), 6);

        // Ids are insertion indices and the table is partitioned in phase order.
        let kinds: Vec<SymbolKind> = symbols.iter().map(|symbol| symbol.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SymbolKind::Parameter,
                SymbolKind::Parameter,
                SymbolKind::Parameter,
                SymbolKind::Variable,
                SymbolKind::Variable,
                SymbolKind::Constant,
            ]
        );
        for (index, symbol) in symbols.iter().enumerate() {
            assert_eq!(symbol.id, index);
        }

        let density = symbols.get(5);
        assert!(density.initialized);
        assert_eq!(density.constant_value, Some(2400));
    }

    #[test]
    fn find_by_name() {
        let source = SourceBuffer::new("PARAM a, b; VAR x; BEGIN x := a; RETURN x + b END.");
        let mut parser = Parser::new(&source);
        let tree = parser.parse_function_definition().unwrap();
        let function = AstBuilder::build(&source, &tree).unwrap();

        assert_eq!(function.symbols.find(&source, "b"), Some(1));
        assert_eq!(function.symbols.find(&source, "x"), Some(2));
        assert_eq!(function.symbols.find(&source, "nope"), None);
    }

    #[test]
    fn assignment_initializes_variable() {
        let source = SourceBuffer::new("VAR x; BEGIN x := 1; RETURN x END.");
        let mut parser = Parser::new(&source);
        let tree = parser.parse_function_definition().unwrap();
        let function = AstBuilder::build(&source, &tree).unwrap();
        let x = function.symbols.find(&source, "x").unwrap();
        assert!(function.symbols.get(x).initialized);
    }

    // === Semantic rules ===

    #[test]
    fn missing_return_statement() {
        assert_eq!(
            analyze_error("VAR density; BEGIN density := 10 END."),
            ErrorKind::MissingReturn
        );
    }

    #[test]
    fn undeclared_identifier() {
        assert_eq!(
            analyze_error("BEGIN RETURN density END."),
            ErrorKind::UndeclaredIdentifier
        );
    }

    #[test]
    fn undeclared_assignment_target() {
        assert_eq!(
            analyze_error("BEGIN x := 1; RETURN 0 END."),
            ErrorKind::UndeclaredIdentifier
        );
    }

    #[test]
    fn assignment_to_constant() {
        assert_eq!(
            analyze_error("CONST density = 1; BEGIN density := 10; RETURN density END."),
            ErrorKind::AssignmentToConstant
        );
    }

    #[test]
    fn uninitialized_variable_use() {
        assert_eq!(
            analyze_error("VAR density; BEGIN RETURN density END."),
            ErrorKind::UninitializedVariable
        );
        // Parameters are initialized from the call arguments.
        assert!(analyze("PARAM density; BEGIN RETURN density END.").is_ok());
    }

    #[test]
    fn self_referential_initialization_is_rejected() {
        // The right-hand side sees the flags as they were on statement entry.
        assert_eq!(
            analyze_error("VAR x; BEGIN x := x + 1; RETURN x END."),
            ErrorKind::UninitializedVariable
        );
    }

    #[test]
    fn redeclaration_within_a_section() {
        assert_eq!(
            analyze_error("PARAM d, d; BEGIN RETURN 0 END."),
            ErrorKind::Redeclaration
        );
    }

    #[test]
    fn redeclaration_across_sections() {
        assert_eq!(
            analyze_error("PARAM d; CONST d = 2; BEGIN RETURN 0 END."),
            ErrorKind::Redeclaration
        );
    }

    #[test]
    fn redeclaration_points_at_original_declaration() {
        let source = SourceBuffer::new("PARAM d; VAR d; BEGIN RETURN 0 END.");
        let mut parser = Parser::new(&source);
        let tree = parser.parse_function_definition().unwrap();
        let error = AstBuilder::build(&source, &tree).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Redeclaration);
        assert_eq!(source.fragment_str(error.fragment), "d");
        assert_eq!(error.fragment.begin().column, 6);
    }

    // === Evaluation ===

    #[test]
    fn basic_evaluation() {
        assert_eq!(execute("PARAM a, b; BEGIN RETURN a + b END.", &[1, 2]), Some(3));
        assert_eq!(
            execute(
                "PARAM width, height, depth;\n\
                 VAR volume, some;\n\
                 CONST density = 2400;\n\
                 BEGIN\n\
                 volume := width * height * depth;\n\
                 some := volume + width * 10 + height;\n\
                 RETURN density * volume\n\
                 END.",
                &[10, 10, 10],
            ),
            Some(2_400_000)
        );
    }

    #[test]
    fn execution_halts_at_first_return() {
        assert_eq!(
            execute("VAR x; BEGIN x := 1; RETURN x; x := 2; RETURN x END.", &[]),
            Some(1)
        );
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(execute("CONST a = 0; BEGIN RETURN 1000 / a END.", &[]), None);
        assert_eq!(
            execute("VAR a; BEGIN a := 10; RETURN 1000 / (a - 10) END.", &[]),
            None
        );
        assert_eq!(execute("BEGIN RETURN 1000 / 0 END.", &[]), None);
        assert_eq!(execute("BEGIN RETURN 1000 / -0 END.", &[]), None);
    }

    #[test]
    fn division_truncates_toward_zero() {
        assert_eq!(execute("PARAM a, b; BEGIN RETURN a / b END.", &[7, 2]), Some(3));
        assert_eq!(execute("PARAM a, b; BEGIN RETURN a / b END.", &[-7, 2]), Some(-3));
    }

    #[test]
    fn right_grouped_subtraction() {
        // `10 - 4 - 3` groups as `10 - (4 - 3)`.
        assert_eq!(execute("BEGIN RETURN 10 - 4 - 3 END.", &[]), Some(9));
    }

    #[test]
    #[should_panic(expected = "argument count")]
    fn argument_count_mismatch_is_a_programming_error() {
        execute("PARAM a; BEGIN RETURN a END.", &[1, 2]);
    }
}
