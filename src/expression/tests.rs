use super::*;
use std::collections::HashMap;

fn eval_t(source: &str, t: f64) -> f64 {
    compile::<&str>(source, &[]).unwrap().evaluate(&[("t", t)][..])
}

mod grammar {
    use super::*;

    #[test]
    fn ternary_on_time() {
        let expr = compile::<&str>("t > 0 ? 1 : -1", &[]).unwrap();
        assert_eq!(expr.evaluate(&[("t", 1.0)][..]), 1.0);
        assert_eq!(expr.evaluate(&[("t", -1.0)][..]), -1.0);
    }

    #[test]
    fn math_prefixed_sine_peaks_at_quarter_period() {
        let v = eval_t("Math.sin(2*Math.PI*50*t)", 1.0 / 200.0);
        assert!((v - 1.0).abs() < 1e-12, "got {v}");
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(eval_t("1 + 2 * 3", 0.0), 7.0);
        assert_eq!(eval_t("2 ** 3 ** 2", 0.0), 512.0);
        assert_eq!(eval_t("-2 ** 2", 0.0), -4.0);
        assert_eq!(eval_t("(1 + 2) * 3", 0.0), 9.0);
        assert_eq!(eval_t("7 % 4", 0.0), 3.0);
        assert_eq!(eval_t("1 < 2 == 1", 0.0), 1.0);
    }

    #[test]
    fn scientific_literals() {
        assert_eq!(eval_t("1.5e3", 0.0), 1500.0);
        assert_eq!(eval_t(".5 + 1.", 0.0), 1.5);
        assert_eq!(eval_t("2E-1", 0.0), 0.2);
    }

    #[test]
    fn nested_ternary_is_right_associative() {
        let src = "t < 0 ? -1 : t == 0 ? 0 : 1";
        assert_eq!(eval_t(src, -3.0), -1.0);
        assert_eq!(eval_t(src, 0.0), 0.0);
        assert_eq!(eval_t(src, 3.0), 1.0);
    }

    #[test]
    fn logical_operators_short_circuit_to_operand() {
        assert_eq!(eval_t("0 && 5", 0.0), 0.0);
        assert_eq!(eval_t("2 && 5", 0.0), 5.0);
        assert_eq!(eval_t("0 || 3", 0.0), 3.0);
        assert_eq!(eval_t("4 || 3", 0.0), 4.0);
        assert_eq!(eval_t("!0", 0.0), 1.0);
        assert_eq!(eval_t("!7", 0.0), 0.0);
        // Right side would divide by zero; it must not be evaluated into the result.
        assert_eq!(eval_t("0 && 1/0", 0.0), 0.0);
    }

    #[test]
    fn nan_condition_counts_as_true() {
        assert_eq!(eval_t("sqrt(-1) ? 1 : 2", 0.0), 1.0);
        assert_eq!(eval_t("!sqrt(-1)", 0.0), 0.0);
        assert_eq!(eval_t("sqrt(-1) && 3", 0.0), 3.0);
        assert_eq!(eval_t("(0 || sqrt(-1)) ? 4 : 5", 0.0), 4.0);
    }

    #[test]
    fn empty_source_is_zero() {
        assert_eq!(eval_t("   ", 0.0), 0.0);
    }
}

mod functions {
    use super::*;

    #[test]
    fn table_functions() {
        assert_eq!(eval_t("max(1, 5, 3)", 0.0), 5.0);
        assert_eq!(eval_t("min(4, -2)", 0.0), -2.0);
        assert_eq!(eval_t("clamp(12, 0, 10)", 0.0), 10.0);
        assert_eq!(eval_t("clamp(-1, 0, 10)", 0.0), 0.0);
        assert_eq!(eval_t("round(2.5)", 0.0), 3.0);
        assert_eq!(eval_t("round(-2.5)", 0.0), -2.0);
        assert_eq!(eval_t("sign(-3) + sign(0)", 0.0), -1.0);
        assert_eq!(eval_t("Math.abs(-2) + pow(2, 3)", 0.0), 10.0);
        assert!((eval_t("atan2(1, 1) * 4", 0.0) - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn constants() {
        assert!((eval_t("tau - 2 * pi", 0.0)).abs() < 1e-12);
        assert!((eval_t("log(E)", 0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn math_prefixed_constants() {
        let pi = std::f64::consts::PI;
        assert_eq!(eval_t("Math.pi", 0.0), pi);
        assert_eq!(eval_t("Math.PI", 0.0), pi);
        assert_eq!(eval_t("Math.tau", 0.0), 2.0 * pi);
        assert_eq!(eval_t("Math.TAU", 0.0), 2.0 * pi);
        assert_eq!(eval_t("Math.e", 0.0), std::f64::consts::E);
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let err = compile::<&str>("pow(2)", &[]).unwrap_err();
        assert!(err.message.contains("expects 2"), "{err}");
        assert!(compile::<&str>("max()", &[]).is_err());
    }
}

mod sandbox {
    use super::*;

    #[test]
    fn unknown_function_is_rejected() {
        let err = compile::<&str>("alert(1)", &[]).unwrap_err();
        assert_eq!(err.message, "Unknown function \"alert\"");
        assert_eq!(err.position, 0);
    }

    #[test]
    fn unknown_identifier_reports_position() {
        let err = compile::<&str>("t + window", &[]).unwrap_err();
        assert_eq!(err.message, "Unknown identifier \"window\"");
        assert_eq!(err.position, 4);
    }

    #[test]
    fn bare_function_name_needs_call() {
        let err = compile::<&str>("sin + 1", &[]).unwrap_err();
        assert_eq!(err.message, "Function \"sin\" must be called with ()");
    }

    #[test]
    fn member_chains_and_calls_on_results_fail() {
        assert!(compile::<&str>("Math.constructor", &[]).is_err());
        assert!(compile::<&str>("sin(1)(2)", &[]).is_err());
        assert!(compile::<&str>("(1)(2)", &[]).is_err());
    }

    #[test]
    fn syntax_errors_carry_positions() {
        let err = compile::<&str>("1 + $", &[]).unwrap_err();
        assert_eq!(err.message, "Unexpected character \"$\"");
        assert_eq!(err.position, 4);

        let err = compile::<&str>("(1 + 2", &[]).unwrap_err();
        assert_eq!(err.message, "Expected \")\"");

        let err = compile::<&str>("1 2", &[]).unwrap_err();
        assert!(err.message.starts_with("Unexpected token"), "{err}");
        assert_eq!(err.position, 2);

        assert!(compile::<&str>("1e999", &[]).is_err());
    }

    #[test]
    fn variables_must_be_allowed() {
        assert!(compile::<&str>("k * t", &[]).is_err());
        let expr = compile("k * t", &["k"]).unwrap();
        let mut vars = HashMap::new();
        vars.insert("k".to_string(), 3.0);
        vars.insert("t".to_string(), 2.0);
        assert_eq!(expr.evaluate(&vars), 6.0);
    }

    #[test]
    fn invalid_allowed_names_are_ignored() {
        assert!(compile("a.b", &["a.b"]).is_err());
    }

    #[test]
    fn allowed_variable_shadows_constant() {
        let expr = compile("e", &["e"]).unwrap();
        assert_eq!(expr.evaluate(&[("e", 4.0)][..]), 4.0);
    }

    #[test]
    fn missing_bindings_and_non_finite_results_become_zero() {
        let expr = compile("k + 1", &["k"]).unwrap();
        assert_eq!(expr.evaluate(&HashMap::<String, f64>::new()), 1.0);
        assert_eq!(eval_t("1 / 0", 0.0), 0.0);
        assert_eq!(eval_t("sqrt(-1)", 0.0), 0.0);
    }

    #[test]
    fn variable_name_rules() {
        assert!(is_valid_variable_name("speed_2"));
        assert!(!is_valid_variable_name("2fast"));
        assert!(!is_valid_variable_name("constructor"));
        assert!(!is_valid_variable_name("a.b"));
    }
}

mod limits {
    use super::*;

    fn nested_too_deeply(source: &str) -> bool {
        match compile::<&str>(source, &[]) {
            Err(err) => err.message.contains("nested too deeply"),
            Ok(_) => false,
        }
    }

    #[test]
    fn deep_parentheses_are_rejected() {
        let source = format!("{}1{}", "(".repeat(5_000), ")".repeat(5_000));
        assert!(nested_too_deeply(&source));
    }

    #[test]
    fn long_unary_and_operator_chains_are_rejected() {
        assert!(nested_too_deeply(&format!("{}1", "-".repeat(5_000))));
        assert!(nested_too_deeply(&format!("1{}", "+1".repeat(5_000))));
        assert!(nested_too_deeply(&format!("2{}", " ** 1".repeat(5_000))));
        assert!(nested_too_deeply(&format!("{}1{}", "sin(".repeat(5_000), ")".repeat(5_000))));
    }

    #[test]
    fn moderate_nesting_still_compiles() {
        let source = format!("{}t{}", "(".repeat(100), " + 1)".repeat(100));
        assert_eq!(eval_t(&source, 2.0), 102.0);
        let sum = format!("0{}", " + 1".repeat(200));
        assert_eq!(eval_t(&sum, 0.0), 200.0);
    }
}
