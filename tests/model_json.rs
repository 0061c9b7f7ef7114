//! Integration tests for model descriptors

use pkode::model::{parse_model, validate_model, ModelDescriptor, ModelError, ModelLibrary, Validator};
use pkode::{simulate, PkodeError};

const DEFAULT_MODEL: &str = r#"{
    "states": [{"name": "C", "unit": "mg/L", "description": "Plasma concentration"}],
    "parameters": [{
        "name": "k",
        "value": 0.2,
        "unit": "1/h",
        "description": "Elimination rate",
        "bounds": {"min": 0.05, "max": 0.5}
    }],
    "equations": [{"lhs": "dC/dt", "rhs": "-k * C"}],
    "initial_conditions": [{"state": "C", "value": 10.0}],
    "time": {"t0": 0.0, "tend": 24.0, "dt": 0.1}
}"#;

// ═══════════════════════════════════════════════════════════════════════════════
// Parsing
// ═══════════════════════════════════════════════════════════════════════════════

mod parsing {
    use super::*;

    #[test]
    fn parses_default_model() {
        let model = parse_model(DEFAULT_MODEL).unwrap();
        assert_eq!(model.state_names(), vec!["C"]);
        assert_eq!(model.parameter_names(), vec!["k"]);
        assert_eq!(model.rhs(), vec!["-k * C"]);
        assert_eq!(model.states[0].unit, "mg/L");
        assert_eq!(model.parameter("k").unwrap().bounds.max, 0.5);
    }

    #[test]
    fn matches_library_model() {
        let parsed = parse_model(DEFAULT_MODEL).unwrap();
        let builtin = ModelLibrary::builtin().get("pk/1cmt-iv").unwrap().clone();
        assert_eq!(parsed.equations, builtin.equations);
        assert_eq!(parsed.time, builtin.time);
        assert_eq!(
            simulate(&parsed).unwrap().y(),
            simulate(&builtin).unwrap().y()
        );
    }

    #[test]
    fn serialization_round_trip() {
        let model = parse_model(DEFAULT_MODEL).unwrap();
        let again = ModelDescriptor::from_str(&model.to_json().unwrap()).unwrap();
        assert_eq!(model, again);
    }

    #[test]
    fn malformed_documents() {
        assert!(matches!(
            parse_model("{"),
            Err(ModelError::ParseError(_))
        ));
        // missing "time"
        let json = r#"{"states": [], "equations": [], "initial_conditions": []}"#;
        assert!(parse_model(json).is_err());
        // bounds are required
        let json = DEFAULT_MODEL.replace(r#""bounds": {"min": 0.05, "max": 0.5}"#, r#""extra": 1"#);
        assert!(parse_model(&json).is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Validation and Overrides
// ═══════════════════════════════════════════════════════════════════════════════

mod validation {
    use super::*;

    #[test]
    fn validates_default_model() {
        let validated = validate_model(DEFAULT_MODEL).unwrap();
        assert_eq!(validated.inner().states.len(), 1);
        let model = validated.into_inner();
        assert!(simulate(&model).is_ok());
    }

    #[test]
    fn lhs_naming_another_state() {
        let json = DEFAULT_MODEL.replace("dC/dt", "dX/dt");
        assert!(validate_model(&json).is_ok());
        let model = parse_model(&json).unwrap();
        assert!(matches!(
            Validator::strict().validate(&model),
            Err(ModelError::LhsMismatch { .. })
        ));
        // the pipeline itself relies on position only
        assert!(simulate(&model).is_ok());
    }

    #[test]
    fn undefined_symbol_surfaces_through_validator() {
        let json = DEFAULT_MODEL.replace("-k * C", "-kk * C");
        match validate_model(&json) {
            Err(ModelError::Expression { index: 0, source, .. }) => {
                assert!(matches!(*source, PkodeError::UndefinedSymbol { .. }));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn overrides_respect_bounds() {
        let model = parse_model(DEFAULT_MODEL).unwrap();
        let slow = model.with_overrides([("k", 0.05)]).unwrap();
        let fast = model.with_overrides([("k", 0.5)]).unwrap();
        let c_slow = simulate(&slow).unwrap().final_state()[0];
        let c_fast = simulate(&fast).unwrap().final_state()[0];
        assert!(c_fast < c_slow);

        let err = model.with_overrides([("k", 0.51)]).unwrap_err();
        assert!(matches!(err, ModelError::ParameterOutOfBounds { .. }));
        let err: PkodeError = err.into();
        assert!(err.to_string().contains("outside its bounds"));
    }

    #[test]
    fn slider_resolution() {
        let model = parse_model(DEFAULT_MODEL).unwrap();
        let step = model.parameter("k").unwrap().slider_step();
        assert!((step - 0.45 / 200.0).abs() < 1e-15);
    }
}
