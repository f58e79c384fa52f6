#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tokensync::transform::{Pattern, PatternSegment, ValueFn, names, values};
    use tokensync::*;

    fn token(path: &[&str], value: serde_json::Value) -> Token {
        let original = json!({ "value": value.clone() });
        let node = json!({ "value": value, "original": original, "path": path });
        let tree = TokenTree::from_json(json!({ "leaf": node })).unwrap();
        tree.get("leaf").unwrap().clone()
    }

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    // ========================================================================
    // Pattern Matching Tests
    // ========================================================================

    #[test]
    fn test_parse_pattern_segments() {
        let pattern = Pattern::from("theme/*/palette");
        assert_eq!(
            pattern.segments(),
            &[
                PatternSegment::Literal("theme".into()),
                PatternSegment::Wildcard,
                PatternSegment::Literal("palette".into()),
            ]
        );
        assert_eq!(pattern.to_string(), "theme/*/palette");
    }

    #[test]
    fn test_literal_prefix_matches_longer_paths() {
        let pattern = Pattern::from("color");
        assert!(pattern.matches(&["color", "base", "black"]));
        assert!(pattern.matches(&["color"]));
        assert!(!pattern.matches(&["colors", "base"]));
    }

    #[test]
    fn test_wildcard_matches_any_segment() {
        let pattern = Pattern::from("theme/*");
        assert!(pattern.matches(&["theme", "light", "background"]));
        assert!(pattern.matches(&["theme", "dark", "background"]));
        assert!(!pattern.matches(&["corner", "small"]));
    }

    #[test]
    fn test_wildcard_needs_a_segment() {
        assert!(!Pattern::from("theme/*").matches(&["theme"]));
    }

    #[test]
    fn test_inner_wildcard() {
        let pattern = Pattern::from("theme/*/background");
        assert!(pattern.matches(&["theme", "light", "background"]));
        assert!(!pattern.matches(&["theme", "light", "foreground"]));
    }

    // ========================================================================
    // Registry Tests
    // ========================================================================

    #[test]
    fn test_first_registered_rule_wins() {
        // The general rule is registered first, so it shadows the specific one
        let registry = TransformRegistry::new()
            .with_rule(TransformRule::new("theme/*", VariableType::Color, names::join("/")))
            .with_rule(TransformRule::new(
                "theme/light",
                VariableType::Color,
                names::prefixed("light/", 2, "/"),
            ));

        let rule = registry.rule_for(&path(&["theme", "light", "background"])).unwrap();
        assert_eq!(rule.pattern.to_string(), "theme/*");
        assert_eq!(rule.name(&path(&["theme", "light", "background"])), "theme/light/background");
    }

    #[test]
    fn test_specific_rule_wins_when_registered_first() {
        let registry = TransformRegistry::new()
            .with_rule(TransformRule::new(
                "theme/light",
                VariableType::Color,
                names::prefixed("light/", 2, "/"),
            ))
            .with_rule(TransformRule::new("theme/*", VariableType::Color, names::join("/")));

        let rule = registry.rule_for(&path(&["theme", "light", "background"])).unwrap();
        assert_eq!(rule.pattern.to_string(), "theme/light");
        let rule = registry.rule_for(&path(&["theme", "dark", "background"])).unwrap();
        assert_eq!(rule.pattern.to_string(), "theme/*");
    }

    #[test]
    fn test_resolve_unmatched_is_none() {
        let registry = SyncConfig::default().registry;
        let leaf = token(&["size", "base"], json!("16px"));
        assert!(registry.resolve(&leaf).unwrap().is_none());
    }

    #[test]
    fn test_resolve_default_theme_rule() {
        let registry = SyncConfig::default().registry;
        let leaf = token(&["theme", "light", "card", "border"], json!("#ffffff"));
        let resolved = registry.resolve(&leaf).unwrap().unwrap();

        assert_eq!(resolved.name, "themed/card-border");
        assert_eq!(resolved.rule.target_type, VariableType::Color);
        assert_eq!(resolved.value, VariableValue::Color(Rgba::from_rgb8(255, 255, 255, 1.0)));
    }

    #[test]
    fn test_raw_values_pass_through() {
        let rule = TransformRule::new("x", VariableType::Float, names::join("/"));
        assert_eq!(
            rule.value(&token(&["x"], json!(12))).unwrap(),
            VariableValue::Float(12.0)
        );
        assert_eq!(
            rule.value(&token(&["x"], json!({ "r": 1.0, "g": 0.5, "b": 0.0 }))).unwrap(),
            VariableValue::Color(Rgba { r: 1.0, g: 0.5, b: 0.0, a: 1.0 })
        );
        assert!(rule.value(&token(&["x"], json!([1, 2]))).is_err());
    }

    #[test]
    fn test_custom_closures() {
        let rule = TransformRule::new("z", VariableType::String, |p: &[String]| p.join("::").to_uppercase())
            .with_value(|t: &Token| Ok(VariableValue::String(format!("{}!", t.original_value))));
        let leaf = token(&["z", "index"], json!("top"));

        assert_eq!(rule.name(&leaf.path), "Z::INDEX");
        assert_eq!(rule.value(&leaf).unwrap(), VariableValue::String("top!".into()));
    }

    #[test]
    fn test_shared_value_fn_across_rules() {
        let to_rgba: ValueFn = Arc::new(values::color);
        let registry = TransformRegistry::new()
            .with_rule(
                TransformRule::new("brand", VariableType::Color, names::join("/"))
                    .with_value_fn(to_rgba.clone()),
            )
            .with_rule(
                TransformRule::new("accent", VariableType::Color, names::join("-"))
                    .with_value_fn(to_rgba),
            );

        let brand = registry.resolve(&token(&["brand", "primary"], json!("#ff0000"))).unwrap().unwrap();
        let accent = registry.resolve(&token(&["accent", "primary"], json!("#ff0000"))).unwrap().unwrap();
        assert_eq!(brand.name, "brand/primary");
        assert_eq!(accent.name, "accent-primary");
        assert_eq!(brand.value, accent.value);
    }

    // ========================================================================
    // Name Function Tests
    // ========================================================================

    #[test]
    fn test_prefixed_name_skips_segments() {
        let name = names::prefixed("themed/", 2, "-");
        assert_eq!(name(&path(&["theme", "light", "background"])), "themed/background");
        assert_eq!(name(&path(&["theme", "dark", "text", "muted"])), "themed/text-muted");
        assert_eq!(name(&path(&["theme"])), "themed/");
    }

    // ========================================================================
    // Value Transform Tests
    // ========================================================================

    #[test]
    fn test_dimension_strips_units() {
        let cases = [
            ("4px", 4.0),
            ("8px", 8.0),
            ("1.5rem", 1.5),
            ("-2px", -2.0),
            (".25em", 0.25),
            ("50%", 50.0),
            ("12", 12.0),
        ];
        for (raw, expected) in cases {
            assert_eq!(
                values::dimension(&token(&["corner", "x"], json!(raw))).unwrap(),
                VariableValue::Float(expected),
                "{}",
                raw
            );
        }
    }

    #[test]
    fn test_dimension_rejects_non_strings() {
        let err = values::dimension(&token(&["corner", "x"], json!(4))).unwrap_err();
        assert_eq!(
            err,
            TransformError::InvalidTokenShape {
                path: "corner.x".into(),
                expected: "a string",
                found: "integer".into(),
            }
        );
    }

    #[test]
    fn test_dimension_rejects_garbage() {
        assert!(values::dimension(&token(&["corner", "x"], json!("px4"))).is_err());
        assert!(values::dimension(&token(&["corner", "x"], json!("4 px 2"))).is_err());
    }

    #[test]
    fn test_color_defaults_to_opaque() {
        let value = values::color(&token(&["color", "x"], json!("#212121"))).unwrap();
        let VariableValue::Color(color) = value else {
            panic!("expected a color");
        };
        assert!((color.r - 0.12941).abs() < 1e-4);
        assert_eq!(color.a, 1.0);
        assert!(value.is_referenceable());
    }

    #[test]
    fn test_color_threads_token_alpha() {
        let mut leaf = token(&["color", "x"], json!("#212121"));
        leaf.alpha = Some(0.4);
        let value = values::color(&leaf).unwrap();

        assert!(matches!(value, VariableValue::Color(c) if c.a == 0.4));
        assert!(!value.is_referenceable());
    }

    #[test]
    fn test_color_keeps_literal_alpha() {
        let value = values::color(&token(&["color", "x"], json!("rgba(0, 0, 0, 0.25)"))).unwrap();
        assert!(matches!(value, VariableValue::Color(c) if c.a == 0.25));
    }

    #[test]
    fn test_color_rejects_bad_input() {
        assert!(values::color(&token(&["color", "x"], json!("#12"))).is_err());
        assert!(values::color(&token(&["color", "x"], json!(true))).is_err());
    }
}
