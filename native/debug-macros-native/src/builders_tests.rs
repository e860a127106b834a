#[cfg(test)]
mod tests {
    use semver::Version;

    use crate::builders::{
        build_assert, build_deprecate, build_warn, expand, format_deprecation_message,
        BuildContext, DeprecationMeta, Expansion,
    };
    use crate::error::MacroError;
    use crate::helpers::{HelperKind, HelperTarget};
    use crate::tree::Expr;

    fn meta(entries: &[(&str, &str)]) -> Expr {
        Expr::Object(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), Expr::string(*v)))
                .collect(),
        )
    }

    fn deprecate_with(version: &str, args: Vec<Expr>) -> Result<Expansion, MacroError> {
        let version = Version::parse(version).unwrap();
        build_deprecate(
            &args,
            BuildContext {
                target: &HelperTarget::Console,
                package_version: Some(&version),
            },
        )
    }

    #[test]
    fn assert_leads_with_identifier_arguments() {
        let args = vec![
            Expr::ident("a"),
            Expr::string("literal"),
            Expr::raw("b.c", true),
            Expr::ident("d"),
        ];
        let chain = build_assert(&args, &HelperTarget::Console);
        assert_eq!(chain.leading(), &[Expr::ident("a"), Expr::ident("d")]);
        assert_eq!(
            chain.resolve("_DEBUG").to_string(),
            r#"(_DEBUG && a && d && console.assert(a, "literal", b.c, d))"#
        );
    }

    #[test]
    fn warn_has_no_leading_conditions() {
        let chain = build_warn(&[Expr::ident("msg")], &HelperTarget::External);
        assert!(chain.leading().is_empty());
        assert_eq!(chain.resolve("_DEBUG").to_string(), "(_DEBUG && warn(msg))");
    }

    #[test]
    fn deprecation_message_format() {
        let mut meta = DeprecationMeta {
            id: "foo-dep".to_string(),
            until: ">=2.0.0".to_string(),
            url: Some("http://x".to_string()),
        };
        assert_eq!(
            format_deprecation_message("Foo is bad", &meta),
            "DEPRECATED [foo-dep]: Foo is bad. Will be removed in >=2.0.0. See http://x for more information."
        );
        meta.url = None;
        assert_eq!(
            format_deprecation_message("Foo is bad", &meta),
            "DEPRECATED [foo-dep]: Foo is bad. Will be removed in >=2.0.0."
        );
    }

    #[test]
    fn meta_ignores_unknown_keys() {
        let parsed = DeprecationMeta::from_object(&meta(&[
            ("id", "a"),
            ("since", "1.0.0"),
            ("until", "3.0.0"),
        ]))
        .unwrap();
        assert_eq!(
            parsed,
            DeprecationMeta {
                id: "a".to_string(),
                until: "3.0.0".to_string(),
                url: None,
            }
        );
    }

    #[test]
    fn meta_requires_id_and_until() {
        assert_eq!(
            DeprecationMeta::from_object(&meta(&[("until", "3.0.0")])),
            Err(MacroError::DeprecationMeta { field: "id" })
        );
        assert_eq!(
            DeprecationMeta::from_object(&meta(&[("id", "a")])),
            Err(MacroError::DeprecationMeta { field: "until" })
        );
    }

    #[test]
    fn pending_deprecation_guards_on_predicate() {
        let expansion = deprecate_with(
            "1.2.0",
            vec![
                Expr::string("Foo is bad"),
                Expr::raw("a || b", false),
                meta(&[("id", "foo-dep"), ("until", "2.0.0")]),
            ],
        )
        .unwrap();
        let Expansion::Guarded(chain) = expansion else {
            panic!("expected a guarded expansion");
        };
        assert_eq!(
            chain.resolve("DEBUG").to_string(),
            r#"(DEBUG && (a || b) && console.warn("DEPRECATED [foo-dep]: Foo is bad. Will be removed in 2.0.0."))"#
        );
    }

    #[test]
    fn expired_deprecation_is_removed() {
        let expansion = deprecate_with(
            "2.0.0",
            vec![
                Expr::string("m"),
                Expr::Bool(true),
                meta(&[("id", "x"), ("until", ">=2.0.0")]),
            ],
        )
        .unwrap();
        assert_eq!(expansion, Expansion::Remove);
    }

    #[test]
    fn deprecate_rejects_bad_shapes() {
        let err = deprecate_with("1.0.0", vec![Expr::string("m")]).unwrap_err();
        assert!(matches!(err, MacroError::InvalidDeprecation { .. }));

        let err = deprecate_with(
            "1.0.0",
            vec![
                Expr::ident("message"),
                Expr::Bool(true),
                meta(&[("id", "x"), ("until", "2.0.0")]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, MacroError::InvalidDeprecation { .. }));

        let err = deprecate_with(
            "1.0.0",
            vec![Expr::string("m"), Expr::Bool(true), Expr::ident("meta")],
        )
        .unwrap_err();
        assert!(matches!(err, MacroError::InvalidDeprecation { .. }));
    }

    #[test]
    fn deprecate_reports_bad_range() {
        let err = deprecate_with(
            "1.0.0",
            vec![
                Expr::string("m"),
                Expr::Bool(true),
                meta(&[("id", "x"), ("until", "someday")]),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            MacroError::InvalidVersionRange {
                range: "someday".to_string()
            }
        );
    }

    #[test]
    fn deprecate_without_package_version_stays_guarded() {
        let expansion = expand(
            HelperKind::Deprecate,
            &[
                Expr::string("m"),
                Expr::Bool(true),
                meta(&[("id", "x"), ("until", "2.0.0")]),
            ],
            BuildContext {
                target: &HelperTarget::Console,
                package_version: None,
            },
        )
        .unwrap();
        let Expansion::Guarded(chain) = expansion else {
            panic!("expected a guarded deprecation, got {:?}", expansion);
        };
        assert_eq!(
            chain.resolve("_DEBUG").to_string(),
            r#"(_DEBUG && true && console.warn("DEPRECATED [x]: m. Will be removed in 2.0.0."))"#
        );
    }
}
