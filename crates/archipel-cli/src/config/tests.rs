#[cfg(test)]
mod tests {
    use crate::config::loading::env_key_to_field;
    use crate::config::*;
    use figment::Jail;
    use std::path::PathBuf;

    fn load(overrides: &ConfigOverrides) -> figment::error::Result<ArchipelConfig> {
        ArchipelConfig::load(None, overrides).map_err(|e| e.to_string().into())
    }

    #[test]
    fn test_serialization() {
        let config = ArchipelConfig::default();
        let json_val = serde_json::to_value(&config).unwrap();

        // camelCase field names
        assert_eq!(json_val["outDir"], "build/");
        assert_eq!(json_val["contentDir"], "_site/");
        assert_eq!(json_val["debounceMs"], 6);
        assert!(json_val.get("out_dir").is_none());

        let deserialized: ArchipelConfig = serde_json::from_value(json_val).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = serde_json::from_str::<ArchipelConfig>(r#"{ "outdir": "public" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_skip_unset_fields() {
        let overrides = ConfigOverrides {
            port: Some(8080),
            ..ConfigOverrides::default()
        };
        let json_val = serde_json::to_value(&overrides).unwrap();
        assert_eq!(json_val, serde_json::json!({ "port": 8080 }));
    }

    #[test]
    fn test_effective_minify() {
        let mut config = ArchipelConfig::default();
        assert!(config.effective_minify());

        config.watch = true;
        assert!(!config.effective_minify());

        config.minify = true;
        assert!(config.effective_minify());
    }

    #[test]
    fn test_build_options() {
        let config = ArchipelConfig {
            base: "docs".to_string(),
            watch: true,
            ..ArchipelConfig::default()
        };
        let options = config.build_options();
        assert_eq!(options.base, "/docs/");
        assert!(!options.minify);
        assert!(options.out_dir.ends_with("build"));
    }

    #[test]
    fn test_env_key_to_field() {
        assert_eq!(env_key_to_field("PORT"), "port");
        assert_eq!(env_key_to_field("OUT_DIR"), "outDir");
        assert_eq!(env_key_to_field("toolchain_timeout_ms"), "toolchainTimeoutMs");
    }

    #[test]
    fn test_load_defaults() {
        Jail::expect_with(|_jail| {
            let config = load(&ConfigOverrides::default())?;
            assert_eq!(config, ArchipelConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_layering_priority() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE_NAME,
                r#"{ "outDir": "public", "port": 3000, "base": "/docs/" }"#,
            )?;
            jail.set_env("ARCHIPEL_PORT", "5000");
            jail.set_env("ARCHIPEL_DEBOUNCE_MS", "25");

            // File over defaults, env over file
            let config = load(&ConfigOverrides::default())?;
            assert_eq!(config.out_dir, PathBuf::from("public"));
            assert_eq!(config.base, "/docs/");
            assert_eq!(config.port, 5000);
            assert_eq!(config.debounce_ms, 25);

            // CLI over env
            let config = load(&ConfigOverrides {
                port: Some(7000),
                ..ConfigOverrides::default()
            })?;
            assert_eq!(config.port, 7000);
            assert_eq!(config.out_dir, PathBuf::from("public"));
            Ok(())
        });
    }

    #[test]
    fn test_unrelated_env_ignored() {
        Jail::expect_with(|jail| {
            jail.set_env("ARCHIPEL_SOMETHING_ELSE", "1");
            let config = load(&ConfigOverrides::default())?;
            assert_eq!(config.port, default_port());
            Ok(())
        });
    }

    #[test]
    fn test_env_toolchain_array() {
        Jail::expect_with(|jail| {
            jail.set_env("ARCHIPEL_TOOLCHAIN", "[node, tc.mjs]");
            let config = load(&ConfigOverrides::default())?;
            assert_eq!(config.toolchain, vec!["node", "tc.mjs"]);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_config_path() {
        Jail::expect_with(|jail| {
            jail.create_file("site.json", r#"{ "contentDir": "pages" }"#)?;
            let config =
                ArchipelConfig::load(Some("site.json".as_ref()), &ConfigOverrides::default())
                    .map_err(|e| e.to_string())?;
            assert_eq!(config.content_dir, PathBuf::from("pages"));
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_config_path() {
        Jail::expect_with(|_jail| {
            let err = ArchipelConfig::load(Some("nope.json".as_ref()), &ConfigOverrides::default())
                .unwrap_err();
            assert!(err.to_string().contains("nope.json"));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_file_reports_configuration_error() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE_NAME, r#"{ "port": "not a number" }"#)?;
            let err = ArchipelConfig::load(None, &ConfigOverrides::default()).unwrap_err();
            assert!(err.to_string().contains("configuration"));
            Ok(())
        });
    }

    #[test]
    fn test_validation() {
        assert!(ArchipelConfig::default().validate().is_ok());

        assert!(
            ArchipelConfig {
                port: 0,
                ..ArchipelConfig::default()
            }
            .validate()
            .is_err()
        );

        for debounce_ms in [0, 10_001] {
            assert!(
                ArchipelConfig {
                    debounce_ms,
                    ..ArchipelConfig::default()
                }
                .validate()
                .is_err()
            );
        }
        assert!(
            ArchipelConfig {
                debounce_ms: 10_000,
                ..ArchipelConfig::default()
            }
            .validate()
            .is_ok()
        );

        assert!(
            ArchipelConfig {
                toolchain: vec![],
                ..ArchipelConfig::default()
            }
            .validate()
            .is_err()
        );

        assert!(
            ArchipelConfig {
                render_concurrency: 0,
                ..ArchipelConfig::default()
            }
            .validate()
            .is_err()
        );

        assert!(
            ArchipelConfig {
                toolchain_timeout_ms: 0,
                ..ArchipelConfig::default()
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn test_validation_rejects_unsafe_out_dir() {
        let err = ArchipelConfig {
            out_dir: PathBuf::from("_site"),
            ..ArchipelConfig::default()
        }
        .validate()
        .unwrap_err();
        assert!(err.to_string().contains("outDir"));

        assert!(
            ArchipelConfig {
                out_dir: PathBuf::from("."),
                content_dir: PathBuf::from("site"),
                ..ArchipelConfig::default()
            }
            .validate()
            .is_err()
        );
    }
}
