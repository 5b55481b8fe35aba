#[cfg(test)]
mod tests {
    use crate::cli::validation::parse_toolchain;
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_parse_toolchain_splits_on_whitespace() {
        let parsed = parse_toolchain("node  toolchain/archipel-toolchain.mjs").unwrap();
        assert_eq!(parsed.0, vec!["node", "toolchain/archipel-toolchain.mjs"]);
    }

    #[test]
    fn test_parse_toolchain_empty() {
        assert_eq!(
            parse_toolchain("").unwrap_err(),
            "Toolchain command cannot be empty"
        );
        assert!(parse_toolchain("   ").is_err());
    }

    #[test]
    fn test_build_defaults_leave_config_untouched() {
        let cli = Cli::try_parse_from(["archipel", "build"]).unwrap();
        let Command::Build(args) = cli.command else {
            panic!("expected build command");
        };
        let overrides = args.overrides();
        assert!(overrides.base.is_none());
        assert!(overrides.out_dir.is_none());
        assert!(overrides.minify.is_none());
        assert!(overrides.watch.is_none());
        assert!(overrides.format_html.is_none());
    }

    #[test]
    fn test_build_flags() {
        let cli = Cli::try_parse_from([
            "archipel",
            "build",
            "--out-dir",
            "public",
            "--content-dir",
            "site",
            "--base",
            "/docs/",
            "--minify",
            "--no-format",
            "--strict",
            "--toolchain",
            "node tc.mjs",
        ])
        .unwrap();
        let Command::Build(args) = cli.command else {
            panic!("expected build command");
        };
        let overrides = args.overrides();
        assert_eq!(overrides.out_dir, Some(PathBuf::from("public")));
        assert_eq!(overrides.content_dir, Some(PathBuf::from("site")));
        assert_eq!(overrides.base.as_deref(), Some("/docs/"));
        assert_eq!(overrides.minify, Some(true));
        assert_eq!(overrides.format_html, Some(false));
        assert_eq!(overrides.strict, Some(true));
        assert_eq!(
            overrides.toolchain,
            Some(vec!["node".to_string(), "tc.mjs".to_string()])
        );
    }

    #[test]
    fn test_build_watch_with_port() {
        let cli = Cli::try_parse_from(["archipel", "build", "--watch", "--port", "8080"]).unwrap();
        let Command::Build(args) = cli.command else {
            panic!("expected build command");
        };
        let overrides = args.overrides();
        assert_eq!(overrides.watch, Some(true));
        assert_eq!(overrides.port, Some(8080));
    }

    #[test]
    fn test_port_requires_watch_for_build() {
        assert!(Cli::try_parse_from(["archipel", "build", "--port", "8080"]).is_err());
    }

    #[test]
    fn test_port_zero_rejected() {
        assert!(Cli::try_parse_from(["archipel", "dev", "--port", "0"]).is_err());
    }

    #[test]
    fn test_dev_always_watches() {
        let cli = Cli::try_parse_from(["archipel", "dev", "--debounce-ms", "50"]).unwrap();
        let Command::Dev(args) = cli.command else {
            panic!("expected dev command");
        };
        let overrides = args.overrides();
        assert_eq!(overrides.watch, Some(true));
        assert_eq!(overrides.debounce_ms, Some(50));
    }

    #[test]
    fn test_global_flags() {
        let cli =
            Cli::try_parse_from(["archipel", "dev", "-v", "--no-color", "-c", "site.json"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.no_color);
        assert_eq!(cli.config, Some(PathBuf::from("site.json")));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["archipel", "build", "-v", "-q"]).is_err());
    }
}
