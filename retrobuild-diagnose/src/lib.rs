//! Diagnostic classifier.
//!
//! Maps the raw stderr of a failed toolchain invocation to one
//! [`Diagnostic`] taxonomy value plus whatever entities the text named.
//! Scanning is line-oriented, top to bottom: the first line matching any
//! pattern in the fixed, ordered table wins and the scan stops. Later
//! patterns are never tried once one matches.
//!
//! The only stateful rule is the manifest syntax error, which reads its line
//! number from the line *after* the matched one.

use regex::Regex;
use retrobuild_types::Diagnostic;
use std::sync::LazyLock;

static INVALID_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^error: failed to select a version for the requirement `([^`]+) = "?([^"`]+)"?`"#)
        .expect("invalid-version pattern")
});

static INVALID_VERSION_FOR_REQUIRED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"error: failed to select a version for `([^`]+)`")
        .expect("invalid-version-for-required pattern")
});

static PRECISE_DOWNGRADE_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"cargo update -p (\S+)@(\S+) --precise ver").expect("downgrade-hint pattern")
});

static REQUIRES_NEWER_RUSTC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^error: package `(\S+) v([^`]+)` cannot be built because it requires rustc")
        .expect("requires-newer-rustc pattern")
});

static MANIFEST_PARSE_ERROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TOML parse error at line (\d+),").expect("parse-error pattern"));

static GENERIC_PARSE_ERROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^error: expected").expect("generic-parse-error pattern"));

static MANIFEST_LINE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Cargo\.toml:(\d+):").expect("manifest-line-ref pattern"));

static NO_MATCHING_PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^error: no matching package named `([^`]+)` found")
        .expect("no-matching-package pattern")
});

static UNSTABLE_FEATURE_GATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s+The package requires the Cargo feature called `([^`]+)`, but that feature is not stabilized in this version of Cargo",
    )
    .expect("unstable-feature-gate pattern")
});

static EDITION_TOO_NEW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+this version of Cargo is older than the `([^`]+)` edition")
        .expect("edition-too-new pattern")
});

static MULTIPLE_PACKAGE_VERSIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^error: There are multiple `([^`]+)` packages in your project, and the specification `([^`]+)` is ambiguous",
    )
    .expect("multiple-package-versions pattern")
});

/// Classify one diagnostic text. First matching line wins; a text with no
/// matching line is [`Diagnostic::Unknown`].
pub fn classify(text: &str) -> Diagnostic {
    let lines: Vec<&str> = text.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = INVALID_VERSION.captures(line) {
            return Diagnostic::InvalidVersion {
                name: caps[1].to_string(),
                version: caps[2].to_string(),
            };
        }

        if let Some(caps) = INVALID_VERSION_FOR_REQUIRED.captures(line) {
            return Diagnostic::InvalidVersionForRequiredPackage {
                name: caps[1].to_string(),
            };
        }

        if let Some(caps) = PRECISE_DOWNGRADE_HINT.captures(line) {
            return Diagnostic::VersionTooHigh {
                name: caps[1].to_string(),
                version: caps[2].to_string(),
            };
        }

        if let Some(caps) = REQUIRES_NEWER_RUSTC.captures(line) {
            return Diagnostic::VersionTooHigh {
                name: caps[1].to_string(),
                version: caps[2].to_string(),
            };
        }

        if let Some(caps) = MANIFEST_PARSE_ERROR.captures(line) {
            if let Ok(n) = caps[1].parse() {
                return Diagnostic::InvalidCrate { line: n };
            }
        }

        // The generic parse error names the manifest line on the next line,
        // not the matched one. Without that follow-up the line is not
        // actionable and scanning continues.
        if GENERIC_PARSE_ERROR.is_match(line) {
            if let Some(next) = lines.get(i + 1) {
                if let Some(caps) = MANIFEST_LINE_REF.captures(next) {
                    if let Ok(n) = caps[1].parse() {
                        return Diagnostic::SyntaxErrorCrate { line: n };
                    }
                }
            }
        }

        if let Some(caps) = NO_MATCHING_PACKAGE.captures(line) {
            return Diagnostic::NoMatchingPackage {
                name: caps[1].to_string(),
            };
        }

        if let Some(caps) = UNSTABLE_FEATURE_GATE.captures(line) {
            return Diagnostic::WrongEdition {
                feature: caps[1].to_string(),
            };
        }

        if let Some(caps) = EDITION_TOO_NEW.captures(line) {
            return Diagnostic::EditionTooNew {
                edition: caps[1].to_string(),
            };
        }

        if let Some(caps) = MULTIPLE_PACKAGE_VERSIONS.captures(line) {
            return Diagnostic::MultiplePackageVersions {
                name: caps[1].to_string(),
            };
        }
    }

    Diagnostic::Unknown
}

#[cfg(test)]
mod tests {
    use super::classify;
    use pretty_assertions::assert_eq;
    use retrobuild_types::Diagnostic;

    #[test]
    fn no_matching_line_is_unknown() {
        assert_eq!(classify(""), Diagnostic::Unknown);
        assert_eq!(classify("warning: unused variable `x`"), Diagnostic::Unknown);
        assert_eq!(
            classify("error[E0308]: mismatched types\n --> src/lib.rs:4:5"),
            Diagnostic::Unknown
        );
    }

    #[test]
    fn invalid_version_extracts_name_and_version() {
        let text = r#"error: failed to select a version for the requirement `foo = "1.2.3"`
candidate versions found which didn't match: 2.0.0"#;
        assert_eq!(
            classify(text),
            Diagnostic::InvalidVersion {
                name: "foo".to_string(),
                version: "1.2.3".to_string(),
            }
        );
    }

    #[test]
    fn invalid_version_keeps_exactness_marker_inside_quotes() {
        let text = r#"error: failed to select a version for the requirement `tokio = "=1.49.0"`"#;
        assert_eq!(
            classify(text),
            Diagnostic::InvalidVersion {
                name: "tokio".to_string(),
                version: "=1.49.0".to_string(),
            }
        );
    }

    #[test]
    fn invalid_version_for_required_package() {
        let text = "    error: failed to select a version for `windows-sys`.";
        assert_eq!(
            classify(text),
            Diagnostic::InvalidVersionForRequiredPackage {
                name: "windows-sys".to_string(),
            }
        );
    }

    #[test]
    fn precise_downgrade_hint_is_version_too_high() {
        let text = "note: to fix, run\n    cargo update -p native-tls@0.2.14 --precise ver";
        assert_eq!(
            classify(text),
            Diagnostic::VersionTooHigh {
                name: "native-tls".to_string(),
                version: "0.2.14".to_string(),
            }
        );
    }

    #[test]
    fn requires_newer_rustc_is_version_too_high() {
        let text = "error: package `ring v0.17.14` cannot be built because it requires rustc 1.66.0 or newer, while the currently active rustc version is 1.63.0";
        assert_eq!(
            classify(text),
            Diagnostic::VersionTooHigh {
                name: "ring".to_string(),
                version: "0.17.14".to_string(),
            }
        );
    }

    #[test]
    fn toml_parse_error_names_the_line() {
        let text = "error: failed to parse manifest at `/work/project/Cargo.toml`\n\nCaused by:\n  TOML parse error at line 12, column 1";
        assert_eq!(classify(text), Diagnostic::InvalidCrate { line: 12 });
    }

    #[test]
    fn syntax_error_reads_line_number_from_the_next_line() {
        let text = "error: expected newline, found an identifier\n --> Cargo.toml:7:14";
        assert_eq!(classify(text), Diagnostic::SyntaxErrorCrate { line: 7 });
    }

    #[test]
    fn syntax_error_without_follow_up_line_keeps_scanning() {
        let text = "error: expected newline, found an identifier\nerror: no matching package named `leftpad` found";
        assert_eq!(
            classify(text),
            Diagnostic::NoMatchingPackage {
                name: "leftpad".to_string(),
            }
        );
    }

    #[test]
    fn no_matching_package_extracts_name() {
        let text = "error: no matching package named `quickcheck_macros` found\nlocation searched: registry `crates-io`";
        assert_eq!(
            classify(text),
            Diagnostic::NoMatchingPackage {
                name: "quickcheck_macros".to_string(),
            }
        );
    }

    #[test]
    fn unstable_feature_gate_is_wrong_edition() {
        let text = "error: failed to parse manifest\n\nCaused by:\n  The package requires the Cargo feature called `edition2024`, but that feature is not stabilized in this version of Cargo (1.63.0).";
        assert_eq!(
            classify(text),
            Diagnostic::WrongEdition {
                feature: "edition2024".to_string(),
            }
        );
    }

    #[test]
    fn old_cargo_edition_message_is_edition_too_new() {
        let text = "error: failed to parse manifest\n\nCaused by:\n  this version of Cargo is older than the `2021` edition, and only supports `2015` and `2018` editions.";
        assert_eq!(
            classify(text),
            Diagnostic::EditionTooNew {
                edition: "2021".to_string(),
            }
        );
    }

    #[test]
    fn multiple_package_versions_extracts_name() {
        let text = "error: There are multiple `hex` packages in your project, and the specification `hex` is ambiguous.";
        assert_eq!(
            classify(text),
            Diagnostic::MultiplePackageVersions {
                name: "hex".to_string(),
            }
        );
    }

    #[test]
    fn first_matching_line_wins_and_scan_stops() {
        // Both an invalid-crate line and a later no-matching-package line:
        // the earlier line decides the classification.
        let text = "  TOML parse error at line 3, column 1\nerror: no matching package named `foo` found";
        assert_eq!(classify(text), Diagnostic::InvalidCrate { line: 3 });
    }

    #[test]
    fn requirement_form_classifies_ahead_of_bare_form() {
        // The specific requirement shape must not fall through to the bare
        // `failed to select a version` rule further down the table.
        let text = r#"error: failed to select a version for the requirement `serde = "1.0"`"#;
        assert!(matches!(
            classify(text),
            Diagnostic::InvalidVersion { .. }
        ));
    }
}
