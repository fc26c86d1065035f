//! TOML parser with helpful error messages

use std::path::Path;

use anyhow::{Context, Result};

use super::schema::EngineConfig;

/// Parse locus.toml, anchoring relative paths at the file's directory
pub fn parse_locus_toml(path: &Path) -> Result<EngineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config = parse_locus_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    if let Some(base_dir) = path.parent() {
        config.resolve_paths(base_dir);
    }
    Ok(config)
}

/// Parse locus.toml content from string
pub fn parse_locus_toml_str(content: &str) -> Result<EngineConfig> {
    let config: EngineConfig =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;

    config.validate()?;

    Ok(config)
}

/// Serialize a config back to TOML
pub fn to_toml(config: &EngineConfig) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize config to TOML")
}

/// Attach the offending lines to a TOML error
fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let message = error.message().to_string();

    match error.span() {
        Some(span) => {
            let line_num = content[..span.start.min(content.len())].matches('\n').count() + 1;
            anyhow::anyhow!(
                "TOML parsing error at line {}:\n{}\n\nError: {}",
                line_num,
                get_line_context(content, line_num),
                message
            )
        }
        None => anyhow::anyhow!("TOML parsing error: {}", message),
    }
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 1).min(lines.len());

    lines[start.min(end)..end]
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let number = start + idx + 1;
            let marker = if number == line_num { ">" } else { " " };
            format!("{} {:>4} | {}", marker, number, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResolverKind;

    #[test]
    fn empty_config_uses_file_resolver_only() {
        let config = parse_locus_toml_str("").unwrap();
        assert_eq!(config.resolver_order(), vec![ResolverKind::File]);
    }

    #[test]
    fn parses_full_config() {
        let config = parse_locus_toml_str(
            r#"
resolvers = ["sdk", "package", "file"]
package_root = "/work/packages"

[url_mapping]
"dart:json" = "/work/json_patched.dart"

[sdk]
path = "/opt/sdk"

[sdk.libraries]
collection = "collection/collection.dart"
"#,
        )
        .unwrap();

        assert_eq!(
            config.resolver_order(),
            vec![ResolverKind::Sdk, ResolverKind::Package, ResolverKind::File]
        );
        let sdk = config.sdk.as_ref().unwrap();
        assert_eq!(sdk.path, Path::new("/opt/sdk"));
        assert_eq!(
            sdk.libraries.get("collection").map(|p| p.as_path()),
            Some(Path::new("collection/collection.dart"))
        );
        assert_eq!(config.url_mapping.len(), 1);
    }

    #[test]
    fn syntax_error_reports_line() {
        let err = parse_locus_toml_str("package_root = \"/a\"\nresolvers = [\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("TOML parsing error"), "{message}");
    }

    #[test]
    fn unknown_resolver_kind_is_rejected() {
        assert!(parse_locus_toml_str(r#"resolvers = ["http"]"#).is_err());
    }

    #[test]
    fn duplicate_resolver_is_rejected() {
        let err = parse_locus_toml_str(r#"resolvers = ["file", "file"]"#).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn package_resolver_requires_root() {
        let err = parse_locus_toml_str(r#"resolvers = ["package", "file"]"#).unwrap_err();
        assert!(err.to_string().contains("package_root"));
    }

    #[test]
    fn serialized_config_parses_back() {
        let config = parse_locus_toml_str(
            r#"
package_root = "/work/packages"

[sdk]
path = "/opt/sdk"
"#,
        )
        .unwrap();

        let text = to_toml(&config).unwrap();
        assert_eq!(parse_locus_toml_str(&text).unwrap(), config);
    }
}
