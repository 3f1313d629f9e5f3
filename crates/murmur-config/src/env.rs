use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `{{ env.NAME }}` or `{{ env.NAME | default("value") }}`
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\)\s*)?\}\}"#).expect("must be valid regex")
});

/// Failure to substitute a placeholder in the raw config text
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExpandError {
    #[error("line {line}: environment variable `{name}` is not set")]
    MissingVar { line: usize, name: String },
    #[error("line {line}: only `env.` placeholders are supported, found `{key}`")]
    UnsupportedScope { line: usize, key: String },
}

/// Substitute environment placeholders in raw TOML text
///
/// Runs before deserialization so config structs hold plain values. Comment
/// lines are copied through untouched, so a commented-out secret never has to
/// be set.
pub fn expand_env(input: &str) -> Result<String, ExpandError> {
    let mut output = String::with_capacity(input.len());

    for (index, line) in input.split_inclusive('\n').enumerate() {
        if line.trim_start().starts_with('#') {
            output.push_str(line);
        } else {
            output.push_str(&expand_line(line, index + 1)?);
        }
    }

    Ok(output)
}

fn expand_line(line: &str, number: usize) -> Result<String, ExpandError> {
    let mut failure = None;

    let expanded = PLACEHOLDER.replace_all(line, |captures: &Captures<'_>| {
        let fallback = captures.get(2).map(|m| m.as_str());

        resolve(&captures[1], fallback, number).unwrap_or_else(|e| {
            failure.get_or_insert(e);
            String::new()
        })
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(expanded.into_owned()),
    }
}

fn resolve(key: &str, fallback: Option<&str>, line: usize) -> Result<String, ExpandError> {
    let name = key
        .strip_prefix("env.")
        .filter(|name| !name.is_empty() && !name.contains('.'))
        .ok_or_else(|| ExpandError::UnsupportedScope {
            line,
            key: key.to_string(),
        })?;

    match (std::env::var(name), fallback) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(fallback)) => Ok(fallback.to_string()),
        (Err(_), None) => Err(ExpandError::MissingVar {
            line,
            name: name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let input = "[output]\ndirectory = \"outputs\"\n";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn substitutes_set_variables() {
        temp_env::with_vars([("MURMUR_TEST_DIR", Some("/var/murmur")), ("MURMUR_TEST_LANG", Some("de"))], || {
            let input = "directory = \"{{ env.MURMUR_TEST_DIR }}\"\nlanguage = \"{{env.MURMUR_TEST_LANG}}\"";
            assert_eq!(
                expand_env(input).unwrap(),
                "directory = \"/var/murmur\"\nlanguage = \"de\""
            );
        });
    }

    #[test]
    fn missing_variable_reports_line() {
        temp_env::with_var_unset("MURMUR_TEST_KEY", || {
            let err = expand_env("[auth]\napi_key = \"{{ env.MURMUR_TEST_KEY }}\"").unwrap_err();
            assert_eq!(
                err,
                ExpandError::MissingVar {
                    line: 2,
                    name: "MURMUR_TEST_KEY".to_string()
                }
            );
        });
    }

    #[test]
    fn default_applies_only_when_unset() {
        let input = "speaker = \"{{ env.MURMUR_TEST_SPEAKER | default(\"Daisy Studious\") }}\"";

        temp_env::with_var_unset("MURMUR_TEST_SPEAKER", || {
            assert_eq!(expand_env(input).unwrap(), "speaker = \"Daisy Studious\"");
        });

        temp_env::with_var("MURMUR_TEST_SPEAKER", Some("Gracie Wise"), || {
            assert_eq!(expand_env(input).unwrap(), "speaker = \"Gracie Wise\"");
        });
    }

    #[test]
    fn other_scopes_are_rejected() {
        let err = expand_env("key = \"{{ secrets.KEY }}\"").unwrap_err();
        assert!(matches!(err, ExpandError::UnsupportedScope { line: 1, .. }));
    }

    #[test]
    fn comments_are_not_expanded() {
        temp_env::with_var_unset("MURMUR_TEST_UNSET", || {
            let input = "  # api_key = \"{{ env.MURMUR_TEST_UNSET }}\"\n";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }
}
