//! `${VAR}` and `${VAR:-default}` expansion in configuration strings.

use crate::ConfigError;

/// Expands variable references in config values, in place.
///
/// A value without any `${` is left untouched, so a bare `$VAR` in a source
/// URL or command argument passes through.
pub(crate) struct Expander<F> {
    lookup: F,
}

/// Reads variables from the process environment.
pub(crate) fn from_env() -> Expander<impl Fn(&str) -> Option<String>> {
    Expander::new(|var: &str| std::env::var(var).ok())
}

impl<F: Fn(&str) -> Option<String>> Expander<F> {
    pub(crate) fn new(lookup: F) -> Self {
        Self { lookup }
    }

    /// Expand `value`. An unset variable without a default is an error
    /// naming `field`.
    pub(crate) fn expand(&self, value: &mut String, field: &str) -> Result<(), ConfigError> {
        if !value.contains("${") {
            return Ok(());
        }
        let expanded = shellexpand::env_with_context(value.as_str(), |var| {
            (self.lookup)(var).map(Some).ok_or(())
        })
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })?;
        *value = expanded.into_owned();
        Ok(())
    }

    pub(crate) fn expand_all<'v>(
        &self,
        values: impl IntoIterator<Item = &'v mut String>,
        field: &str,
    ) -> Result<(), ConfigError> {
        values
            .into_iter()
            .try_for_each(|value| self.expand(value, field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mathlib_rev(var: &str) -> Option<String> {
        (var == "MATHLIB_REV").then(|| "abc123".to_owned())
    }

    #[test]
    fn test_expand_var_and_default() {
        let mut url = "https://github.com/m/blob/${MATHLIB_REV}/${MATHLIB_DIR:-src}/".to_owned();
        Expander::new(mathlib_rev)
            .expand(&mut url, "sources.mathlib")
            .unwrap();
        assert_eq!(url, "https://github.com/m/blob/abc123/src/");
    }

    #[test]
    fn test_missing_var_names_field() {
        let mut root = "${DOCS_ROOT}".to_owned();
        let err = Expander::new(mathlib_rev)
            .expand(&mut root, "site.root")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Environment variable error in site.root: ${DOCS_ROOT} not set"
        );
        assert_eq!(root, "${DOCS_ROOT}");
    }

    #[test]
    fn test_bare_dollar_is_literal() {
        let mut arg = "$HOME/docs".to_owned();
        Expander::new(mathlib_rev).expand(&mut arg, "deps.command").unwrap();
        assert_eq!(arg, "$HOME/docs");
    }

    #[test]
    fn test_expand_all_stops_at_first_error() {
        let mut command = vec![
            "lean".to_owned(),
            "${MATHLIB_REV}".to_owned(),
            "${LEAN_PATH}".to_owned(),
        ];
        let err = Expander::new(mathlib_rev)
            .expand_all(&mut command, "deps.command")
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert_eq!(command[1], "abc123");
    }
}
