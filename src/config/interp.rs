//! Environment variable interpolation for YAML scalars.
//!
//! A scalar may embed `${NAME}` or `${NAME:DEFAULT}` anywhere in its
//! text, any number of times. Each placeholder resolves independently
//! against the live process environment at load time: the variable's
//! value when set and non-empty, otherwise `DEFAULT`, otherwise the
//! empty string.

use regex_lite::{Captures, Regex};
use std::sync::OnceLock;

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^{}]+)\}").expect("placeholder pattern is valid"))
}

/// Quick check used by the loader to skip scalars without placeholders.
pub(crate) fn contains_placeholder(input: &str) -> bool {
    input.contains("${")
}

/// Replace every `${NAME}` / `${NAME:DEFAULT}` occurrence in `input`.
///
/// Only the text between the first and second colon counts as the
/// default; any further colon-separated segments are dropped. That
/// matches the historical splitter, so `${HOST:localhost:8080}`
/// resolves to `localhost`, not `localhost:8080`.
pub fn interpolate(input: &str) -> String {
    placeholder()
        .replace_all(input, |caps: &Captures<'_>| {
            let mut parts = caps[1].splitn(3, ':');
            let name = parts.next().unwrap_or_default();
            let default = parts.next().unwrap_or_default();
            match std::env::var(name) {
                Ok(value) if !value.is_empty() => value,
                _ => default.to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_env::with_vars;

    #[test]
    fn test_unset_variable_uses_default() {
        with_vars(&[("BOXARR_TEST_FOO", None)], || {
            assert_eq!(interpolate("${BOXARR_TEST_FOO:bar}"), "bar");
        });
    }

    #[test]
    fn test_set_variable_wins_over_default() {
        with_vars(&[("BOXARR_TEST_FOO", Some("x"))], || {
            assert_eq!(interpolate("${BOXARR_TEST_FOO:bar}"), "x");
        });
    }

    #[test]
    fn test_empty_variable_falls_back_to_default() {
        with_vars(&[("BOXARR_TEST_FOO", Some(""))], || {
            assert_eq!(interpolate("${BOXARR_TEST_FOO:bar}"), "bar");
        });
    }

    #[test]
    fn test_unset_without_default_is_empty() {
        with_vars(&[("BOXARR_TEST_FOO", None)], || {
            assert_eq!(interpolate("key=${BOXARR_TEST_FOO}!"), "key=!");
        });
    }

    #[test]
    fn test_multiple_placeholders_resolve_independently() {
        with_vars(
            &[("BOXARR_TEST_A", Some("one")), ("BOXARR_TEST_B", None)],
            || {
                assert_eq!(
                    interpolate("${BOXARR_TEST_A}-${BOXARR_TEST_B:def}"),
                    "one-def"
                );
            },
        );
    }

    #[test]
    fn test_extra_colon_segments_are_dropped() {
        with_vars(&[("BOXARR_TEST_HOST", None)], || {
            assert_eq!(interpolate("${BOXARR_TEST_HOST:localhost:8080}"), "localhost");
        });
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(interpolate("no placeholders here"), "no placeholders here");
        assert_eq!(interpolate("$NOT_A_PLACEHOLDER"), "$NOT_A_PLACEHOLDER");
    }
}
