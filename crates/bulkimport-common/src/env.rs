//! Environment variable helpers used by the configuration loaders

use crate::error::{CommonError, Result};
use std::str::FromStr;

/// Read and parse an environment variable.
///
/// Returns `Ok(None)` when the variable is unset or empty, and an
/// [`CommonError::InvalidValue`] when it is set but does not parse.
pub fn parse_var<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| CommonError::invalid_value(key, raw, e.to_string())),
        Err(_) => Ok(None),
    }
}

/// Read a boolean flag, accepting `1/0`, `yes/no` and `on/off` besides `true/false`.
pub fn parse_flag(key: &str) -> Result<Option<bool>> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };

    match raw.trim().to_lowercase().as_str() {
        "" => Ok(None),
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(CommonError::invalid_value(key, raw, "expected a boolean")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_unset() {
        let value: Option<usize> = parse_var("BULKIMPORT_TEST_ENV_UNSET").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_parse_var_number() {
        std::env::set_var("BULKIMPORT_TEST_ENV_NUMBER", " 42 ");
        let value: Option<usize> = parse_var("BULKIMPORT_TEST_ENV_NUMBER").unwrap();
        assert_eq!(value, Some(42));
        std::env::remove_var("BULKIMPORT_TEST_ENV_NUMBER");
    }

    #[test]
    fn test_parse_var_invalid() {
        std::env::set_var("BULKIMPORT_TEST_ENV_INVALID", "many");
        let err = parse_var::<usize>("BULKIMPORT_TEST_ENV_INVALID").unwrap_err();
        assert!(err.to_string().contains("BULKIMPORT_TEST_ENV_INVALID"));
        std::env::remove_var("BULKIMPORT_TEST_ENV_INVALID");
    }

    #[test]
    fn test_parse_flag() {
        std::env::set_var("BULKIMPORT_TEST_ENV_FLAG", "Yes");
        assert_eq!(parse_flag("BULKIMPORT_TEST_ENV_FLAG").unwrap(), Some(true));
        std::env::set_var("BULKIMPORT_TEST_ENV_FLAG", "off");
        assert_eq!(parse_flag("BULKIMPORT_TEST_ENV_FLAG").unwrap(), Some(false));
        std::env::set_var("BULKIMPORT_TEST_ENV_FLAG", "maybe");
        assert!(parse_flag("BULKIMPORT_TEST_ENV_FLAG").is_err());
        std::env::remove_var("BULKIMPORT_TEST_ENV_FLAG");
    }
}
