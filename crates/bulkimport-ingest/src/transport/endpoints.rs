//! Import endpoint URL builders

/// Path prefix of the versioned API
pub const API_VERSION_PATH: &str = "v0";

/// Build the batch import URL for a host
///
/// Hosts given with an explicit scheme are kept as-is; bare hosts get https.
pub fn import_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}/{}/", host, API_VERSION_PATH)
    } else {
        format!("https://{}/{}/", host, API_VERSION_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_url_bare_host() {
        assert_eq!(
            import_url("api.orchestrate.io"),
            "https://api.orchestrate.io/v0/"
        );
    }

    #[test]
    fn test_import_url_with_scheme() {
        assert_eq!(import_url("http://127.0.0.1:8080/"), "http://127.0.0.1:8080/v0/");
        assert_eq!(
            import_url("https://eu.orchestrate.io"),
            "https://eu.orchestrate.io/v0/"
        );
    }
}
