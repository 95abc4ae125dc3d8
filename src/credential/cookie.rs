//! Cookie-string parsing and the cookie-backed credential provider

use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use super::{Credential, CredentialProvider};

/// Ordered cookie entries parsed from a `name=value; name2=value2` string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    entries: Vec<(String, String)>,
}

impl CookieJar {
    /// Parse a `document.cookie`-style string.
    ///
    /// The value is everything after the first `=`, so padded base64 tokens
    /// survive intact. Fragments without `=` are skipped.
    pub fn parse(raw: &str) -> Self {
        let entries = raw
            .split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .filter_map(|part| {
                let (name, value) = part.split_once('=')?;
                Some((name.trim().to_string(), value.trim().to_string()))
            })
            .collect();

        Self { entries }
    }

    /// First entry with the given name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize back into a `Cookie` header value
    pub fn to_header(&self) -> String {
        self.entries
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Where the cookie string comes from
#[derive(Debug, Clone)]
pub enum CookieSource {
    /// Fixed cookie string, e.g. passed on the command line
    Inline(String),
    /// File holding the cookie string; re-read on every lookup
    File(PathBuf),
}

impl CookieSource {
    fn read(&self) -> Option<String> {
        match self {
            CookieSource::Inline(raw) => Some(raw.clone()),
            CookieSource::File(path) => match fs::read_to_string(path) {
                Ok(contents) => Some(contents),
                Err(err) => {
                    warn!(path = ?path, error = %err, "Failed to read cookie file");
                    None
                }
            },
        }
    }
}

/// Credential provider reading the token from a named cookie
#[derive(Debug, Clone)]
pub struct CookieCredentials {
    source: CookieSource,
    cookie_name: String,
}

impl CookieCredentials {
    pub fn new(source: CookieSource, cookie_name: impl Into<String>) -> Self {
        Self {
            source,
            cookie_name: cookie_name.into(),
        }
    }
}

impl CredentialProvider for CookieCredentials {
    fn credential(&self) -> Option<Credential> {
        let jar = CookieJar::parse(&self.source.read()?);
        if jar.is_empty() {
            debug!(cookie = %self.cookie_name, "Cookie string is empty");
            return None;
        }

        // An empty value would only produce "Bearer " which the server rejects anyway
        let token = jar.get(&self.cookie_name).filter(|value| !value.is_empty())?;
        debug!(cookie = %self.cookie_name, cookies = jar.len(), "Credential cookie found");

        Some(Credential {
            token: token.to_string(),
            cookie_header: jar.to_header(),
        })
    }

    fn cookie_name(&self) -> &str {
        &self.cookie_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_cookie_string() {
        let jar = CookieJar::parse("theme=dark; proxy=abc.def.ghi; lang=en");

        assert_eq!(jar.len(), 3);
        assert_eq!(jar.get("proxy"), Some("abc.def.ghi"));
        assert_eq!(jar.get("theme"), Some("dark"));
        assert_eq!(jar.get("missing"), None);
    }

    #[test]
    fn test_value_keeps_embedded_equals() {
        let jar = CookieJar::parse("proxy=dG9rZW4=; other=1");
        assert_eq!(jar.get("proxy"), Some("dG9rZW4="));
    }

    #[test]
    fn test_name_must_match_exactly() {
        let jar = CookieJar::parse("proxy_old=stale; xproxy=nope");
        assert_eq!(jar.get("proxy"), None);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let jar = CookieJar::parse("proxy=first; proxy=second");
        assert_eq!(jar.get("proxy"), Some("first"));
    }

    #[test]
    fn test_lenient_whitespace_and_fragments() {
        let jar = CookieJar::parse("  proxy=T ;;garbage; a=b\n");
        assert_eq!(jar.get("proxy"), Some("T"));
        assert_eq!(jar.get("a"), Some("b"));
        assert_eq!(jar.to_header(), "proxy=T; a=b");
    }

    #[test]
    fn test_empty_cookie_string() {
        let jar = CookieJar::parse("");
        assert!(jar.is_empty());
        assert_eq!(jar.to_header(), "");
    }

    #[test]
    fn test_inline_credentials() {
        let provider = CookieCredentials::new(
            CookieSource::Inline("session=x; proxy=T".to_string()),
            "proxy",
        );

        let credential = provider.credential().unwrap();
        assert_eq!(credential.token, "T");
        assert_eq!(credential.cookie_header, "session=x; proxy=T");
        assert_eq!(provider.cookie_name(), "proxy");
    }

    #[test]
    fn test_missing_cookie_is_none() {
        let provider =
            CookieCredentials::new(CookieSource::Inline("session=x".to_string()), "proxy");
        assert!(provider.credential().is_none());
    }

    #[test]
    fn test_blank_cookie_string_is_none() {
        let provider = CookieCredentials::new(CookieSource::Inline(" ;\n".to_string()), "proxy");
        assert!(provider.credential().is_none());
    }

    #[test]
    fn test_empty_token_is_none() {
        let provider =
            CookieCredentials::new(CookieSource::Inline("proxy=; a=b".to_string()), "proxy");
        assert!(provider.credential().is_none());
    }

    #[test]
    fn test_file_is_reread_on_every_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.txt");
        let provider = CookieCredentials::new(CookieSource::File(path.clone()), "proxy");

        // No file yet
        assert!(provider.credential().is_none());

        fs::write(&path, "proxy=first").unwrap();
        assert_eq!(provider.credential().unwrap().token, "first");

        fs::write(&path, "proxy=second\n").unwrap();
        assert_eq!(provider.credential().unwrap().token, "second");
    }
}
