//! Proxy selection. This decides which connections get a proxy and with
//! which credentials; actual wire traversal is left to the HTTP transport.

use hyper::Uri;
use lazy_static::lazy_static;
use regex::Regex;

use crate::engine::auth::Authentication;

lazy_static! {
    static ref EXCLUSION_SEPARATORS: Regex = Regex::new(r"[\s,|]+").unwrap();
}

#[derive(Debug, Clone)]
pub struct Proxy {
    pub host: String,
    pub port: u16,
    pub authentication: Option<Authentication>,
}

impl Proxy {
    pub fn new(host: impl Into<String>, port: u16) -> Proxy {
        Proxy {
            host: host.into(),
            port,
            authentication: None,
        }
    }
}

/// Decides per target host whether the configured proxy applies. The
/// exclusion list accepts whitespace, comma or pipe separated patterns,
/// with `*` matching any run of characters.
#[derive(Debug, Clone, Default)]
pub struct ProxySelector {
    proxy: Option<Proxy>,
    exclusions: Vec<String>,
}

impl ProxySelector {
    pub fn new(proxy: Option<Proxy>, exclusion_list: &str) -> ProxySelector {
        let exclusions = EXCLUSION_SEPARATORS
            .split(exclusion_list)
            .filter(|pattern| !pattern.is_empty())
            .map(|pattern| pattern.to_ascii_lowercase())
            .collect();

        ProxySelector { proxy, exclusions }
    }

    pub fn select(&self, url: &str) -> Option<&Proxy> {
        let proxy = self.proxy.as_ref()?;

        let host = url
            .parse::<Uri>()
            .ok()
            .and_then(|uri| uri.host().map(str::to_ascii_lowercase))?;

        if self.exclusions.iter().any(|pattern| matches(pattern, &host)) {
            return None;
        }
        Some(proxy)
    }
}

fn matches(pattern: &str, host: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == host,
        Some((prefix, rest)) => {
            if !host.starts_with(prefix) {
                return false;
            }
            let mut remaining = &host[prefix.len()..];
            let mut rest = rest;
            loop {
                match rest.split_once('*') {
                    None => return remaining.ends_with(rest),
                    Some((fragment, tail)) => {
                        match remaining.find(fragment) {
                            Some(index) => remaining = &remaining[index + fragment.len()..],
                            None => return false,
                        }
                        rest = tail;
                    }
                }
            }
        }
    }
}
