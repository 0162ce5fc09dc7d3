//! Parsed URL references.
//!
//! The session core never works with raw URL strings: every operation that
//! accepts one immediately parses it into a [`UrlRef`] and keys its state on
//! the canonical form. Canonicalization here is deliberately shallow -
//! lowercased scheme and host, default ports stripped, empty paths
//! normalized to `/`, fragments dropped. Anything beyond that (IDNA,
//! percent-encoding) is the backend's concern.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// The session's own internal scheme. Pages under it are always fully
/// rendered and never touch the backend.
pub const INTERNAL_SCHEME: &str = "veil";

/// A parsed URL reference.
///
/// `url` is the canonical string used for tab-identity deduplication;
/// `domain`/`subdomain` drive mode resolution. A reference that could not
/// be parsed keeps the raw input in `url` with every other field absent,
/// and reports `false` from [`is_valid`](Self::is_valid).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRef {
	/// Canonical URL string.
	pub url: String,
	/// Lowercased scheme, e.g. `"https"` or [`INTERNAL_SCHEME`].
	pub protocol: Option<String>,
	/// Labels in front of the registrable domain, e.g. `"shop"` in
	/// `shop.example.com`.
	pub subdomain: Option<String>,
	/// Registrable domain: the last two host labels (or the whole host for
	/// single-label and IP-literal hosts).
	pub domain: Option<String>,
	/// Explicit port, when it differs from the scheme default.
	pub port: Option<u16>,
	/// Path component, always starting with `/` for network URLs.
	pub path: String,
}

impl UrlRef {
	/// Parses a URL string into a reference.
	///
	/// Never fails: malformed input yields a reference with no protocol and
	/// no domain. Relative paths (`./`, `../`, `/`) are not resolvable
	/// without a base and parse as invalid; see [`resolve`](Self::resolve).
	pub fn parse(raw: &str) -> Self {
		let trimmed = raw.trim();

		if trimmed.is_empty()
			|| trimmed.starts_with("./")
			|| trimmed.starts_with("../")
			|| trimmed.starts_with('/')
		{
			return Self {
				url: trimmed.to_string(),
				..Self::default()
			};
		}

		let internal_prefix = format!("{INTERNAL_SCHEME}:");
		if let Some(rest) = trimmed.strip_prefix(internal_prefix.as_str()) {
			return Self::parse_internal(rest);
		}

		let (scheme, rest) = match trimmed.split_once("://") {
			Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
			// Scheme-less input is taken as https, so `open("example.com")`
			// behaves like the address bar.
			None => ("https".to_string(), trimmed),
		};

		if rest.is_empty() {
			return Self {
				url: trimmed.to_string(),
				..Self::default()
			};
		}

		let (authority, path_and_query) = match rest.find('/') {
			Some(idx) => (&rest[..idx], &rest[idx..]),
			None => (rest, ""),
		};

		let (host, port) = split_host_port(authority);
		let host = host.to_ascii_lowercase();
		let (subdomain, domain) = split_domain(&host);

		if domain.is_none() {
			tracing::trace!(input = trimmed, "url has no resolvable host");
			return Self {
				url: trimmed.to_string(),
				protocol: Some(scheme),
				..Self::default()
			};
		}

		// Fragments never reach the backend; drop them during
		// canonicalization.
		let path_and_query = match path_and_query.split_once('#') {
			Some((before, _)) => before,
			None => path_and_query,
		};
		let (path, query) = match path_and_query.split_once('?') {
			Some((path, query)) => (path, Some(query)),
			None => (path_and_query, None),
		};
		let path = if path.is_empty() { "/" } else { path };

		let port = port.filter(|&p| !is_default_port(&scheme, p));

		let mut url = format!("{scheme}://{host}");
		if let Some(p) = port {
			url.push_str(&format!(":{p}"));
		}
		url.push_str(path);
		if let Some(q) = query {
			url.push('?');
			url.push_str(q);
		}

		Self {
			url,
			protocol: Some(scheme),
			subdomain,
			domain,
			port,
			path: path.to_string(),
		}
	}

	fn parse_internal(rest: &str) -> Self {
		let page = rest.trim_start_matches('/');
		if page.is_empty() {
			return Self {
				url: format!("{INTERNAL_SCHEME}:"),
				..Self::default()
			};
		}
		Self {
			url: format!("{INTERNAL_SCHEME}:{page}"),
			protocol: Some(INTERNAL_SCHEME.to_string()),
			subdomain: None,
			domain: None,
			port: None,
			path: page.to_string(),
		}
	}

	/// Returns `true` when the reference can back a tab: an internal page
	/// or a network URL with a resolvable host.
	pub fn is_valid(&self) -> bool {
		if self.is_internal() {
			return !self.path.is_empty();
		}
		self.domain.is_some()
	}

	/// Returns `true` for the session's own `veil:` pages.
	pub fn is_internal(&self) -> bool {
		self.protocol.as_deref() == Some(INTERNAL_SCHEME)
	}

	/// Full host: `subdomain.domain` when a subdomain is present.
	pub fn host(&self) -> Option<String> {
		match (&self.subdomain, &self.domain) {
			(Some(sub), Some(dom)) => Some(format!("{sub}.{dom}")),
			(None, Some(dom)) => Some(dom.clone()),
			_ => None,
		}
	}

	/// The domain string mode resolution matches against - identical to
	/// [`host`](Self::host).
	pub fn effective_domain(&self) -> Option<String> {
		self.host()
	}

	/// Resolves a `./` or `../` path against this reference.
	///
	/// Returns `None` for internal or invalid bases, or when the input is
	/// not a relative path (callers should [`parse`](Self::parse) those
	/// directly).
	pub fn resolve(&self, relative: &str) -> Option<Self> {
		if self.is_internal() || !self.is_valid() {
			return None;
		}
		if !relative.starts_with("./") && !relative.starts_with("../") {
			return None;
		}

		// Directory of the current path, without the trailing segment.
		let mut segments: Vec<&str> = self
			.path
			.split('/')
			.filter(|s| !s.is_empty())
			.collect();
		segments.pop();

		let mut rest = relative;
		loop {
			if let Some(r) = rest.strip_prefix("./") {
				rest = r;
			} else if let Some(r) = rest.strip_prefix("../") {
				segments.pop();
				rest = r;
			} else {
				break;
			}
		}

		let mut path = String::new();
		for segment in &segments {
			path.push('/');
			path.push_str(segment);
		}
		path.push('/');
		path.push_str(rest);

		let scheme = self.protocol.as_deref().unwrap_or("https");
		let host = self.host()?;
		let origin = match self.port {
			Some(p) => format!("{scheme}://{host}:{p}"),
			None => format!("{scheme}://{host}"),
		};
		Some(Self::parse(&format!("{origin}{path}")))
	}
}

fn is_default_port(scheme: &str, port: u16) -> bool {
	matches!((scheme, port), ("http", 80) | ("https", 443))
}

/// Splits `host[:port]`, leaving bare IPv6 literals intact.
fn split_host_port(authority: &str) -> (&str, Option<u16>) {
	if let Some(end) = authority.strip_prefix('[').and_then(|r| r.find(']')) {
		let host = &authority[1..end + 1];
		let port = authority[end + 2..]
			.strip_prefix(':')
			.and_then(|p| p.parse().ok());
		return (host, port);
	}
	if authority.matches(':').count() > 1 {
		// IPv6 literal without brackets.
		return (authority, None);
	}
	match authority.rsplit_once(':') {
		Some((host, port)) => match port.parse() {
			Ok(port) => (host, Some(port)),
			Err(_) => (authority, None),
		},
		None => (authority, None),
	}
}

/// Splits a host into `(subdomain, domain)`: the registrable domain is the
/// last two labels, anything in front is the subdomain. IP literals and
/// single-label hosts stand alone.
fn split_domain(host: &str) -> (Option<String>, Option<String>) {
	if host.is_empty() {
		return (None, None);
	}
	if host.trim_matches(['[', ']']).parse::<IpAddr>().is_ok() {
		return (None, Some(host.to_string()));
	}

	if host
		.chars()
		.any(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')))
	{
		return (None, None);
	}
	let labels: Vec<&str> = host.split('.').collect();
	if labels.iter().any(|l| l.is_empty()) {
		return (None, None);
	}
	match labels.len() {
		1 => (None, Some(host.to_string())),
		2 => (None, Some(host.to_string())),
		n => (
			Some(labels[..n - 2].join(".")),
			Some(labels[n - 2..].join(".")),
		),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn canonicalizes_case_port_and_path() {
		let a = UrlRef::parse("HTTPS://Example.COM:443");
		let b = UrlRef::parse("https://example.com/");
		assert_eq!(a.url, "https://example.com/");
		assert_eq!(a.url, b.url);
		assert_eq!(a.domain.as_deref(), Some("example.com"));
		assert_eq!(a.port, None);
	}

	#[test]
	fn keeps_non_default_ports() {
		let r = UrlRef::parse("http://example.com:8080/api");
		assert_eq!(r.url, "http://example.com:8080/api");
		assert_eq!(r.port, Some(8080));
	}

	#[test]
	fn splits_subdomain_from_registrable_domain() {
		let r = UrlRef::parse("https://shop.eu.example.com/cart");
		assert_eq!(r.subdomain.as_deref(), Some("shop.eu"));
		assert_eq!(r.domain.as_deref(), Some("example.com"));
		assert_eq!(r.effective_domain().as_deref(), Some("shop.eu.example.com"));
	}

	#[test]
	fn single_label_and_ip_hosts_stand_alone() {
		assert_eq!(
			UrlRef::parse("http://localhost:3000").domain.as_deref(),
			Some("localhost")
		);
		let ip = UrlRef::parse("http://192.168.0.1/admin");
		assert_eq!(ip.domain.as_deref(), Some("192.168.0.1"));
		assert_eq!(ip.subdomain, None);
	}

	#[test]
	fn schemeless_input_defaults_to_https() {
		let r = UrlRef::parse("example.com/about");
		assert_eq!(r.url, "https://example.com/about");
		assert!(r.is_valid());
	}

	#[test]
	fn internal_pages_parse_without_a_domain() {
		let r = UrlRef::parse("veil:welcome");
		assert!(r.is_internal());
		assert!(r.is_valid());
		assert_eq!(r.url, "veil:welcome");
		assert_eq!(r.domain, None);
		assert_eq!(r.effective_domain(), None);
	}

	#[test]
	fn relative_and_empty_input_is_invalid() {
		assert!(!UrlRef::parse("./settings").is_valid());
		assert!(!UrlRef::parse("../up").is_valid());
		assert!(!UrlRef::parse("").is_valid());
		assert!(!UrlRef::parse("/rooted").is_valid());
	}

	#[test]
	fn fragments_are_dropped_queries_kept() {
		let r = UrlRef::parse("https://example.com/a?q=1#section");
		assert_eq!(r.url, "https://example.com/a?q=1");
		assert_eq!(r.path, "/a");
	}

	#[test]
	fn resolve_walks_the_directory_tree() {
		let base = UrlRef::parse("https://example.com/docs/guide/intro");
		let sibling = base.resolve("./setup").unwrap();
		assert_eq!(sibling.url, "https://example.com/docs/guide/setup");
		let parent = base.resolve("../api").unwrap();
		assert_eq!(parent.url, "https://example.com/docs/api");
	}

	#[test]
	fn resolve_rejects_absolute_input_and_internal_bases() {
		let base = UrlRef::parse("https://example.com/docs/");
		assert!(base.resolve("https://other.com/").is_none());
		let internal = UrlRef::parse("veil:welcome");
		assert!(internal.resolve("./x").is_none());
	}

	#[test]
	fn ipv6_authority_keeps_port_split_sane() {
		let r = UrlRef::parse("http://[fe80::1]:8080/");
		assert_eq!(r.port, Some(8080));
		let bare = UrlRef::parse("http://fe80::1/");
		assert_eq!(bare.port, None);
	}
}
