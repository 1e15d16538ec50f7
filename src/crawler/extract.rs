//! Content and link extraction for the crawler module

use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::warn;
use url::Url;

/// Extract the best-effort main text content of a page
///
/// Tries the configured content-container selector first and returns that
/// container's text when present. If the selector is invalid or matches
/// nothing, falls back to every visible text node in the document, skipping
/// text under `style` and `script`. Text fragments are trimmed and joined
/// with single spaces. Never fails; the result may be empty.
pub fn extract_content(html: &str, content_selector: &str) -> String {
    let document = Html::parse_document(html);

    match Selector::parse(content_selector) {
        Ok(selector) => {
            if let Some(container) = document.select(&selector).next() {
                return join_fragments(container.text());
            }
        }
        Err(_) => {
            warn!(
                selector = content_selector,
                "invalid content selector, falling back to full-document extraction"
            );
        }
    }

    let fragments = document.tree.nodes().filter_map(|node| {
        let text: &str = node.value().as_text()?;
        let parent_is_excluded = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|e| e.name()))
            .is_some_and(|name| matches!(name, "style" | "script"));
        if parent_is_excluded {
            None
        } else {
            Some(text)
        }
    });
    join_fragments(fragments)
}

/// Extract outbound links as absolute URLs restricted to the allowed domains
///
/// Every `a[href]` is resolved against `base` (relative and protocol-relative
/// links resolve; malformed hrefs are skipped). Fragments are stripped, URLs
/// without a hostname or outside the allowed domains are dropped, and
/// duplicates are removed preserving document order.
pub fn extract_links(html: &str, base: &Url, allowed_domains: &[String]) -> Vec<Url> {
    let anchor_selector =
        Selector::parse("a[href]").expect("anchor selector is valid");
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&anchor_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(mut resolved) = base.join(href) else {
            continue;
        };
        resolved.set_fragment(None);

        let Some(host) = resolved.host_str() else {
            continue;
        };
        if !domain_allowed(host, allowed_domains) {
            continue;
        }
        if seen.insert(resolved.to_string()) {
            links.push(resolved);
        }
    }

    links
}

/// Check whether a hostname belongs to one of the allowed domains
///
/// A host matches when it equals an allowed domain or ends with it at a dot
/// boundary, so `sub.example.com` matches `example.com` while
/// `notexample.com` does not.
pub fn domain_allowed(host: &str, allowed_domains: &[String]) -> bool {
    allowed_domains.iter().any(|domain| {
        host == domain
            || (host.len() > domain.len()
                && host.ends_with(domain.as_str())
                && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
    })
}

fn join_fragments<'a>(fragments: impl Iterator<Item = &'a str>) -> String {
    fragments
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content_prefers_container() {
        let html = r#"
            <html><body>
                <nav>Site navigation</nav>
                <div class="main-content"><p>Product overview.</p><p>Pricing on request.</p></div>
                <footer>Imprint</footer>
            </body></html>
        "#;

        let text = extract_content(html, "div.main-content");
        assert_eq!(text, "Product overview. Pricing on request.");
    }

    #[test]
    fn test_extract_content_fallback_skips_style_and_script() {
        let html = r#"
            <html><head>
                <style>body { color: red; }</style>
                <script>var tracking = true;</script>
            </head><body>
                <p>Visible   text.</p>
                <div>More text.</div>
            </body></html>
        "#;

        let text = extract_content(html, "div.main-content");
        assert!(text.contains("Visible   text."));
        assert!(text.contains("More text."));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("tracking"));
    }

    #[test]
    fn test_extract_content_empty_container_stays_empty() {
        let html = r#"<html><body><div class="main-content"></div><p>elsewhere</p></body></html>"#;
        assert_eq!(extract_content(html, "div.main-content"), "");
    }

    #[test]
    fn test_extract_content_invalid_selector_falls_back() {
        let html = "<html><body><p>still works</p></body></html>";
        let text = extract_content(html, "div..broken");
        assert!(text.contains("still works"));
    }

    #[test]
    fn test_extract_links_resolves_relative_and_protocol_relative() {
        let html = r#"
            <a href="/about">About</a>
            <a href="pricing">Pricing</a>
            <a href="//cdn.example.com/asset">Asset</a>
            <a href="https://example.com/contact#team">Contact</a>
        "#;
        let base = Url::parse("https://example.com/products/").unwrap();
        let allowed = vec!["example.com".to_string()];

        let links = extract_links(html, &base, &allowed);
        let strings: Vec<String> = links.iter().map(|u| u.to_string()).collect();

        assert_eq!(
            strings,
            vec![
                "https://example.com/about",
                "https://example.com/products/pricing",
                "https://cdn.example.com/asset",
                "https://example.com/contact",
            ]
        );
    }

    #[test]
    fn test_extract_links_skips_malformed_and_offsite() {
        let html = r#"
            <a href="https://othersite.com/page">Elsewhere</a>
            <a href="http://[not-a-url">Broken</a>
            <a href="mailto:sales@example.com">Mail</a>
            <a>No href at all</a>
            <a href="/ok">Ok</a>
        "#;
        let base = Url::parse("https://example.com/").unwrap();
        let allowed = vec!["example.com".to_string()];

        let links = extract_links(html, &base, &allowed);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].as_str(), "https://example.com/ok");
    }

    #[test]
    fn test_extract_links_dedupes_preserving_order() {
        let html = r#"
            <a href="/a">First</a>
            <a href="/b">Second</a>
            <a href="/a#section">First again</a>
        "#;
        let base = Url::parse("https://example.com/").unwrap();
        let allowed = vec!["example.com".to_string()];

        let links = extract_links(html, &base, &allowed);
        let strings: Vec<&str> = links.iter().map(Url::as_str).collect();
        assert_eq!(strings, vec!["https://example.com/a", "https://example.com/b"]);
    }

    #[test]
    fn test_domain_allowed_exact_and_subdomain() {
        let allowed = vec!["example.com".to_string()];

        assert!(domain_allowed("example.com", &allowed));
        assert!(domain_allowed("sub.example.com", &allowed));
        assert!(domain_allowed("deep.sub.example.com", &allowed));
        assert!(!domain_allowed("notexample.com", &allowed));
        assert!(!domain_allowed("example.com.evil.org", &allowed));
    }
}
