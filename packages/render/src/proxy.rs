//! Image URL rewriting applied at the render boundary.

use pressroom_shared::RenderConfig;

// ---------------------------------------------------------------------------
// Rewriter trait
// ---------------------------------------------------------------------------

/// Rewrites image `src` values before they land in rendered HTML. The
/// renderer applies this to every figure source and the pipeline applies it
/// to the hero image, so a rewriter must be idempotent.
pub trait ImageUrlRewriter {
    fn rewrite(&self, src: &str) -> String;
}

/// Routes storage-hosted URLs through the configured proxy endpoint and
/// leaves every other source untouched.
#[derive(Debug, Clone)]
pub struct StorageProxy {
    proxy_prefix: String,
    placeholder_prefix: String,
    markers: Vec<String>,
}

impl StorageProxy {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            proxy_prefix: config.proxy_prefix.clone(),
            placeholder_prefix: config.placeholder_prefix.clone(),
            markers: config.storage_url_markers.clone(),
        }
    }
}

impl ImageUrlRewriter for StorageProxy {
    fn rewrite(&self, src: &str) -> String {
        // Already-proxied, placeholder, and data URIs pass through so a
        // second rewrite never double-encodes.
        if src.is_empty()
            || src.starts_with("data:")
            || src.starts_with(&self.proxy_prefix)
            || src.starts_with(&self.placeholder_prefix)
        {
            return src.to_string();
        }
        if self.markers.iter().any(|marker| src.contains(marker)) {
            return format!("{}{}", self.proxy_prefix, url_encode(src));
        }
        src.to_string()
    }
}

/// Passthrough rewriter for callers whose image hosts are already
/// browser-reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProxy;

impl ImageUrlRewriter for NoProxy {
    fn rewrite(&self, src: &str) -> String {
        src.to_string()
    }
}

// ---------------------------------------------------------------------------
// Placeholder URLs
// ---------------------------------------------------------------------------

/// Builds the load-failure fallback URL:
/// `{prefix}/{width}/{height}?text={urlencoded}`.
pub fn placeholder_url(prefix: &str, text: &str, width: u32, height: u32) -> String {
    format!("{prefix}/{width}/{height}?text={}", url_encode(text))
}

pub(crate) fn url_encode(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy() -> StorageProxy {
        StorageProxy::from_config(&RenderConfig::default())
    }

    #[test]
    fn storage_urls_are_proxied_and_encoded() {
        let src = "https://cdn.example.com/storage/v1/object/public/img/chart 1.png";
        let out = proxy().rewrite(src);
        assert!(out.starts_with("/api/image-proxy?url="));
        assert!(out.contains("chart+1.png") || out.contains("chart%201.png"));
        assert!(!out.contains(' '));
    }

    #[test]
    fn rewriting_is_idempotent() {
        let proxy = proxy();
        let once = proxy.rewrite("https://cdn.example.com/storage/v1/object/public/a.png");
        let twice = proxy.rewrite(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn data_uris_and_foreign_hosts_pass_through() {
        let proxy = proxy();
        assert_eq!(proxy.rewrite("data:image/png;base64,AAAA"), "data:image/png;base64,AAAA");
        assert_eq!(
            proxy.rewrite("https://other.example.com/pic.jpg"),
            "https://other.example.com/pic.jpg"
        );
        assert_eq!(proxy.rewrite(""), "");
    }

    #[test]
    fn placeholder_urls_pass_through() {
        let proxy = proxy();
        let placeholder = placeholder_url("/api/placeholder", "Revenue chart", 800, 400);
        assert_eq!(proxy.rewrite(&placeholder), placeholder);
    }

    #[test]
    fn placeholder_url_encodes_text() {
        let url = placeholder_url("/api/placeholder", "Q3 results & outlook", 800, 400);
        assert_eq!(url, "/api/placeholder/800/400?text=Q3+results+%26+outlook");
    }

    #[test]
    fn no_proxy_is_identity() {
        let src = "https://cdn.example.com/storage/v1/object/public/a.png";
        assert_eq!(NoProxy.rewrite(src), src);
    }
}
