//! Registry of static assets served alongside the viewer.

use std::borrow::Cow;
use std::collections::HashMap;

use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Embedded;

/// A named static payload.
#[derive(Debug, Clone)]
pub struct Asset {
    pub content_type: String,
    pub data: Cow<'static, [u8]>,
}

/// Immutable once built; shared read-only across requests.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    assets: HashMap<String, Asset>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from the files embedded at compile time.
    pub fn embedded() -> Self {
        let mut registry = Self::new();
        for name in Embedded::iter() {
            if let Some(file) = Embedded::get(&name) {
                registry.insert(name.into_owned(), file.data);
            }
        }
        tracing::debug!(count = registry.len(), "Loaded embedded assets");
        registry
    }

    /// Adds an asset, inferring its content type from the file extension.
    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Cow<'static, [u8]>>) {
        let name = name.into();
        let content_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .to_string();
        self.assets.insert(
            name,
            Asset {
                content_type,
                data: data.into(),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&Asset> {
        self.assets.get(name)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_assets() {
        let registry = AssetRegistry::embedded();
        assert_eq!(registry.get("rpcstats.css").unwrap().content_type, "text/css");
        assert!(registry
            .get("rpcstats.js")
            .unwrap()
            .content_type
            .contains("javascript"));
        assert!(registry.get("missing.gif").is_none());
    }

    #[test]
    fn test_content_type_inference() {
        let mut registry = AssetRegistry::new();
        registry.insert("plus.gif", &b"GIF89a"[..]);
        registry.insert("blob", &b"\x00"[..]);

        assert_eq!(registry.get("plus.gif").unwrap().content_type, "image/gif");
        assert_eq!(
            registry.get("blob").unwrap().content_type,
            "application/octet-stream"
        );
        assert_eq!(registry.len(), 2);
    }
}
