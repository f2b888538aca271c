//! Endpoint resolution.
//!
//! Maps a `(region, product)` pair to the domain serving it. The resolver is
//! read-only once built and is shared by the client behind an `Arc`.

use crate::error::{AcsError, ConfigurationError};
use serde::Deserialize;
use std::collections::HashMap;

/// Endpoint table shipped with the crate.
const BUILTIN_ENDPOINTS: &str = include_str!("endpoints.json");

#[derive(Debug, Deserialize)]
struct EndpointTable {
    endpoints: Vec<EndpointGroup>,
}

#[derive(Debug, Deserialize)]
struct EndpointGroup {
    regions: Vec<String>,
    products: Vec<ProductDomain>,
}

#[derive(Debug, Deserialize)]
struct ProductDomain {
    product: String,
    domain: String,
}

/// Case-insensitive `(region, product) -> domain` lookup.
#[derive(Debug, Clone, Default)]
pub struct EndpointResolver {
    entries: HashMap<(String, String), String>,
}

impl EndpointResolver {
    /// Resolver over the embedded endpoint table.
    pub fn builtin() -> Result<Self, AcsError> {
        Self::builder().with_builtin().build()
    }

    /// Resolver over a JSON table in the embedded table's format.
    pub fn from_json(json: &str) -> Result<Self, AcsError> {
        Self::builder().with_json(json).build()
    }

    /// Create a resolver builder.
    pub fn builder() -> EndpointResolverBuilder {
        EndpointResolverBuilder::default()
    }

    /// Domain for the product in the region, if known.
    pub fn resolve(&self, region_id: &str, product: &str) -> Option<&str> {
        self.entries
            .get(&key(region_id, product))
            .map(String::as_str)
    }

    /// Number of `(region, product)` entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entry is known.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn key(region_id: &str, product: &str) -> (String, String) {
    (region_id.to_lowercase(), product.to_lowercase())
}

enum Source {
    Json(String),
    Entry {
        region_id: String,
        product: String,
        domain: String,
    },
}

/// Builder for [`EndpointResolver`]. Later sources override earlier ones.
#[derive(Default)]
pub struct EndpointResolverBuilder {
    sources: Vec<Source>,
}

impl EndpointResolverBuilder {
    /// Include the embedded endpoint table.
    pub fn with_builtin(self) -> Self {
        self.with_json(BUILTIN_ENDPOINTS)
    }

    /// Include a JSON endpoint table.
    pub fn with_json(mut self, json: impl Into<String>) -> Self {
        self.sources.push(Source::Json(json.into()));
        self
    }

    /// Add or override one entry.
    pub fn endpoint(
        mut self,
        region_id: impl Into<String>,
        product: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        self.sources.push(Source::Entry {
            region_id: region_id.into(),
            product: product.into(),
            domain: domain.into(),
        });
        self
    }

    /// Build the resolver.
    pub fn build(self) -> Result<EndpointResolver, AcsError> {
        let mut entries = HashMap::new();

        for source in self.sources {
            match source {
                Source::Json(json) => {
                    let table: EndpointTable = serde_json::from_str(&json).map_err(|e| {
                        ConfigurationError::InvalidEndpointTable {
                            message: e.to_string(),
                        }
                    })?;
                    for group in table.endpoints {
                        for region_id in &group.regions {
                            for product in &group.products {
                                entries.insert(
                                    key(region_id, &product.product),
                                    product.domain.clone(),
                                );
                            }
                        }
                    }
                }
                Source::Entry {
                    region_id,
                    product,
                    domain,
                } => {
                    entries.insert(key(&region_id, &product), domain);
                }
            }
        }

        Ok(EndpointResolver { entries })
    }
}

impl std::fmt::Debug for EndpointResolverBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointResolverBuilder")
            .field("sources", &self.sources.len())
            .finish()
    }
}
