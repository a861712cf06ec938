//! Formula registry client
//!
//! Resolves a package name to its published version and per-platform bottle
//! hashes via the registry's JSON API. Packages with a pinned override skip
//! the network entirely and produce a [`Formula`] of identical shape.

use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::core::formula::{resolved_version, Bottle, Formula, FormulaSource};
use crate::core::manifest::PackageSpec;
use crate::types::{Platform, Sha256Hash};

/// Public formula registry.
pub const DEFAULT_REGISTRY_URL: &str = "https://formulae.brew.sh";

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No {platform} bottle published for {name}")]
    MissingPlatform { name: String, platform: Platform },

    #[error("Registry returned an invalid hash for {name}: {detail}")]
    InvalidHash { name: String, detail: String },
}

#[derive(Debug, Deserialize)]
struct FormulaPayload {
    versions: Versions,
    #[serde(default)]
    revision: u32,
    bottle: BottleSection,
}

#[derive(Debug, Deserialize)]
struct Versions {
    stable: String,
}

#[derive(Debug, Deserialize)]
struct BottleSection {
    stable: BottleFiles,
}

#[derive(Debug, Deserialize)]
struct BottleFiles {
    files: HashMap<String, BottleFile>,
}

#[derive(Debug, Deserialize)]
struct BottleFile {
    sha256: String,
}

/// Client for formula metadata lookups.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: String,
}

impl RegistryClient {
    /// Create a client against a registry base URL.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Resolve a package to a [`Formula`] covering `platforms`.
    ///
    /// Pinned packages are materialized locally; everything else is fetched
    /// from the registry API.
    pub async fn resolve(
        &self,
        spec: &PackageSpec,
        platforms: &[Platform],
    ) -> Result<Formula, RegistryError> {
        match spec.source {
            FormulaSource::Pinned { version, sha256 } => {
                resolve_pinned(spec.name, version, sha256, platforms)
            }
            FormulaSource::Registry => self.resolve_remote(spec.name, platforms).await,
        }
    }

    async fn resolve_remote(
        &self,
        name: &str,
        platforms: &[Platform],
    ) -> Result<Formula, RegistryError> {
        let url = format!("{}/api/formula/{name}.json", self.base_url);
        tracing::debug!("Fetching formula metadata: {url}");

        let payload: FormulaPayload = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let version = resolved_version(&payload.versions.stable, payload.revision);

        let mut bottles = Vec::with_capacity(platforms.len());
        for &platform in platforms {
            let file = payload.bottle.stable.files.get(platform.tag()).ok_or_else(|| {
                RegistryError::MissingPlatform {
                    name: name.to_string(),
                    platform,
                }
            })?;

            let sha256 = Sha256Hash::validated(&file.sha256).map_err(|detail| {
                RegistryError::InvalidHash {
                    name: name.to_string(),
                    detail,
                }
            })?;

            bottles.push(Bottle { platform, sha256 });
        }

        Ok(Formula {
            name: name.to_string(),
            version,
            bottles,
        })
    }
}

fn resolve_pinned(
    name: &str,
    version: &str,
    pins: &[(Platform, &str)],
    platforms: &[Platform],
) -> Result<Formula, RegistryError> {
    let mut bottles = Vec::with_capacity(platforms.len());
    for &platform in platforms {
        let (_, hash) = pins.iter().find(|(p, _)| *p == platform).ok_or_else(|| {
            RegistryError::MissingPlatform {
                name: name.to_string(),
                platform,
            }
        })?;

        bottles.push(Bottle {
            platform,
            sha256: Sha256Hash::new(*hash),
        });
    }

    Ok(Formula {
        name: name.to_string(),
        version: version.to_string(),
        bottles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const ITEMS: &[&str] = &["lib/libpng16.16.dylib"];

    fn payload(version: &str, revision: u32) -> String {
        serde_json::json!({
            "versions": { "stable": version },
            "revision": revision,
            "bottle": { "stable": { "files": {
                "big_sur": { "sha256": "a".repeat(64) },
                "arm64_big_sur": { "sha256": "b".repeat(64) },
            } } }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_resolve_remote_revision_zero() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/formula/libpng.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(payload("1.6.40", 0))
            .create_async()
            .await;

        let registry = RegistryClient::new(Client::new(), server.url());
        let spec = PackageSpec {
            name: "libpng",
            items: ITEMS,
            source: FormulaSource::Registry,
        };

        let formula = registry
            .resolve(&spec, &[Platform::BigSur, Platform::Arm64BigSur])
            .await
            .unwrap();

        assert_eq!(formula.version, "1.6.40");
        assert_eq!(formula.bottles.len(), 2);
        assert_eq!(formula.bottles[0].sha256.as_str(), "a".repeat(64));
        assert_eq!(formula.bottles[1].sha256.as_str(), "b".repeat(64));
    }

    #[tokio::test]
    async fn test_resolve_remote_nonzero_revision() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/formula/libpng.json")
            .with_status(200)
            .with_body(payload("1.6.40", 2))
            .create_async()
            .await;

        let registry = RegistryClient::new(Client::new(), server.url());
        let spec = PackageSpec {
            name: "libpng",
            items: ITEMS,
            source: FormulaSource::Registry,
        };

        let formula = registry
            .resolve(&spec, &[Platform::BigSur])
            .await
            .unwrap();

        assert_eq!(formula.version, "1.6.40_2");
    }

    #[tokio::test]
    async fn test_resolve_remote_missing_platform() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/formula/libpng.json")
            .with_status(200)
            .with_body(payload("1.6.40", 0))
            .create_async()
            .await;

        let registry = RegistryClient::new(Client::new(), server.url());
        let spec = PackageSpec {
            name: "libpng",
            items: ITEMS,
            source: FormulaSource::Registry,
        };

        let err = registry
            .resolve(&spec, &[Platform::Catalina])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RegistryError::MissingPlatform {
                platform: Platform::Catalina,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_resolve_remote_http_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/formula/nope.json")
            .with_status(404)
            .create_async()
            .await;

        let registry = RegistryClient::new(Client::new(), server.url());
        let spec = PackageSpec {
            name: "nope",
            items: ITEMS,
            source: FormulaSource::Registry,
        };

        let err = registry.resolve(&spec, &[Platform::BigSur]).await.unwrap_err();
        assert!(matches!(err, RegistryError::Http(_)));
    }

    #[tokio::test]
    async fn test_resolve_pinned_makes_no_request() {
        // Unroutable base URL: any network attempt would error out.
        let registry = RegistryClient::new(Client::new(), "http://127.0.0.1:1");
        let spec = PackageSpec {
            name: "libpng",
            items: ITEMS,
            source: FormulaSource::Pinned {
                version: "1.6.39",
                sha256: &[(
                    Platform::Catalina,
                    "13780286d987167f7e50aea65947e1460a6616d0f1b224b37f8351775eab72f3",
                )],
            },
        };

        let formula = registry
            .resolve(&spec, &[Platform::Catalina])
            .await
            .unwrap();

        assert_eq!(formula.version, "1.6.39");
        assert_eq!(
            formula.bottles[0].sha256.as_str(),
            "13780286d987167f7e50aea65947e1460a6616d0f1b224b37f8351775eab72f3"
        );
    }

    #[tokio::test]
    async fn test_resolve_pinned_missing_platform() {
        let registry = RegistryClient::new(Client::new(), "http://127.0.0.1:1");
        let spec = PackageSpec {
            name: "libpng",
            items: ITEMS,
            source: FormulaSource::Pinned {
                version: "1.6.39",
                sha256: &[(Platform::Catalina, "13780286")],
            },
        };

        let err = registry
            .resolve(&spec, &[Platform::BigSur])
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::MissingPlatform { .. }));
    }
}
