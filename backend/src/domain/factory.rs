//! Factory catalog: the set of factories the portal reports on.
//!
//! The catalog is an explicitly constructed value injected into services
//! and handlers at assembly time; there is no ambient/global registry.
//! Deployments may override the built-in catalog with a TOML file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{FactoryId, PrincipalValidationError};

/// Display metadata for one factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FactoryProfile {
    /// Human-readable name shown on dashboards and exports.
    pub name: String,
    /// Products the factory reports on.
    pub products: Vec<String>,
    /// Unit label for quantities (e.g. `Quintal`, `Paket`).
    pub sku_unit: String,
}

/// Errors raised when loading a catalog from configuration.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The TOML document could not be parsed.
    #[error("factory catalog is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    /// A table key is not a valid factory id.
    #[error("invalid factory id {raw:?}: {source}")]
    InvalidFactoryId {
        raw: String,
        source: PrincipalValidationError,
    },
    /// The catalog must describe at least one factory.
    #[error("factory catalog must not be empty")]
    Empty,
}

/// Immutable catalog of factories keyed by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryCatalog {
    factories: BTreeMap<FactoryId, FactoryProfile>,
}

impl FactoryCatalog {
    /// Build a catalog from explicit entries.
    pub fn new(entries: impl IntoIterator<Item = (FactoryId, FactoryProfile)>) -> Self {
        Self {
            factories: entries.into_iter().collect(),
        }
    }

    /// The default catalog shipped with the portal.
    pub fn builtin() -> Self {
        let entries = [
            (
                "amen_water",
                "Amen (Victory) Water",
                &["360ml", "600ml", "1000ml", "2000ml"][..],
                "Paket",
            ),
            (
                "mintu_plast",
                "Mintu Plast",
                &[
                    "Preform 27g/28mm",
                    "Preform 28g/28mm",
                    "Preform 42g/28mm",
                    "Preform 24g/28mm",
                    "Preform 20g/28mm",
                    "Preform 39g/30mm",
                    "Preform 17.5g/30mm",
                    "Preform 15g/30mm",
                    "Cap 1.75g/30mm",
                    "Cap 2.6g/28mm",
                ][..],
                "Pieces",
            ),
            (
                "mintu_export",
                "Mintu Export",
                &["Sesame", "Niger", "Chickpea", "Red Bean"][..],
                "Quintal",
            ),
            (
                "wakene_food",
                "Wakene Food Complex",
                &["Flour", "Fruska (Wheat Bran)", "Fruskelo (Wheat Germ)"][..],
                "Quintal",
            ),
        ];
        Self::new(entries.into_iter().map(|(id, name, products, unit)| {
            let factory_id = FactoryId::new(id)
                .unwrap_or_else(|err| panic!("builtin factory id {id:?} must validate: {err}"));
            let profile = FactoryProfile {
                name: name.into(),
                products: products.iter().map(|product| (*product).into()).collect(),
                sku_unit: unit.into(),
            };
            (factory_id, profile)
        }))
    }

    /// Parse a catalog from a TOML document.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::FactoryCatalog;
    ///
    /// let toml = r#"
    /// [wakene_food]
    /// name = "Wakene Food Complex"
    /// products = ["Flour"]
    /// sku-unit = "Quintal"
    /// "#;
    /// let catalog = FactoryCatalog::from_toml_str(toml).expect("valid catalog");
    /// assert_eq!(catalog.len(), 1);
    /// ```
    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "kebab-case")]
        struct ProfileDoc {
            name: String,
            products: Vec<String>,
            sku_unit: String,
        }

        let doc: BTreeMap<String, ProfileDoc> = toml::from_str(raw)?;
        if doc.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut factories = BTreeMap::new();
        for (raw_id, profile) in doc {
            let factory_id =
                FactoryId::new(raw_id.clone()).map_err(|source| CatalogError::InvalidFactoryId {
                    raw: raw_id,
                    source,
                })?;
            factories.insert(
                factory_id,
                FactoryProfile {
                    name: profile.name,
                    products: profile.products,
                    sku_unit: profile.sku_unit,
                },
            );
        }
        Ok(Self { factories })
    }

    /// Look up a factory's profile.
    pub fn profile(&self, factory_id: &FactoryId) -> Option<&FactoryProfile> {
        self.factories.get(factory_id)
    }

    /// Whether the catalog knows this factory.
    pub fn contains(&self, factory_id: &FactoryId) -> bool {
        self.factories.contains_key(factory_id)
    }

    /// Display name for a factory, falling back to the raw id for
    /// records that predate a catalog change.
    pub fn display_name(&self, factory_id: &FactoryId) -> String {
        self.profile(factory_id)
            .map_or_else(|| factory_id.to_string(), |profile| profile.name.clone())
    }

    /// SKU unit label for a factory, falling back to `Unit`.
    pub fn sku_unit(&self, factory_id: &FactoryId) -> String {
        self.profile(factory_id)
            .map_or_else(|| "Unit".into(), |profile| profile.sku_unit.clone())
    }

    /// Iterate over factories in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&FactoryId, &FactoryProfile)> {
        self.factories.iter()
    }

    /// Number of factories in the catalog.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
