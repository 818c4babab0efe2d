use serde::Serialize;

use crate::catalog::store::Catalog;
use crate::core::types::{AttributeKey, DatasetId};

/// The two list/detail views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Datasets,
    Attributes,
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Datasets => write!(f, "datasets"),
            Self::Attributes => write!(f, "attributes"),
        }
    }
}

/// A shareable reference to one focused entity, e.g. `dataset=blm_roads`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Dataset(DatasetId),
    Attribute(AttributeKey),
}

impl Locator {
    const DATASET_KEY: &'static str = "dataset";
    const ATTRIBUTE_KEY: &'static str = "attribute";

    pub fn dataset(id: impl Into<String>) -> Self {
        Self::Dataset(DatasetId::new(id))
    }

    pub fn attribute(key: impl Into<String>) -> Self {
        Self::Attribute(AttributeKey::new(key))
    }

    /// View that displays the referenced entity
    #[must_use]
    pub fn view(&self) -> View {
        match self {
            Self::Dataset(_) => View::Datasets,
            Self::Attribute(_) => View::Attributes,
        }
    }

    #[must_use]
    pub fn entity_id(&self) -> &str {
        match self {
            Self::Dataset(id) => id.as_str(),
            Self::Attribute(key) => key.as_str(),
        }
    }

    /// `key=value` with the value percent-encoded, without a leading `#`
    #[must_use]
    pub fn encode(&self) -> String {
        let key = match self {
            Self::Dataset(_) => Self::DATASET_KEY,
            Self::Attribute(_) => Self::ATTRIBUTE_KEY,
        };
        format!("{key}={}", urlencoding::encode(self.entity_id()))
    }

    /// Parse a fragment such as `#dataset=blm_roads` or `attribute=width`.
    ///
    /// Returns `None` for an empty fragment, an unknown key, an empty value or
    /// a value that does not decode to UTF-8.
    #[must_use]
    pub fn parse(fragment: &str) -> Option<Self> {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        let (key, value) = fragment.split_once('=')?;
        let value = urlencoding::decode(value).ok()?;
        if value.is_empty() {
            return None;
        }
        match key {
            Self::DATASET_KEY => Some(Self::dataset(value.into_owned())),
            Self::ATTRIBUTE_KEY => Some(Self::attribute(value.into_owned())),
            _ => None,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.encode())
    }
}

/// Outcome of resolving a locator against a loaded catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The locator names an entity present in the catalog
    Found(Locator),
    /// Well-formed locator, but the entity is not in the catalog
    NotFound(Locator),
    /// Empty or unrecognized locator
    NoRoute,
}

impl Route {
    #[must_use]
    pub fn locator(&self) -> Option<&Locator> {
        match self {
            Self::Found(locator) | Self::NotFound(locator) => Some(locator),
            Self::NoRoute => None,
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Short machine-readable name: `found`, `not_found` or `none`
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Found(_) => "found",
            Self::NotFound(_) => "not_found",
            Self::NoRoute => "none",
        }
    }

    /// Message shown in place of the detail panel for a dangling link
    #[must_use]
    pub fn not_found_message(&self) -> Option<String> {
        match self {
            Self::NotFound(Locator::Dataset(id)) => Some(format!("Dataset not found: {id}")),
            Self::NotFound(Locator::Attribute(key)) => Some(format!("Attribute not found: {key}")),
            _ => None,
        }
    }
}

/// Check that a locator's entity exists in the catalog
#[must_use]
pub fn resolve_locator(catalog: &Catalog, locator: Locator) -> Route {
    let exists = match &locator {
        Locator::Dataset(id) => catalog.dataset(id.as_str()).is_some(),
        Locator::Attribute(key) => catalog.attribute(key.as_str()).is_some(),
    };
    if exists {
        Route::Found(locator)
    } else {
        tracing::debug!("Locator {locator} does not match any catalog entry");
        Route::NotFound(locator)
    }
}

/// Parse a fragment and resolve it against the catalog
#[must_use]
pub fn resolve(catalog: &Catalog, fragment: &str) -> Route {
    match Locator::parse(fragment) {
        Some(locator) => resolve_locator(catalog, locator),
        None => Route::NoRoute,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(Locator::dataset("blm_roads").encode(), "dataset=blm_roads");
        assert_eq!(
            Locator::attribute("fuel type/class").encode(),
            "attribute=fuel%20type%2Fclass"
        );
        assert_eq!(Locator::dataset("a").to_string(), "#dataset=a");
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            Locator::parse("#dataset=blm_roads"),
            Some(Locator::dataset("blm_roads"))
        );
        assert_eq!(
            Locator::parse("attribute=fuel%20type"),
            Some(Locator::attribute("fuel type"))
        );
        assert_eq!(Locator::parse(""), None);
        assert_eq!(Locator::parse("#"), None);
        assert_eq!(Locator::parse("#dataset="), None);
        assert_eq!(Locator::parse("#layer=x"), None);
        assert_eq!(Locator::parse("#dataset"), None);
        assert_eq!(Locator::parse("#dataset=%FF"), None);
    }

    #[test]
    fn test_value_may_contain_equals() {
        assert_eq!(
            Locator::parse("dataset=a%3Db"),
            Some(Locator::dataset("a=b"))
        );
        assert_eq!(Locator::parse("dataset=a=b"), Some(Locator::dataset("a=b")));
    }

    #[test]
    fn test_round_trip_through_catalog() {
        let catalog = Catalog::load_embedded().unwrap();
        for dataset in catalog.datasets() {
            let locator = Locator::dataset(dataset.id_str().unwrap());
            let route = resolve(&catalog, &locator.to_string());
            assert_eq!(route, Route::Found(locator));
        }
    }

    #[test]
    fn test_missing_entity_is_not_found() {
        let catalog = Catalog::load_embedded().unwrap();
        let route = resolve(&catalog, "#dataset=does_not_exist");
        assert_eq!(
            route,
            Route::NotFound(Locator::dataset("does_not_exist"))
        );
        assert_eq!(route.locator().map(Locator::view), Some(View::Datasets));

        let route = resolve(&catalog, "#attribute=nope");
        assert!(matches!(route, Route::NotFound(Locator::Attribute(_))));

        assert_eq!(resolve(&catalog, ""), Route::NoRoute);
    }

    #[test]
    fn test_route_kind_and_message() {
        let missing = Route::NotFound(Locator::dataset("gone"));
        assert_eq!(missing.kind(), "not_found");
        assert_eq!(
            missing.not_found_message().as_deref(),
            Some("Dataset not found: gone")
        );
        assert_eq!(
            Route::NotFound(Locator::attribute("x")).not_found_message().as_deref(),
            Some("Attribute not found: x")
        );
        assert_eq!(Route::Found(Locator::dataset("a")).not_found_message(), None);
        assert_eq!(Route::NoRoute.kind(), "none");
    }
}
