use serde::Serialize;

use crate::catalog::store::Catalog;
use crate::core::types::{AttributeKey, DatasetId};
use crate::navigation::history::{History, MemoryHistory};
use crate::navigation::locator::{resolve, resolve_locator, Locator, Route, View};

/// What is focused. Datasets and attributes are independent slots; only the
/// active view's slot is surfaced and persisted in the locator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusState {
    pub view: View,
    pub dataset: Option<DatasetId>,
    pub attribute: Option<AttributeKey>,
}

impl FocusState {
    /// Locator for the active view's focused entity
    #[must_use]
    pub fn active_locator(&self) -> Option<Locator> {
        match self.view {
            View::Datasets => self.dataset.clone().map(Locator::Dataset),
            View::Attributes => self.attribute.clone().map(Locator::Attribute),
        }
    }

    #[must_use]
    pub fn is_unfocused(&self) -> bool {
        self.dataset.is_none() && self.attribute.is_none()
    }
}

/// State changes for a rendering layer to paint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    ViewChanged(View),
    DatasetFocused(DatasetId),
    AttributeFocused(AttributeKey),
    /// A locator or selection named an entity the catalog does not have
    NotFound(Locator),
    /// A new location was pushed (fragment without `#`)
    LocatorChanged(String),
}

/// Default selection applied on cold load, after any incoming locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColdStart {
    /// Leave slots not named by the locator empty
    Nothing,
    /// Focus the first dataset and first attribute when their slot is free
    #[default]
    FirstEntity,
}

/// Focus state machine bound to a history.
///
/// Starts `Unfocused`; [`Navigator::start`] runs once the catalog is loaded.
#[derive(Debug)]
pub struct Navigator<H = MemoryHistory> {
    history: H,
    state: FocusState,
    events: Vec<NavigationEvent>,
}

impl<H: History> Navigator<H> {
    pub fn new(history: H) -> Self {
        Self {
            history,
            state: FocusState::default(),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &FocusState {
        &self.state
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    /// Drain pending events, oldest first
    pub fn take_events(&mut self) -> Vec<NavigationEvent> {
        std::mem::take(&mut self.events)
    }

    /// Cold load: honor the incoming locator, then apply the default policy
    /// to slots the locator did not address. Auto-selection does not change
    /// the address.
    pub fn start(&mut self, catalog: &Catalog, policy: ColdStart) -> Route {
        let route = resolve(catalog, self.history.current());
        self.apply_route(&route);

        if policy == ColdStart::FirstEntity {
            let addressed = route.locator().map(Locator::view);

            if self.state.dataset.is_none() && addressed != Some(View::Datasets) {
                if let Some(id) = catalog.datasets().iter().find_map(|d| d.id.clone()) {
                    self.focus_dataset(id);
                }
            }
            if self.state.attribute.is_none() && addressed != Some(View::Attributes) {
                if let Some(key) = catalog.attributes().iter().find_map(|a| a.key.clone()) {
                    self.focus_attribute(key);
                }
            }
        }

        tracing::debug!("Navigator started at {:?}: {:?}", route, self.state);
        route
    }

    /// Re-read the history after back/forward navigation
    pub fn sync_from_history(&mut self, catalog: &Catalog) -> Route {
        let route = resolve(catalog, self.history.current());
        self.apply_route(&route);
        route
    }

    /// Focus a dataset and show the datasets view
    pub fn select_dataset(&mut self, catalog: &Catalog, id: &str) -> Route {
        self.select(catalog, Locator::dataset(id))
    }

    /// Focus an attribute and show the attributes view
    pub fn select_attribute(&mut self, catalog: &Catalog, key: &str) -> Route {
        self.select(catalog, Locator::attribute(key))
    }

    /// Switch views, persisting that view's focus (or a clean location)
    pub fn show_view(&mut self, view: View) {
        self.set_view(view);
        let fragment = self
            .state
            .active_locator()
            .map(|locator| locator.encode())
            .unwrap_or_default();
        self.set_locator(&fragment);
    }

    /// Persist a locator. Identical locators are a no-op; an empty one is
    /// the clean location. Returns true if a location was pushed.
    pub fn set_locator(&mut self, fragment: &str) -> bool {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        if fragment == self.history.current() {
            return false;
        }
        self.history.push(fragment);
        self.events
            .push(NavigationEvent::LocatorChanged(fragment.to_string()));
        true
    }

    fn select(&mut self, catalog: &Catalog, locator: Locator) -> Route {
        let route = resolve_locator(catalog, locator);
        self.apply_route(&route);
        if let Route::Found(locator) = &route {
            self.set_locator(&locator.encode());
        }
        route
    }

    fn apply_route(&mut self, route: &Route) {
        match route {
            Route::Found(locator) => {
                self.set_view(locator.view());
                match locator {
                    Locator::Dataset(id) => self.focus_dataset(id.clone()),
                    Locator::Attribute(key) => self.focus_attribute(key.clone()),
                }
            }
            Route::NotFound(locator) => {
                self.set_view(locator.view());
                self.events.push(NavigationEvent::NotFound(locator.clone()));
            }
            Route::NoRoute => {}
        }
    }

    fn set_view(&mut self, view: View) {
        if self.state.view != view {
            self.state.view = view;
            self.events.push(NavigationEvent::ViewChanged(view));
        }
    }

    fn focus_dataset(&mut self, id: DatasetId) {
        if self.state.dataset.as_ref() != Some(&id) {
            self.state.dataset = Some(id.clone());
            self.events.push(NavigationEvent::DatasetFocused(id));
        }
    }

    fn focus_attribute(&mut self, key: AttributeKey) {
        if self.state.attribute.as_ref() != Some(&key) {
            self.state.attribute = Some(key.clone());
            self.events.push(NavigationEvent::AttributeFocused(key));
        }
    }
}
