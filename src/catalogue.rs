use serde::Deserialize;
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use tracing::{debug, warn};

use std::{collections::HashMap, path::Path};

use crate::{
    error::{read_input, LoadError},
    money::Money,
};

/// One catalogue entry as it appears in the JSON file.
///
/// Both fields are optional here so that an incomplete entry can be reported
/// and skipped, rather than failing the whole file.
#[serde_as]
#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(alias = "id")]
    title: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    price: Option<Money>,
}

/// Maps product titles to unit prices.
///
/// To load a catalogue, use [`Catalogue::from_file`] or
/// [`Catalogue::from_json`]. The expected format is a JSON array of objects,
/// each with a `title` and a `price`:
///
/// ```json
/// [
///   { "title": "Elote", "price": 2.5 },
///   { "title": "Tamal", "price": "1.75" }
/// ]
/// ```
///
/// Entries with no title, no price, or a price that is not a non-negative
/// number are skipped with a warning. So is an entry that gives both `title`
/// and its short form `id`. If a title appears more than once, the
/// last entry wins.
#[derive(Debug, Default)]
pub struct Catalogue {
    prices: HashMap<String, Money>,
}

impl Catalogue {
    /// Creates a new, empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the catalogue from the JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::FileNotFound`] if the file can't be read, and
    /// [`LoadError::MalformedInput`] if its content isn't a JSON array of
    /// objects.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::from_json(&read_input(path.as_ref())?)
    }

    /// Parses a catalogue from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MalformedInput`] if `json` isn't a JSON array of
    /// objects.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let items: Vec<Value> = serde_json::from_str(json)?;
        let mut catalogue = Self::new();
        for (idx, item) in items.into_iter().enumerate() {
            if !item.is_object() {
                return Err(LoadError::MalformedInput(format!(
                    "catalogue item {idx} is not an object"
                )));
            }
            let entry = match Entry::deserialize(item) {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(item = idx, error = %err, "skipping unreadable catalogue item");
                    continue;
                }
            };
            let Some(title) = entry.title else {
                warn!(item = idx, "catalogue item has no title, skipping");
                continue;
            };
            let Some(price) = entry.price else {
                warn!(item = idx, %title, "catalogue item has no price, skipping");
                continue;
            };
            if !price.is_valid_price() {
                warn!(item = idx, %title, %price, "invalid price, skipping");
                continue;
            }
            catalogue.insert(title, price);
        }
        debug!(products = catalogue.len(), "catalogue loaded");
        Ok(catalogue)
    }

    /// Sets the unit price for `title`, replacing any earlier price.
    pub fn insert(&mut self, title: impl Into<String>, price: Money) {
        let title = title.into();
        if let Some(old) = self.prices.insert(title.clone(), price) {
            warn!(%title, %old, new = %price, "duplicate catalogue title, keeping the later price");
        }
    }

    /// Returns the unit price for `title`, if it is in the catalogue.
    #[must_use]
    pub fn price(&self, title: &str) -> Option<Money> {
        self.prices.get(title).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
