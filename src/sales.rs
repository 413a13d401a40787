use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

use std::path::Path;

use crate::error::{read_input, LoadError};

/// The quantity field of a sale, as found in the input.
///
/// Quantities are kept as written, and only judged when the sale is priced, so
/// that a bad quantity excludes one sale rather than failing the whole file.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Quantity {
    /// No quantity given, or `null`.
    #[default]
    Missing,
    /// A number, or a string holding one.
    Units(f64),
    /// Anything else.
    Invalid,
}

impl Quantity {
    /// Returns the number of units sold, if this is a finite, non-negative
    /// number.
    #[must_use]
    pub fn units(self) -> Option<f64> {
        match self {
            Self::Units(q) if q.is_finite() && q >= 0.0 => Some(q),
            _ => None,
        }
    }
}

impl From<&Value> for Quantity {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Missing,
            Value::Number(n) => n.as_f64().map_or(Self::Invalid, Self::Units),
            Value::String(s) => s.trim().parse::<f64>().map_or(Self::Invalid, Self::Units),
            _ => Self::Invalid,
        }
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from(&Value::deserialize(deserializer)?))
    }
}

/// Renders a scalar as text: strings as-is, anything else as JSON.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Reads an optional label field, accepting numbers as well as strings.
fn label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(text(&Value::deserialize(deserializer)?))
}

/// Defines the JSON format for one sale.
///
/// `Product` must be a string. `SALE_ID` and `SALE_Date` are only labels, so
/// numbers are accepted for them too.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Sale {
    #[serde(rename = "SALE_ID", default, deserialize_with = "label")]
    pub id: Option<String>,
    #[serde(rename = "SALE_Date", default, deserialize_with = "label")]
    pub date: Option<String>,
    #[serde(rename = "Product", alias = "id", default)]
    pub product: Option<String>,
    #[serde(rename = "Quantity", alias = "qty", default)]
    pub quantity: Quantity,
}

impl Sale {
    #[must_use]
    pub fn new(product: &str, quantity: f64) -> Self {
        Self {
            product: Some(product.to_string()),
            quantity: Quantity::Units(quantity),
            ..Self::default()
        }
    }

    /// Recovers what can be shown in the report from a record that doesn't
    /// fit the [`Sale`] format.
    fn salvage(record: &Value) -> Self {
        let product = record
            .get("Product")
            .or_else(|| record.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            id: record.get("SALE_ID").and_then(text),
            date: record.get("SALE_Date").and_then(text),
            product,
            quantity: Quantity::Missing,
        }
    }
}

/// A sale record that is a JSON object, but couldn't be read as a [`Sale`].
///
/// For example, its `Product` isn't a string, or it names the same field
/// twice (`Product` and `id`). It is priced as a
/// [`RecordError::MalformedRecord`](crate::RecordError::MalformedRecord).
#[derive(Clone, Debug, PartialEq)]
pub struct Unreadable {
    /// Whatever could be recovered from the record.
    pub sale: Sale,
    pub reason: String,
}

/// An ordered list of sale records.
///
/// Records are kept in input order and never merged: two sales of the same
/// product are two separate line items. A record that can't be read is kept
/// in place as an [`Unreadable`], so that it shows up in the report without
/// stopping the others from being counted.
#[derive(Debug, Default)]
pub struct Sales(Vec<Result<Sale, Unreadable>>);

impl Sales {
    /// Reads sales from the JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::FileNotFound`] if the file can't be read, and
    /// [`LoadError::MalformedInput`] if its content isn't a JSON array of
    /// objects.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::from_json(&read_input(path.as_ref())?)
    }

    /// Parses sales from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MalformedInput`] if `json` isn't a JSON array of
    /// objects.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let items: Vec<Value> = serde_json::from_str(json)?;
        let mut sales = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            if !item.is_object() {
                return Err(LoadError::MalformedInput(format!(
                    "sale record {idx} is not an object"
                )));
            }
            let sale = Sale::deserialize(&item).map_err(|err| {
                warn!(sale = idx, error = %err, "unreadable sale record");
                Unreadable {
                    sale: Sale::salvage(&item),
                    reason: err.to_string(),
                }
            });
            sales.push(sale);
        }
        debug!(sales = sales.len(), "sales loaded");
        Ok(Self(sales))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Result<Sale, Unreadable>> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Sale>> for Sales {
    fn from(sales: Vec<Sale>) -> Self {
        Self(sales.into_iter().map(Ok).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(sales: &Sales) -> Vec<&Sale> {
        sales.iter().map(|s| s.as_ref().unwrap()).collect()
    }

    #[test]
    fn from_file_fn_correctly_parses_sales() {
        let sales = Sales::from_file("testdata/sales.json").unwrap();
        assert_eq!(sales.len(), 5);
        let first = read(&sales)[0];
        assert_eq!(first.id.as_deref(), Some("1"));
        assert_eq!(first.date.as_deref(), Some("01/12/23"));
        assert_eq!(first.product.as_deref(), Some("Elote"));
        assert_eq!(first.quantity, Quantity::Units(3.0));
    }

    #[test]
    fn from_file_fn_keeps_repeated_products_as_separate_sales() {
        let sales = Sales::from_file("testdata/sales.json").unwrap();
        let elotes = read(&sales)
            .into_iter()
            .filter(|s| s.product.as_deref() == Some("Elote"))
            .count();
        assert_eq!(elotes, 2);
    }

    #[test]
    fn from_file_fn_returns_file_not_found_for_missing_path() {
        let err = Sales::from_file("testdata/no_such_file.json").unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
    }

    #[test]
    fn from_file_fn_returns_malformed_input_for_invalid_utf8() {
        let err = Sales::from_file("testdata/not_utf8.json").unwrap_err();
        assert!(matches!(err, LoadError::MalformedInput(_)), "{err:?}");
    }

    #[test]
    fn from_json_fn_rejects_malformed_content() {
        for json in [
            "not json",
            r#"{"Product": "A"}"#,
            r#"[{"Product": "A"}, "B"]"#,
            r#"[["A", "d", "A", 3]]"#,
            r#"[{"Product": "A", "Quantity": 1}, null]"#,
        ] {
            let err = Sales::from_json(json).unwrap_err();
            assert!(matches!(err, LoadError::MalformedInput(_)), "{json}");
        }
    }

    #[test]
    fn from_json_fn_accepts_short_field_aliases() {
        let sales = Sales::from_json(r#"[{"id": "A", "qty": 3}]"#).unwrap();
        assert_eq!(read(&sales), vec![&Sale::new("A", 3.0)]);
    }

    #[test]
    fn from_json_fn_keeps_bad_fields_for_later_validation() {
        let sales = Sales::from_json(
            r#"[{"Quantity": 1}, {"Product": "A"}, {"Product": "A", "Quantity": "lots"}, {"Product": "A", "Quantity": "2"}]"#,
        )
        .unwrap();
        let sales = read(&sales);
        assert_eq!(sales[0].product, None);
        assert_eq!(sales[1].quantity, Quantity::Missing);
        assert_eq!(sales[2].quantity, Quantity::Invalid);
        assert_eq!(sales[3].quantity, Quantity::Units(2.0));
    }

    #[test]
    fn from_json_fn_keeps_unreadable_records_without_failing_the_batch() {
        let sales = Sales::from_json(
            r#"[{"Product": "A", "Quantity": 1}, {"id": 7, "Product": "A", "Quantity": 2}, {"Quantity": 2, "qty": 3, "Product": "B"}]"#,
        )
        .unwrap();
        let sales: Vec<_> = sales.iter().collect();
        assert_eq!(sales.len(), 3);
        assert_eq!(sales[0], &Ok(Sale::new("A", 1.0)));
        let dup_product = sales[1].as_ref().unwrap_err();
        assert_eq!(dup_product.sale.product.as_deref(), Some("A"));
        assert!(dup_product.reason.contains("duplicate field"), "{}", dup_product.reason);
        let dup_quantity = sales[2].as_ref().unwrap_err();
        assert_eq!(dup_quantity.sale.product.as_deref(), Some("B"));
    }

    #[test]
    fn from_json_fn_does_not_stringify_non_string_products() {
        let sales = Sales::from_json(
            r#"[{"SALE_ID": 9, "Product": 7, "Quantity": 1}, {"Product": true, "Quantity": 1}]"#,
        )
        .unwrap();
        for sale in sales.iter() {
            let unreadable = sale.as_ref().unwrap_err();
            assert_eq!(unreadable.sale.product, None);
        }
        let first = sales.iter().next().unwrap().as_ref().unwrap_err();
        assert_eq!(first.sale.id.as_deref(), Some("9"));
    }

    #[test]
    fn units_fn_rejects_negative_and_non_numeric_quantities() {
        assert_eq!(Quantity::Units(2.0).units(), Some(2.0));
        assert_eq!(Quantity::Units(0.0).units(), Some(0.0));
        assert_eq!(Quantity::Units(-1.0).units(), None);
        assert_eq!(Quantity::Units(f64::NAN).units(), None);
        assert_eq!(Quantity::Invalid.units(), None);
        assert_eq!(Quantity::Missing.units(), None);
    }
}
