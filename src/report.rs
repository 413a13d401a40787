use tracing::{debug, warn};

use std::fmt::Display;

use crate::{
    catalogue::Catalogue,
    error::RecordError,
    money::Money,
    sales::{Sale, Sales, Unreadable},
};

/// Shown in place of the product for a sale that doesn't name one.
const MISSING_PRODUCT: &str = "<missing>";

/// The cost of one successfully priced sale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Priced {
    pub quantity: f64,
    pub unit_price: Money,
    pub cost: Money,
}

/// The result of pricing one sale: either its cost, or the reason it was
/// excluded from the total.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem {
    pub sale: Sale,
    pub outcome: Result<Priced, RecordError>,
}

impl LineItem {
    /// Prices `sale` against `catalogue`.
    ///
    /// The product must be present, then it must be in the catalogue, and
    /// then the quantity must be a non-negative number. The first check that
    /// fails decides the [`RecordError`].
    #[must_use]
    pub fn price(catalogue: &Catalogue, sale: &Sale) -> Self {
        let outcome = sale
            .product
            .as_deref()
            .ok_or(RecordError::MissingProduct)
            .and_then(|product| {
                let unit_price = catalogue
                    .price(product)
                    .ok_or(RecordError::UnknownProduct)?;
                let quantity = sale.quantity.units().ok_or(RecordError::InvalidQuantity)?;
                Ok(Priced {
                    quantity,
                    unit_price,
                    cost: unit_price * quantity,
                })
            });
        Self {
            sale: sale.clone(),
            outcome,
        }
    }

    /// Records a sale that couldn't be read at all.
    #[must_use]
    pub fn unreadable(record: &Unreadable) -> Self {
        Self {
            sale: record.sale.clone(),
            outcome: Err(RecordError::MalformedRecord),
        }
    }

    /// Returns the product name, or a placeholder if the sale has none.
    #[must_use]
    pub fn product(&self) -> &str {
        self.sale.product.as_deref().unwrap_or(MISSING_PRODUCT)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl Display for LineItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tags: Vec<&str> = [&self.sale.id, &self.sale.date]
            .into_iter()
            .filter_map(Option::as_deref)
            .collect();
        if !tags.is_empty() {
            write!(f, "[{}] ", tags.join(" "))?;
        }
        match &self.outcome {
            Ok(p) => write!(
                f,
                "{} — {} x {} = {}",
                self.product(),
                p.quantity,
                p.unit_price,
                p.cost
            ),
            Err(err) => write!(f, "{} — ERROR: {err}", self.product()),
        }
    }
}

/// Holds the priced sales and their total.
///
/// To build a `Report`, use [`Report::compute`].
///
/// To get a printable version of the report, use its [`Display`]
/// implementation: one line per sale, in input order, followed by the total.
#[derive(Debug, Default, PartialEq)]
pub struct Report {
    items: Vec<LineItem>,
    total: Money,
}

impl Report {
    /// Prices every sale in `sales` against `catalogue`.
    ///
    /// A sale that can't be priced is kept as an invalid line item and
    /// contributes nothing to the total; the remaining sales are still
    /// processed.
    #[must_use]
    pub fn compute(catalogue: &Catalogue, sales: &Sales) -> Self {
        let mut report = Self::default();
        for (idx, record) in sales.iter().enumerate() {
            let item = match record {
                Ok(sale) => LineItem::price(catalogue, sale),
                Err(unreadable) => LineItem::unreadable(unreadable),
            };
            match &item.outcome {
                Ok(priced) => report.total += priced.cost,
                Err(err) => warn!(sale = idx, product = item.product(), %err, "sale excluded from total"),
            }
            report.items.push(item);
        }
        debug!(
            valid = report.valid_count(),
            invalid = report.invalid_count(),
            total = %report.total,
            "sales computed"
        );
        report
    }

    #[must_use]
    pub fn total(&self) -> Money {
        self.total
    }

    /// Returns the total cost as a plain number.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.total.amount()
    }

    #[must_use]
    pub fn line_items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_valid()).count()
    }

    #[must_use]
    pub fn invalid_count(&self) -> usize {
        self.items.len() - self.valid_count()
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for item in &self.items {
            writeln!(f, "{item}")?;
        }
        writeln!(f, "Total: {}", self.total)
    }
}
