//! Materials
//!
//! Catalog entries are owned by the catalog collaborator. The engine only ever
//! sees [`MaterialReference`] snapshots taken from them for one payment term.

use std::fmt;

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Catalog Material Key
    pub struct MaterialKey;
}

/// Unit a material is sold and consumed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitOfMeasure {
    /// Priced per centimetre of length (mouldings).
    Linear,

    /// Priced per square metre (glass, backing, paper).
    Area,

    /// Priced per piece.
    Unit,
}

impl UnitOfMeasure {
    /// Short symbol used on line items.
    pub fn symbol(self) -> &'static str {
        match self {
            UnitOfMeasure::Linear => "cm",
            UnitOfMeasure::Area => "m²",
            UnitOfMeasure::Unit => "un",
        }
    }
}

impl fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Supplier payment term; each term carries its own unit cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentTerm {
    /// Paid on delivery.
    #[default]
    #[serde(rename = "cash")]
    Cash,

    /// 30 days.
    #[serde(rename = "30-days")]
    Days30,

    /// 60 days.
    #[serde(rename = "60-days")]
    Days60,

    /// 90 days.
    #[serde(rename = "90-days")]
    Days90,

    /// 120 days.
    #[serde(rename = "120-days")]
    Days120,

    /// 150 days.
    #[serde(rename = "150-days")]
    Days150,
}

impl fmt::Display for PaymentTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentTerm::Cash => "cash",
            PaymentTerm::Days30 => "30 days",
            PaymentTerm::Days60 => "60 days",
            PaymentTerm::Days90 => "90 days",
            PaymentTerm::Days120 => "120 days",
            PaymentTerm::Days150 => "150 days",
        };

        f.write_str(label)
    }
}

/// A material as stored in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogMaterial {
    /// Catalog id (e.g. `MOL-1020`)
    pub id: String,

    /// Description shown on quotes
    pub description: String,

    /// Unit of measure
    pub unit: UnitOfMeasure,

    /// Unit cost for each payment term the supplier quotes
    pub unit_costs: FxHashMap<PaymentTerm, Decimal>,

    /// Bar length for mouldings, when it differs from the default
    pub bar_length: Option<Decimal>,
}

impl CatalogMaterial {
    /// Create a material with a single cash unit cost.
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        unit: UnitOfMeasure,
        cash_cost: Decimal,
    ) -> Self {
        let mut unit_costs = FxHashMap::default();
        unit_costs.insert(PaymentTerm::Cash, cash_cost);

        Self {
            id: id.into(),
            description: description.into(),
            unit,
            unit_costs,
            bar_length: None,
        }
    }

    /// Set the unit cost for a payment term.
    #[must_use]
    pub fn with_unit_cost(mut self, term: PaymentTerm, cost: Decimal) -> Self {
        self.unit_costs.insert(term, cost);
        self
    }

    /// Set the bar length this moulding is supplied in.
    #[must_use]
    pub fn with_bar_length(mut self, bar_length: Decimal) -> Self {
        self.bar_length = Some(bar_length);
        self
    }

    /// Unit cost for `term`, falling back to the cash cost.
    pub fn unit_cost(&self, term: PaymentTerm) -> Option<Decimal> {
        self.unit_costs
            .get(&term)
            .or_else(|| self.unit_costs.get(&PaymentTerm::Cash))
            .copied()
    }

    /// Capture the fields a quote needs at the cost of `term`.
    ///
    /// Returns `None` when neither `term` nor cash has a cost.
    pub fn reference(&self, term: PaymentTerm) -> Option<MaterialReference> {
        let unit_price = self.unit_cost(term)?;

        Some(MaterialReference {
            id: self.id.clone(),
            description: self.description.clone(),
            unit: self.unit,
            unit_price,
            bar_length: self.bar_length,
        })
    }
}

/// Immutable snapshot of a catalog material, priced for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterialReference {
    /// Catalog id
    pub id: String,

    /// Description shown on quotes
    pub description: String,

    /// Unit of measure
    pub unit: UnitOfMeasure,

    /// Captured unit price
    pub unit_price: Decimal,

    /// Bar length for mouldings
    pub bar_length: Option<Decimal>,
}

impl MaterialReference {
    /// Create a reference without a bar length.
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        unit: UnitOfMeasure,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            unit,
            unit_price,
            bar_length: None,
        }
    }

    /// Set the bar length.
    #[must_use]
    pub fn with_bar_length(mut self, bar_length: Decimal) -> Self {
        self.bar_length = Some(bar_length);
        self
    }
}

/// Resolves material ids to catalog entries.
pub trait MaterialCatalog {
    /// Look up a material by its catalog id.
    fn material(&self, id: &str) -> Option<&CatalogMaterial>;
}

/// In-memory catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    materials: SlotMap<MaterialKey, CatalogMaterial>,
    keys: FxHashMap<String, MaterialKey>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material, replacing any existing entry with the same id.
    pub fn insert(&mut self, material: CatalogMaterial) -> MaterialKey {
        if let Some(&key) = self.keys.get(&material.id)
            && let Some(slot) = self.materials.get_mut(key)
        {
            *slot = material;
            return key;
        }

        let id = material.id.clone();
        let key = self.materials.insert(material);
        self.keys.insert(id, key);

        key
    }

    /// Get a material by key.
    pub fn get(&self, key: MaterialKey) -> Option<&CatalogMaterial> {
        self.materials.get(key)
    }

    /// Key for a catalog id.
    pub fn key(&self, id: &str) -> Option<MaterialKey> {
        self.keys.get(id).copied()
    }

    /// Number of materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl MaterialCatalog for Catalog {
    fn material(&self, id: &str) -> Option<&CatalogMaterial> {
        self.key(id).and_then(|key| self.materials.get(key))
    }
}

impl FromIterator<CatalogMaterial> for Catalog {
    fn from_iter<I: IntoIterator<Item = CatalogMaterial>>(iter: I) -> Self {
        let mut catalog = Catalog::new();

        for material in iter {
            catalog.insert(material);
        }

        catalog
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn moulding() -> CatalogMaterial {
        CatalogMaterial::new(
            "MOL-1020",
            "Moulding 2cm black",
            UnitOfMeasure::Linear,
            Decimal::new(250, 2),
        )
        .with_unit_cost(PaymentTerm::Days30, Decimal::new(265, 2))
        .with_bar_length(Decimal::from(300))
    }

    #[test]
    fn unit_cost_for_quoted_term() {
        assert_eq!(
            moulding().unit_cost(PaymentTerm::Days30),
            Some(Decimal::new(265, 2))
        );
    }

    #[test]
    fn unit_cost_falls_back_to_cash() {
        assert_eq!(
            moulding().unit_cost(PaymentTerm::Days90),
            Some(Decimal::new(250, 2))
        );
    }

    #[test]
    fn reference_without_any_cost_is_none() {
        let mut material = moulding();
        material.unit_costs.clear();

        assert_eq!(material.reference(PaymentTerm::Cash), None);
    }

    #[test]
    fn reference_captures_price_and_bar_length() -> TestResult {
        let reference = moulding()
            .reference(PaymentTerm::Days30)
            .ok_or("missing reference")?;

        assert_eq!(reference.id, "MOL-1020");
        assert_eq!(reference.unit_price, Decimal::new(265, 2));
        assert_eq!(reference.bar_length, Some(Decimal::from(300)));

        Ok(())
    }

    #[test]
    fn catalog_resolves_by_id() {
        let catalog: Catalog = [moulding()].into_iter().collect();

        assert_eq!(catalog.len(), 1);
        assert!(catalog.material("MOL-1020").is_some());
        assert!(catalog.material("MOL-9999").is_none());
    }

    #[test]
    fn insert_replaces_same_id() {
        let mut catalog = Catalog::new();

        let first = catalog.insert(moulding());
        let second = catalog.insert(CatalogMaterial::new(
            "MOL-1020",
            "Moulding 2cm black (new supplier)",
            UnitOfMeasure::Linear,
            Decimal::new(240, 2),
        ));

        assert_eq!(first, second);
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.material("MOL-1020").map(|m| m.description.as_str()),
            Some("Moulding 2cm black (new supplier)")
        );
    }

    #[test]
    fn unit_symbols() {
        assert_eq!(UnitOfMeasure::Linear.to_string(), "cm");
        assert_eq!(UnitOfMeasure::Area.to_string(), "m²");
        assert_eq!(UnitOfMeasure::Unit.to_string(), "un");
    }
}
