use core::str::FromStr;
use serde::{Deserialize, Serialize};

use smartstore_core::{Entity, EntityKind, ParseError, ProductId};

/// Temperature class of a product, and temperature zone of a shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Temperature {
    Frozen,
    Refrigerated,
    Ambient,
    Warm,
    Hot,
}

impl Temperature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Temperature::Frozen => "frozen",
            Temperature::Refrigerated => "refrigerated",
            Temperature::Ambient => "ambient",
            Temperature::Warm => "warm",
            Temperature::Hot => "hot",
        }
    }
}

impl core::fmt::Display for Temperature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Temperature {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "frozen" => Ok(Temperature::Frozen),
            "refrigerated" => Ok(Temperature::Refrigerated),
            "ambient" => Ok(Temperature::Ambient),
            "warm" => Ok(Temperature::Warm),
            "hot" => Ok(Temperature::Hot),
            _ => Err(ParseError::unknown("temperature", s)),
        }
    }
}

/// Command: CreateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub size: String,
    pub category: String,
    /// Price in smallest currency unit (e.g. cents).
    pub unit_price_cents: u64,
    pub temperature: Temperature,
}

/// Catalog product. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    size: String,
    category: String,
    unit_price_cents: u64,
    temperature: Temperature,
}

impl Product {
    pub fn create(cmd: CreateProduct) -> Self {
        Self {
            id: cmd.product_id,
            name: cmd.name,
            description: cmd.description,
            size: cmd.size,
            category: cmd.category,
            unit_price_cents: cmd.unit_price_cents,
            temperature: cmd.temperature,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn unit_price_cents(&self) -> u64 {
        self.unit_price_cents
    }

    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    pub fn view(&self) -> ProductView {
        ProductView {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            size: self.size.clone(),
            category: self.category.clone(),
            unit_price_cents: self.unit_price_cents,
            temperature: self.temperature,
        }
    }
}

impl Entity for Product {
    type Id = ProductId;
    const KIND: EntityKind = EntityKind::Product;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Serializable projection of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub size: String,
    pub category: String,
    pub unit_price_cents: u64,
    pub temperature: Temperature,
}

/// Parse a decimal price (`"3"`, `"2.5"`, `"12.99"`) into cents.
///
/// Prices never go through floating point: more than two fractional digits is
/// an error rather than a rounding decision.
pub fn parse_price_cents(raw: &str) -> Result<u64, ParseError> {
    let invalid = || ParseError::InvalidNumber {
        kind: "price",
        value: raw.to_string(),
    };

    let trimmed = raw.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if fraction.len() > 2 || !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let cents: u64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<u64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };

    whole
        .checked_mul(100)
        .and_then(|w| w.checked_add(cents))
        .ok_or_else(invalid)
}
