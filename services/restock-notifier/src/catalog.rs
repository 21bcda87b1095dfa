//! Typed view of the products payload returned by the commerce backend.
//!
//! The payload is loosely shaped: a top-level object whose values are arrays of
//! products. Keys carry no meaning here, only the arrays do. Decoding walks the
//! document once and reports the first mismatch with its location, so callers
//! never have to deal with half-valid data.

use serde::Deserialize;
use serde_json::Value;

use crate::error::MalformedDocument;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Variant {
    pub sku: String,
    /// Read as a real number; the backend has shipped both integer and float encodings.
    pub inventory_quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Product {
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductCollection {
    pub key: String,
    pub products: Vec<Product>,
}

/// Collections are kept in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Catalog {
    pub collections: Vec<ProductCollection>,
}

impl Catalog {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, MalformedDocument> {
        let document: Value = serde_json::from_slice(bytes)
            .map_err(|err| MalformedDocument::new("$", err.to_string()))?;
        Self::from_value(&document)
    }

    pub fn from_value(document: &Value) -> Result<Self, MalformedDocument> {
        let root = document
            .as_object()
            .ok_or_else(|| MalformedDocument::new("$", expected("an object", document)))?;

        let mut collections = Vec::with_capacity(root.len());
        for (key, value) in root {
            let path = format!("$.{key}");
            let entries = value
                .as_array()
                .ok_or_else(|| MalformedDocument::new(path.as_str(), expected("an array", value)))?;
            let products = entries
                .iter()
                .enumerate()
                .map(|(index, entry)| Product::from_value(entry, &format!("{path}[{index}]")))
                .collect::<Result<Vec<_>, _>>()?;
            collections.push(ProductCollection {
                key: key.clone(),
                products,
            });
        }
        Ok(Self { collections })
    }

    /// Every variant in traversal order: collection, then product, then variant.
    pub fn variants(&self) -> impl Iterator<Item = &Variant> {
        self.collections
            .iter()
            .flat_map(|collection| collection.products.iter())
            .flat_map(|product| product.variants.iter())
    }
}

impl Product {
    fn from_value(value: &Value, path: &str) -> Result<Self, MalformedDocument> {
        let fields = value
            .as_object()
            .ok_or_else(|| MalformedDocument::new(path, expected("an object", value)))?;

        // A product without the field simply has nothing to report.
        let Some(raw) = fields.get("variants") else {
            return Ok(Self::default());
        };

        let path = format!("{path}.variants");
        let entries = raw
            .as_array()
            .ok_or_else(|| MalformedDocument::new(path.as_str(), expected("an array", raw)))?;
        let variants = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let path = format!("{path}[{index}]");
                // serde would otherwise fill the struct positionally from an array.
                if !entry.is_object() {
                    return Err(MalformedDocument::new(path, expected("an object", entry)));
                }
                Variant::deserialize(entry).map_err(|err| MalformedDocument::new(path, err.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { variants })
    }
}

fn expected(what: &str, found: &Value) -> String {
    let kind = match found {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    format!("expected {what}, found {kind}")
}
