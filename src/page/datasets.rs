//! Dataset categories and their descriptors.
//!
//! A category is enabled by default or through `[datasets]`; its entries live
//! in a like-named top-level section. Only entries that are tables with a
//! `class` key are listed.

use serde::Serialize;
use toml::{Table, Value};

use crate::config::EffectiveConfig;
use crate::page::escape::escape_markup;
use crate::page::variables::value_text;

/// Sort position for entries without a usable `order` field: after every real order.
pub const MISSING_ORDER: f64 = f64::INFINITY;

/// Declared categories with their default enablement, in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetCategories {
    declared: Vec<(String, bool)>,
}

impl Default for DatasetCategories {
    fn default() -> Self {
        Self::new([("taxidata", true), ("instagramdata", true)])
    }
}

impl DatasetCategories {
    pub fn new<S: Into<String>>(declared: impl IntoIterator<Item = (S, bool)>) -> Self {
        Self {
            declared: declared.into_iter().map(|(name, on)| (name.into(), on)).collect(),
        }
    }

    /// Enabled categories after applying `[datasets]` overrides.
    ///
    /// Declared categories keep their declared order; categories only named in
    /// `[datasets]` follow in key order.
    pub fn active(&self, config: &EffectiveConfig) -> Vec<String> {
        let overrides = config.get("datasets").and_then(Value::as_table);
        let enabled = |name: &str, default: bool| {
            overrides
                .and_then(|t| t.get(name))
                .map(truthy)
                .unwrap_or(default)
        };

        let mut active: Vec<String> = self
            .declared
            .iter()
            .filter(|(name, default)| enabled(name, *default))
            .map(|(name, _)| name.clone())
            .collect();

        if let Some(overrides) = overrides {
            for (name, value) in overrides {
                let declared = self.declared.iter().any(|(d, _)| d == name);
                if !declared && truthy(value) {
                    active.push(name.clone());
                }
            }
        }
        active
    }
}

/// One listed data source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetDescriptor {
    pub key: String,
    pub name: String,
    pub access: String,
    pub poll: String,
    #[serde(skip)]
    pub order: f64,
}

impl DatasetDescriptor {
    /// Build a descriptor from a category entry, if it is a table with `class`.
    pub fn from_entry(key: &str, entry: &Value) -> Option<Self> {
        let entry = entry.as_table()?;
        if !entry.contains_key("class") {
            return None;
        }
        Some(Self {
            key: key.to_string(),
            name: text_field(entry, "name"),
            access: text_field(entry, "access"),
            poll: text_field(entry, "poll"),
            order: entry.get("order").and_then(order_value).unwrap_or(MISSING_ORDER),
        })
    }
}

/// Categories in output order, each with its sorted descriptors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetCatalog {
    pub categories: Vec<(String, Vec<DatasetDescriptor>)>,
}

impl DatasetCatalog {
    pub fn collect(config: &EffectiveConfig, categories: &DatasetCategories) -> Self {
        let categories = categories
            .active(config)
            .into_iter()
            .filter(|name| {
                let valid = is_element_name(name);
                if !valid {
                    tracing::warn!(category = %name, "Skipping dataset category with invalid name");
                }
                valid
            })
            .map(|name| {
                let list = descriptors(config, &name);
                (name, list)
            })
            .collect();
        Self { categories }
    }

    /// One wrapping element per category, one `<option/>` per descriptor.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for (category, list) in &self.categories {
            out.push('<');
            out.push_str(category);
            out.push('>');
            for d in list {
                out.push_str("<option");
                for (attr, value) in [("key", &d.key), ("name", &d.name), ("access", &d.access), ("poll", &d.poll)] {
                    out.push_str(&format!(" {attr}=\"{}\"", escape_markup(value)));
                }
                out.push_str("/>");
            }
            out.push_str("</");
            out.push_str(category);
            out.push('>');
        }
        out
    }
}

/// Valid descriptors of one category, sorted by order, then name, then key.
pub fn descriptors(config: &EffectiveConfig, category: &str) -> Vec<DatasetDescriptor> {
    let Some(section) = config.get(category).and_then(Value::as_table) else {
        return Vec::new();
    };
    let mut list: Vec<DatasetDescriptor> = section
        .iter()
        .filter_map(|(key, entry)| DatasetDescriptor::from_entry(key, entry))
        .collect();
    list.sort_by(|a, b| {
        a.order
            .total_cmp(&b.order)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.key.cmp(&b.key))
    });
    list
}

fn text_field(entry: &Table, field: &str) -> String {
    entry.get(field).map(value_text).unwrap_or_default()
}

fn order_value(value: &Value) -> Option<f64> {
    let order = match value {
        Value::Integer(n) => *n as f64,
        Value::Float(f) => *f,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (!order.is_nan()).then_some(order)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Boolean(b) => *b,
        Value::Integer(n) => *n != 0,
        Value::Float(f) => *f != 0.0,
        Value::String(s) => !matches!(s.trim().to_ascii_lowercase().as_str(), "" | "false" | "0" | "no" | "off"),
        Value::Array(a) => !a.is_empty(),
        Value::Table(t) => !t.is_empty(),
        Value::Datetime(_) => true,
    }
}

fn is_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(src: &str) -> EffectiveConfig {
        src.parse().unwrap()
    }

    #[test]
    fn test_default_categories_enabled() {
        let active = DatasetCategories::default().active(&EffectiveConfig::new());
        assert_eq!(active, vec!["taxidata", "instagramdata"]);
    }

    #[test]
    fn test_overrides_disable_and_add() {
        let c = config("[datasets]\ntaxidata = false\nweather = true\nzzz = false\n");
        let active = DatasetCategories::default().active(&c);
        assert_eq!(active, vec!["instagramdata", "weather"]);
    }

    #[test]
    fn test_entries_without_class_dropped() {
        let c = config(
            r#"
            [taxidata]
            plain = "not a table"
            [taxidata.noclass]
            name = "No class"
            [taxidata.good]
            class = "TaxiViaPostgres"
            name = "Good"
            "#,
        );
        let list = descriptors(&c, "taxidata");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].key, "good");
    }

    #[test]
    fn test_sort_order() {
        let c = config(
            r#"
            [taxidata.unordered_b]
            class = "x"
            name = "B"
            [taxidata.unordered_a]
            class = "x"
            name = "A"
            [taxidata.second]
            class = "x"
            order = 2
            name = "Z"
            [taxidata.first_y]
            class = "x"
            order = 1
            name = "Same"
            [taxidata.first_x]
            class = "x"
            order = 1
            name = "Same"
            "#,
        );
        let keys: Vec<_> = descriptors(&c, "taxidata").into_iter().map(|d| d.key).collect();
        assert_eq!(keys, vec!["first_x", "first_y", "second", "unordered_a", "unordered_b"]);

        let orders: Vec<_> = descriptors(&c, "taxidata").into_iter().map(|d| d.order).collect();
        assert!(orders.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(orders.last(), Some(&MISSING_ORDER));
    }

    #[test]
    fn test_markup_uses_double_quote_escaping() {
        let c = config(
            r#"
            [datasets]
            instagramdata = false
            [taxidata.nyc]
            class = "TaxiViaPostgres"
            name = "NYC's \"yellow\" & green"
            access = "public"
            poll = 30
            "#,
        );
        let markup = DatasetCatalog::collect(&c, &DatasetCategories::default()).to_markup();
        assert_eq!(
            markup,
            "<taxidata><option key=\"nyc\" name=\"NYC's &quot;yellow&quot; &amp; green\" \
             access=\"public\" poll=\"30\"/></taxidata>"
        );
    }

    #[test]
    fn test_empty_category_still_wrapped() {
        let markup = DatasetCatalog::collect(&EffectiveConfig::new(), &DatasetCategories::default()).to_markup();
        assert_eq!(markup, "<taxidata></taxidata><instagramdata></instagramdata>");
    }

    #[test]
    fn test_fractional_orders_sort_numerically() {
        let c = config(
            r#"
            [taxidata.late]
            class = "x"
            order = 1.5
            name = "A"
            [taxidata.early]
            class = "x"
            order = 1.2
            name = "B"
            [taxidata.whole]
            class = "x"
            order = 2
            name = "0"
            [taxidata.text]
            class = "x"
            order = "1.3"
            name = "C"
            [taxidata.junk]
            class = "x"
            order = "soon"
            name = "D"
            "#,
        );
        let keys: Vec<_> = descriptors(&c, "taxidata").into_iter().map(|d| d.key).collect();
        assert_eq!(keys, vec!["early", "text", "late", "whole", "junk"]);
    }

    #[test]
    fn test_boolean_fields_use_toml_spelling() {
        let c = config("[taxidata.live]\nclass = \"x\"\naccess = true\npoll = false\n");
        let list = descriptors(&c, "taxidata");
        assert_eq!(list[0].access, "true");
        assert_eq!(list[0].poll, "false");
    }
}
