//! Deep merge of configuration tables.
//!
//! - Tables: merged key by key (recursive)
//! - Arrays: replaced wholesale
//! - Scalars: last writer wins

use toml::{Table, Value};

/// Merge `overlay` into `base` in place.
pub fn deep_merge(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Table(base_table)), Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Fold layers in order; the last layer has the highest precedence.
pub fn merge_layers(layers: impl IntoIterator<Item = Table>) -> Table {
    layers.into_iter().fold(Table::new(), |mut acc, layer| {
        deep_merge(&mut acc, layer);
        acc
    })
}
