//! Assembly of the landing page variables from the effective configuration.

use std::collections::BTreeMap;

use toml::Value;

use crate::config::EffectiveConfig;
use crate::page::datasets::{DatasetCatalog, DatasetCategories};
use crate::page::escape::escape_attr_value;

/// Control sections serialized as JSON into `iniSettings`, with their variable names.
pub const CONTROL_SECTIONS: [(&str, &str); 3] = [
    ("controls", "defaultControls"),
    ("places", "placeControls"),
    ("regions", "regionControls"),
];

/// Built-in values used before configuration overrides.
#[derive(Debug, Clone)]
pub struct PageDefaults {
    pub api_root: String,
    pub static_root: String,
    pub girder_root: String,
    pub app_title: String,
    pub app_icon: String,
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self {
            api_root: "api/v1".to_string(),
            static_root: "built".to_string(),
            girder_root: "girder/static".to_string(),
            app_title: "Minerva Taxi".to_string(),
            app_icon: "icon.png".to_string(),
        }
    }
}

/// Escaped variables ready for substitution into the page template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageVariables {
    vars: BTreeMap<String, String>,
}

impl PageVariables {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    fn set(&mut self, name: &str, raw: &str) {
        self.vars.insert(name.to_string(), escape_attr_value(raw));
    }

    /// Insert an already escaped value.
    fn set_escaped(&mut self, name: &str, escaped: String) {
        self.vars.insert(name.to_string(), escaped);
    }
}

/// Build the page variables for `config`.
pub fn assemble(config: &EffectiveConfig, categories: &DatasetCategories) -> PageVariables {
    assemble_with(config, categories, &PageDefaults::default())
}

pub fn assemble_with(
    config: &EffectiveConfig,
    categories: &DatasetCategories,
    defaults: &PageDefaults,
) -> PageVariables {
    let mut vars = PageVariables::default();
    vars.set("apiRoot", &defaults.api_root);
    vars.set("staticRoot", &defaults.static_root);
    vars.set("girderRoot", &defaults.girder_root);
    vars.set("appTitle", &defaults.app_title);
    vars.set("appIcon", &defaults.app_icon);

    if let Some(application) = config.get("application").and_then(Value::as_table) {
        for key in ["appTitle", "appIcon"] {
            let value = application.get(key).map(value_text).unwrap_or_default();
            if !value.is_empty() {
                vars.set(key, &value);
            }
        }
    }

    vars.set_escaped("iniSettings", ini_settings(config));

    let catalog = DatasetCatalog::collect(config, categories);
    vars.set_escaped("data", catalog.to_markup());

    tracing::debug!(variables = vars.len(), "Page variables assembled");
    vars
}

/// Render `[resources]` and the control sections as `key='value' ` pairs.
pub fn ini_settings(config: &EffectiveConfig) -> String {
    let mut settings: BTreeMap<String, String> = BTreeMap::new();

    if let Some(resources) = config.get("resources").and_then(Value::as_table) {
        for (key, value) in resources {
            settings.insert(key.clone(), value_text(value));
        }
    }
    for (section, var) in CONTROL_SECTIONS {
        if let Some(value) = config.get(section) {
            settings.insert(var.to_string(), json_text(value));
        }
    }

    let mut out = String::new();
    for (key, value) in &settings {
        out.push_str(&escape_attr_value(key));
        out.push_str("='");
        out.push_str(&escape_attr_value(value));
        out.push_str("' ");
    }
    out
}

/// Strings as-is, everything else as compact JSON.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => json_text(other),
    }
}

fn json_text(value: &Value) -> String {
    to_json(value).to_string()
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Integer(n) => serde_json::Value::from(*n),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Table(table) => serde_json::Value::Object(
            table.iter().map(|(k, v)| (k.clone(), to_json(v))).collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(src: &str) -> EffectiveConfig {
        src.parse().unwrap()
    }

    fn unescape(s: &str) -> String {
        s.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&")
    }

    #[test]
    fn test_defaults() {
        let vars = assemble(&EffectiveConfig::new(), &DatasetCategories::default());
        assert_eq!(vars.get("apiRoot"), Some("api/v1"));
        assert_eq!(vars.get("staticRoot"), Some("built"));
        assert_eq!(vars.get("girderRoot"), Some("girder/static"));
        assert_eq!(vars.get("appTitle"), Some("Minerva Taxi"));
        assert_eq!(vars.get("appIcon"), Some("icon.png"));
        assert_eq!(vars.get("iniSettings"), Some(""));
        assert_eq!(vars.get("data"), Some("<taxidata></taxidata><instagramdata></instagramdata>"));
    }

    #[test]
    fn test_application_overrides() {
        let vars = assemble(
            &config("[application]\nappTitle = \"Tom & Jerry's <Map>\"\nappIcon = \"\"\n"),
            &DatasetCategories::default(),
        );
        assert_eq!(vars.get("appTitle"), Some("Tom &amp; Jerry&apos;s &lt;Map&gt;"));
        // Empty values do not override.
        assert_eq!(vars.get("appIcon"), Some("icon.png"));
    }

    #[test]
    fn test_ini_settings_resources_and_controls() {
        let c = config(
            r#"
            [resources]
            mapTiles = "http://tiles/{z}/{x}/{y}.png"
            maxZoom = 18
            [controls]
            zoom = 12
            layers = ["a", "b"]
            "#,
        );
        let ini = ini_settings(&c);
        let mut pairs: Vec<&str> = ini.split("' ").filter(|p| !p.is_empty()).collect();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                "defaultControls='{&quot;layers&quot;:[&quot;a&quot;,&quot;b&quot;],&quot;zoom&quot;:12}",
                "mapTiles='http://tiles/{z}/{x}/{y}.png",
                "maxZoom='18",
            ]
        );
        assert!(ini.ends_with("' "));
    }

    #[test]
    fn test_ini_settings_escaping_round_trip() {
        let original = r#"say "hi" & 'bye' <now>"#;
        let mut c = EffectiveConfig::new();
        let mut resources = toml::Table::new();
        resources.insert("greeting".into(), Value::String(original.into()));
        c.insert("resources".into(), Value::Table(resources));

        let ini = ini_settings(&c);
        let value = ini
            .strip_prefix("greeting='")
            .and_then(|s| s.strip_suffix("' "))
            .unwrap();
        for ch in ['"', '\'', '<', '>'] {
            assert!(!value.contains(ch), "unescaped {ch:?} in {value}");
        }
        assert!(!value.replace("&amp;", "").replace("&quot;", "").replace("&apos;", "")
            .replace("&lt;", "").replace("&gt;", "").contains('&'));
        assert_eq!(unescape(value), original);
    }

    #[test]
    fn test_controls_override_resource_of_same_name() {
        let c = config("[resources]\nplaceControls = \"old\"\n[places]\nnyc = [40.7, -74.0]\n");
        assert_eq!(ini_settings(&c), "placeControls='{&quot;nyc&quot;:[40.7,-74.0]}' ");
    }

    #[test]
    fn test_assemble_is_pure() {
        let c = config("[application]\nappTitle = \"X\"\n[resources]\na = 1\n[taxidata.t]\nclass = \"c\"\n");
        let a = assemble(&c, &DatasetCategories::default());
        let b = assemble(&c, &DatasetCategories::default());
        assert_eq!(a, b);
    }
}
