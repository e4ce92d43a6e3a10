use std::collections::HashMap;

use crate::extension::ExtensionError;

pub const DEBUG_KEY: &str = "app.debug";
pub const HEALTH_PATH_KEY: &str = "health.path";
pub const DEFAULT_HEALTH_PATH: &str = "/healthz";

#[derive(Clone, Debug, Default)]
pub struct Settings {
    values: HashMap<String, SettingValue>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SettingValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<SettingValue>),
    Map(HashMap<String, SettingValue>),
}

impl Settings {
    pub fn new() -> Self {
        Settings {
            values: HashMap::new(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            SettingValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn get_integer(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            SettingValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            SettingValue::Float(f) => Some(*f),
            SettingValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn get_boolean(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            SettingValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Copies every entry of `other` into `self`; keys present in both take
    /// the value from `other`.
    pub fn merge(&mut self, other: &Settings) {
        for (key, value) in other.values.iter() {
            self.values.insert(key.clone(), value.clone());
        }
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::String(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::String(value.to_string())
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Integer(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        SettingValue::Integer(value as i64)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Float(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Boolean(value)
    }
}

impl From<Vec<SettingValue>> for SettingValue {
    fn from(value: Vec<SettingValue>) -> Self {
        SettingValue::List(value)
    }
}

/// Worker configuration handed to every extension's `init` hook.
#[derive(Clone, Debug, Default)]
pub struct Config {
    settings: Settings,
}

impl Config {
    pub fn new(settings: Settings) -> Self {
        Config { settings }
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn debug(&self) -> bool {
        self.settings.get_boolean(DEBUG_KEY).unwrap_or(false)
    }

    pub fn health_path(&self) -> String {
        self.settings
            .get_string(HEALTH_PATH_KEY)
            .unwrap_or_else(|| DEFAULT_HEALTH_PATH.to_string())
    }

    /// Parses a JSON object. Nested objects become dotted keys, so
    /// `{"health": {"path": "/up"}}` is readable as `health.path`.
    pub fn from_json_str(input: &str) -> Result<Self, ExtensionError> {
        let value: serde_json::Value = serde_json::from_str(input)?;

        let object = value
            .as_object()
            .ok_or_else(|| ExtensionError::configuration("Config root must be a JSON object"))?;

        let mut settings = Settings::new();
        for (key, value) in object {
            flatten_json(key, value, &mut settings);
        }

        Ok(Config::new(settings))
    }

    /// Reads `PREFIX_SECTION__KEY=value` pairs. The prefix is stripped, the
    /// rest is lowercased and `__` becomes `.`.
    pub fn from_env_vars<I>(prefix: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix = format!("{}_", prefix.trim_end_matches('_'));
        let mut settings = Settings::new();

        for (name, raw) in vars {
            let Some(rest) = name.strip_prefix(&prefix) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }

            let key = rest.to_lowercase().replace("__", ".");
            settings.set(key, parse_env_value(&raw));
        }

        Config::new(settings)
    }

    pub fn from_env(prefix: &str) -> Self {
        Self::from_env_vars(prefix, std::env::vars())
    }
}

fn flatten_json(key: &str, value: &serde_json::Value, settings: &mut Settings) {
    if let serde_json::Value::Object(map) = value {
        for (child, child_value) in map {
            flatten_json(&format!("{}.{}", key, child), child_value, settings);
        }
        return;
    }

    if let Some(setting) = json_to_setting(value) {
        settings.set(key, setting);
    }
}

fn json_to_setting(value: &serde_json::Value) -> Option<SettingValue> {
    use serde_json::Value;

    match value {
        Value::Null => None,
        Value::Bool(b) => Some(SettingValue::Boolean(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(SettingValue::Integer(i)),
            None => n.as_f64().map(SettingValue::Float),
        },
        Value::String(s) => Some(SettingValue::String(s.clone())),
        Value::Array(items) => Some(SettingValue::List(
            items.iter().filter_map(json_to_setting).collect(),
        )),
        Value::Object(map) => Some(SettingValue::Map(
            map.iter()
                .filter_map(|(k, v)| json_to_setting(v).map(|s| (k.clone(), s)))
                .collect(),
        )),
    }
}

fn parse_env_value(raw: &str) -> SettingValue {
    if raw.eq_ignore_ascii_case("true") {
        return SettingValue::Boolean(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return SettingValue::Boolean(false);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return SettingValue::Integer(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return SettingValue::Float(f);
    }
    SettingValue::String(raw.to_string())
}

pub struct ConfigBuilder {
    settings: Settings,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        ConfigBuilder {
            settings: Settings::new(),
        }
    }

    pub fn setting(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.settings.set(key, value);
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings.merge(&settings);
        self
    }

    pub fn build(self) -> Config {
        Config::new(self.settings)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
