use figment::providers::{Env, Serialized};
use figment::value::Value;
use figment::Figment;
use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::prelude::*;

use crate::config::{ConfigError, ExtractSnafu};

/// The configuration overlays available to one object.
///
/// Values are layered as: the object's current state, then environment
/// variables, then configuration files in order. Each layer overrides the
/// keys it sets and keeps everything else.
pub struct ConfigSource<'a> {
    object: &'a str,
    env_prefix: Option<&'a str>,
    files: &'a Figment,
}

impl<'a> ConfigSource<'a> {
    pub(crate) fn new(object: &'a str, env_prefix: Option<&'a str>, files: &'a Figment) -> Self {
        Self {
            object,
            env_prefix,
            files,
        }
    }

    /// The object name, which is also the top-level key in configuration
    /// files.
    pub fn object(&self) -> &str {
        self.object
    }

    /// The environment variable prefix of this object, e.g. `APP_HTTP_` for
    /// the object `http` and the prefix `APP_`. `None` if environment
    /// overlays are disabled.
    pub fn env_prefix(&self) -> Option<String> {
        self.env_prefix
            .map(|prefix| format!("{prefix}{}_", env_segment(self.object)))
    }

    /// Builds the layered [`Figment`] with `current` as the base layer, all
    /// values nested under the object name.
    ///
    /// Environment values are kept as strings unless the field they replace
    /// holds an array or a table. Numbers and booleans are read from those
    /// strings when the value is extracted.
    pub fn figment<T: Serialize>(&self, current: &T) -> Figment {
        let mut figment = Figment::new().merge(Serialized::default(self.object, current));

        if let Some(prefix) = self.env_prefix() {
            let base = Value::serialize(current).ok();
            for (key, raw) in Env::prefixed(&prefix).iter() {
                let key = key.as_str().replace("__", ".");
                if key.split('.').any(str::is_empty) {
                    continue;
                }
                let field = base.as_ref().and_then(|base| base.find_ref(&key));
                let value = env_value(field, raw);
                let path = format!("{}.{key}", self.object);
                figment = figment.merge(Serialized::default(&path, value));
            }
        }

        figment.merge(self.files.clone())
    }

    /// Produces a new value of `T` from `current` and every overlay.
    ///
    /// # Errors
    ///
    /// Returns an error if an overlay can't be deserialized into `T`.
    pub fn extract<T>(&self, current: &T) -> Result<T, ConfigError>
    where
        T: Serialize + DeserializeOwned,
    {
        self.figment(current)
            .extract_inner_lossy(self.object)
            .map_err(Box::new)
            .context(ExtractSnafu {
                object: self.object,
            })
    }
}

fn env_value(field: Option<&Value>, raw: String) -> Value {
    match field {
        Some(Value::Array(..) | Value::Dict(..)) => match raw.parse::<Value>() {
            Ok(value) => value,
            Err(never) => match never {},
        },
        _ => Value::from(raw),
    }
}

fn env_segment(object: &str) -> String {
    object
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
