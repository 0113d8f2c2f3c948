use snafu::prelude::*;

use crate::container::DEFAULT_NAMESPACE;
use crate::version::DEFAULT_VERSION;

/// Injection metadata attached to a field with `#[ioc("...")]`.
///
/// The tag is a list of `key=value` pairs separated by `;`, for example
/// `autowire=true;namespace=api;name=userService;version=2.0.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectTag {
    pub autowire: bool,
    pub namespace: String,
    pub name: String,
    pub version: String,
}

impl Default for InjectTag {
    fn default() -> Self {
        Self::with_namespace(DEFAULT_NAMESPACE)
    }
}

impl InjectTag {
    fn with_namespace(namespace: &str) -> Self {
        Self {
            autowire: false,
            namespace: namespace.to_owned(),
            name: String::new(),
            version: DEFAULT_VERSION.to_owned(),
        }
    }

    /// Parses a tag, resolving an absent or empty `namespace` to `"default"`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use nsioc::tag::InjectTag;
    /// let tag = InjectTag::parse("autowire=true;namespace=api;name=userService;version=v2").unwrap();
    /// assert!(tag.autowire);
    /// assert_eq!(tag.namespace, "api");
    /// assert_eq!(tag.name, "userService");
    /// assert_eq!(tag.version, "v2");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error on empty keys, unknown keys, invalid boolean literals
    /// and an explicitly empty `name`.
    pub fn parse(tag: &str) -> Result<Self, TagError> {
        Self::parse_in(tag, DEFAULT_NAMESPACE)
    }

    /// Parses a tag, resolving an absent or empty `namespace` to
    /// `default_namespace`.
    ///
    /// # Errors
    ///
    /// See [`InjectTag::parse`].
    pub fn parse_in(tag: &str, default_namespace: &str) -> Result<Self, TagError> {
        let mut res = Self::with_namespace(default_namespace);

        for segment in tag.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = match segment.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (segment, None),
            };

            ensure!(!key.is_empty(), EmptyKeySnafu { segment });

            match key {
                "autowire" => {
                    res.autowire = match value {
                        None | Some("") => true,
                        Some(value) => parse_bool(value).context(InvalidBoolSnafu { key, value })?,
                    };
                }
                "namespace" => {
                    let value = value.unwrap_or_default();
                    res.namespace = if value.is_empty() {
                        default_namespace.to_owned()
                    } else {
                        value.to_owned()
                    };
                }
                "name" => {
                    let value = value.unwrap_or_default();
                    ensure!(!value.is_empty(), EmptyNameSnafu);
                    res.name = value.to_owned();
                }
                "version" => {
                    let value = value.unwrap_or_default();
                    res.version = if value.is_empty() {
                        DEFAULT_VERSION.to_owned()
                    } else {
                        value.to_owned()
                    };
                }
                _ => return UnknownKeySnafu { key }.fail(),
            }
        }

        Ok(res)
    }

    /// Parses a tag, falling back to [`InjectTag::default`] on any error.
    pub fn parse_or_default(tag: &str) -> Self {
        Self::parse(tag).unwrap_or_default()
    }

    /// Returns true if the tag asks for a version other than the default one.
    pub fn has_explicit_version(&self) -> bool {
        self.version != DEFAULT_VERSION
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "on" => Some(true),
        "false" | "f" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TagError {
    #[snafu(display("tag segment `{segment}` has an empty key"))]
    #[non_exhaustive]
    EmptyKey { segment: String },
    #[snafu(display("tag key `{key}` is not one of `autowire`, `namespace`, `name`, `version`"))]
    #[non_exhaustive]
    UnknownKey { key: String },
    #[snafu(display("tag key `{key}` expects a boolean but got `{value}`"))]
    #[non_exhaustive]
    InvalidBool { key: String, value: String },
    #[snafu(display("tag key `name` must not be empty"))]
    #[non_exhaustive]
    EmptyName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_succeeds_with_all_keys() {
        let tag = InjectTag::parse("autowire=true;namespace=api;name=userService;version=v2").unwrap();
        assert_eq!(
            tag,
            InjectTag {
                autowire: true,
                namespace: "api".into(),
                name: "userService".into(),
                version: "v2".into(),
            }
        );
    }

    #[test]
    fn parse_succeeds_with_empty_tag() {
        let tag = InjectTag::parse("").unwrap();
        assert_eq!(
            tag,
            InjectTag {
                autowire: false,
                namespace: "default".into(),
                name: String::new(),
                version: "1.0.0".into(),
            }
        );
    }

    #[test]
    fn parse_trims_and_skips_empty_segments() {
        let tag = InjectTag::parse(" ; autowire ;; name = repo ; namespace= ;version=  ;").unwrap();
        assert!(tag.autowire);
        assert_eq!(tag.name, "repo");
        assert_eq!(tag.namespace, "default");
        assert_eq!(tag.version, "1.0.0");
        assert!(!tag.has_explicit_version());

        let tag = InjectTag::parse("autowire= ;name=repo").unwrap();
        assert!(tag.autowire);
    }

    #[test]
    fn parse_in_uses_given_default_namespace() {
        let tag = InjectTag::parse_in("autowire=true", "controllers").unwrap();
        assert_eq!(tag.namespace, "controllers");

        let tag = InjectTag::parse_in("autowire=true;namespace=api", "controllers").unwrap();
        assert_eq!(tag.namespace, "api");
    }

    #[test]
    fn parse_accepts_boolean_spellings() {
        for literal in ["true", "TRUE", "1", "yes", "on", "t"] {
            assert!(InjectTag::parse(&format!("autowire={literal}")).unwrap().autowire);
        }
        for literal in ["false", "0", "No", "off", "f"] {
            assert!(!InjectTag::parse(&format!("autowire={literal}")).unwrap().autowire);
        }
    }

    #[test]
    fn parse_fails_when_boolean_is_invalid() {
        assert!(matches!(
            InjectTag::parse("autowire=maybe"),
            Err(TagError::InvalidBool { .. })
        ));
    }

    #[test]
    fn parse_fails_when_key_is_unknown_or_empty() {
        assert!(matches!(
            InjectTag::parse("autowire=true;lazy=true"),
            Err(TagError::UnknownKey { .. })
        ));
        assert!(matches!(
            InjectTag::parse("=value"),
            Err(TagError::EmptyKey { .. })
        ));
    }

    #[test]
    fn parse_fails_when_name_is_empty() {
        assert_eq!(InjectTag::parse("name="), Err(TagError::EmptyName));
        assert_eq!(InjectTag::parse("name"), Err(TagError::EmptyName));
    }

    #[test]
    fn parse_or_default_swallows_errors() {
        assert_eq!(InjectTag::parse_or_default("autowire=maybe"), InjectTag::default());
        assert!(InjectTag::parse_or_default("autowire").autowire);
    }
}
