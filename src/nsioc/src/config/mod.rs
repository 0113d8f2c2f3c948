//! Configuration loading for objects in the `config` namespace.
//!
//! Every object receives a [`ConfigSource`] in [`Object::load_config`] and
//! decides itself what to read. Files are keyed by object name:
//!
//! ```toml
//! [http]
//! port = 8080
//!
//! [database]
//! url = "postgres://localhost/app"
//! ```
//!
//! [`Object::load_config`]: crate::object::Object::load_config

mod request;
mod source;

use std::path::{Path, PathBuf};

use figment::providers::{Format, Json, Toml, Yaml};
use figment::Figment;
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::container::namespace::NamespaceStore;
use crate::lifecycle::LifecycleState;
use crate::object::BoxError;
use crate::util::display::AggregatedDisplayer;

pub use request::{EnvSource, FileSource, LoadConfigRequest, LoadRequest};
pub use source::ConfigSource;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum ConfigError {
    #[snafu(display("configuration file {} does not exist", path.display()))]
    #[non_exhaustive]
    FileNotFound { path: PathBuf },
    #[snafu(display("could not extract the configuration of {object}"))]
    #[non_exhaustive]
    Extract {
        object: String,
        source: Box<figment::Error>,
    },
    #[snafu(display("object {object} rejected its configuration"))]
    #[non_exhaustive]
    Object { object: String, source: BoxError },
    #[snafu(display("could not load configuration:\n{}", AggregatedDisplayer::new(errors)))]
    #[non_exhaustive]
    Aggregated { errors: Vec<ConfigError> },
}

impl ConfigError {
    /// Wraps an error raised by an object's own validation.
    pub fn object(object: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Object {
            object: object.into(),
            source: source.into(),
        }
    }

    pub(crate) fn aggregate(mut errors: Vec<ConfigError>) -> Result<(), ConfigError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ConfigError::Aggregated { errors }),
        }
    }
}

/// Runs [`Object::load_config`] on every object of `store`.
///
/// Loading continues past failing objects so that every misconfiguration is
/// reported at once. Objects that loaded successfully move to
/// [`LifecycleState::Configured`].
///
/// # Errors
///
/// Returns every missing file and object failure, aggregated.
///
/// [`Object::load_config`]: crate::object::Object::load_config
pub fn load_config(store: &NamespaceStore, request: &LoadConfigRequest) -> Result<(), ConfigError> {
    let mut errors = Vec::new();
    let files = if request.files.enabled {
        file_overlays(&request.files, &mut errors)
    } else {
        Figment::new()
    };
    let env_prefix = request
        .env
        .enabled
        .then_some(request.env.prefix.as_str());

    let mut loaded = 0;
    store.for_each(|wrapper| {
        let source = ConfigSource::new(wrapper.name(), env_prefix, &files);
        match wrapper.value().load_config(&source) {
            Ok(()) => {
                wrapper.set_state(LifecycleState::Configured);
                loaded += 1;
            }
            Err(err) => {
                warn!(
                    namespace = store.namespace(),
                    object = wrapper.name(),
                    error = %err,
                    "could not load configuration"
                );
                errors.push(err);
            }
        }
    });

    info!(
        namespace = store.namespace(),
        objects = loaded,
        failed = errors.len(),
        "configuration loaded"
    );
    ConfigError::aggregate(errors)
}

fn file_overlays(files: &FileSource, errors: &mut Vec<ConfigError>) -> Figment {
    let mut figment = Figment::new();
    for path in &files.paths {
        if !path.exists() {
            if files.skip_if_not_exist {
                debug!(path = %path.display(), "skipping missing configuration file");
            } else {
                errors.push(ConfigError::FileNotFound { path: path.clone() });
            }
            continue;
        }
        debug!(path = %path.display(), "merging configuration file");
        figment = match FileFormat::of(path) {
            FileFormat::Toml => figment.merge(Toml::file(path)),
            FileFormat::Yaml => figment.merge(Yaml::file(path)),
            FileFormat::Json => figment.merge(Json::file(path)),
        };
    }
    figment
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Toml,
    Yaml,
    Json,
}

impl FileFormat {
    /// Picks the format by extension. Unknown extensions are read as TOML.
    fn of(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yaml" | "yml") => Self::Yaml,
            Some("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}
