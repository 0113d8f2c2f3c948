use std::path::PathBuf;

/// Where configuration overlays come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadConfigRequest {
    pub env: EnvSource,
    pub files: FileSource,
}

impl LoadConfigRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads environment variables named `{prefix}{OBJECT}_{FIELD}`.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env.enabled = true;
        self.env.prefix = prefix.into();
        self
    }

    /// Appends a configuration file. Files are merged in the order given,
    /// later files overriding earlier ones.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.enabled = true;
        self.files.paths.push(path.into());
        self
    }

    pub fn skip_missing_files(mut self, skip: bool) -> Self {
        self.files.skip_if_not_exist = skip;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSource {
    pub enabled: bool,
    pub prefix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSource {
    pub enabled: bool,
    pub paths: Vec<PathBuf>,
    pub skip_if_not_exist: bool,
}

/// Options of a full container startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadRequest {
    /// Runs the startup again even if the container is already loaded.
    pub force_reload: bool,
    pub config: LoadConfigRequest,
}

impl LoadRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn force_reload(mut self, force: bool) -> Self {
        self.force_reload = force;
        self
    }

    pub fn with_config(mut self, config: LoadConfigRequest) -> Self {
        self.config = config;
        self
    }
}
