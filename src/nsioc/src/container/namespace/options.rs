/// Options narrowing a lookup in a [`NamespaceStore`].
///
/// [`NamespaceStore`]: crate::container::namespace::NamespaceStore
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetOptions {
    version: Option<String>,
}

impl GetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only matches an object whose active version equals `version`.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn requested_version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}
