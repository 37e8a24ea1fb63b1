/// The package prefix that marks a class as the user's own code.
///
/// Built once per run and passed to every extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    dotted: String,
}

impl Namespace {
    /// Accepts `com.example` as well as `com/example`; surrounding separators
    /// are ignored. An empty prefix admits every class.
    pub fn new(prefix: &str) -> Self {
        let dotted = prefix
            .trim()
            .replace('/', ".")
            .trim_matches('.')
            .to_string();
        Self { dotted }
    }

    pub fn as_str(&self) -> &str {
        &self.dotted
    }

    /// `com/example`, the form archive entry paths use.
    pub fn as_path(&self) -> String {
        self.dotted.replace('.', "/")
    }

    pub fn contains(&self, dotted_name: &str) -> bool {
        if self.dotted.is_empty() {
            return true;
        }
        match dotted_name.strip_prefix(self.dotted.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('.'),
            None => false,
        }
    }

    pub fn contains_path(&self, entry_path: &str) -> bool {
        if self.dotted.is_empty() {
            return true;
        }
        let prefix = self.as_path();
        match entry_path.strip_prefix(prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Resolution of a class's direct supertype against the user namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Supertype {
    None,
    Internal(String),
    External(String),
}

pub const ROOT_OBJECT: &str = "java/lang/Object";

impl Supertype {
    pub fn resolve(raw: Option<&str>, namespace: &Namespace) -> Self {
        let Some(raw) = raw.filter(|r| !r.is_empty() && *r != ROOT_OBJECT) else {
            return Supertype::None;
        };
        let dotted = raw.replace('/', ".");
        if namespace.contains(&dotted) {
            Supertype::Internal(dotted)
        } else {
            Supertype::External(dotted)
        }
    }

    pub fn internal_name(&self) -> Option<&str> {
        match self {
            Supertype::Internal(name) => Some(name),
            _ => None,
        }
    }
}
