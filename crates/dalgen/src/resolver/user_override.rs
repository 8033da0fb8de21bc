use crate::error::GenError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User-declared location of an external class.
///
/// Written on the command line as `[namespace::]class[@include-prefix]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserOverride {
    /// C++ namespace, empty for the global namespace
    pub namespace: String,

    /// Schema class name
    pub class: String,

    /// Include-path prefix, empty when headers sit at the include root
    pub include_prefix: String,
}

impl UserOverride {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            namespace: String::new(),
            class: class.into(),
            include_prefix: String::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_include_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.include_prefix = prefix.into();
        self
    }
}

impl FromStr for UserOverride {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (qualified, include_prefix) = match s.split_once('@') {
            Some((head, prefix)) => (head, prefix),
            None => (s, ""),
        };

        let (namespace, class) = match qualified.rfind("::") {
            Some(idx) => (&qualified[..idx], &qualified[idx + 2..]),
            None => ("", qualified),
        };

        if class.is_empty() {
            return Err(GenError::InvalidConfig(format!(
                "user-defined class \"{s}\" has no class name (expected [namespace::]class[@include-prefix])"
            )));
        }

        Ok(Self {
            namespace: namespace.to_string(),
            class: class.to_string(),
            include_prefix: include_prefix.to_string(),
        })
    }
}

impl fmt::Display for UserOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.namespace.is_empty() {
            write!(f, "{}::", self.namespace)?;
        }
        write!(f, "{}", self.class)?;
        if !self.include_prefix.is_empty() {
            write!(f, "@{}", self.include_prefix)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_class_only() {
        let o: UserOverride = "Rack".parse().unwrap();
        assert_eq!(o, UserOverride::new("Rack"));
    }

    #[test]
    fn test_parse_full_form() {
        let o: UserOverride = "hw::infra::Rack@infra/dal".parse().unwrap();
        assert_eq!(o.namespace, "hw::infra");
        assert_eq!(o.class, "Rack");
        assert_eq!(o.include_prefix, "infra/dal");
        assert_eq!(o.to_string(), "hw::infra::Rack@infra/dal");
    }

    #[test]
    fn test_parse_prefix_without_namespace() {
        let o: UserOverride = "Rack@infra".parse().unwrap();
        assert_eq!(o.namespace, "");
        assert_eq!(o.class, "Rack");
        assert_eq!(o.include_prefix, "infra");
    }

    #[test]
    fn test_parse_rejects_missing_class() {
        assert!("hw::@infra".parse::<UserOverride>().is_err());
        assert!("".parse::<UserOverride>().is_err());
    }
}
