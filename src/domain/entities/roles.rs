use std::fmt;

/// Role names held by a guild member, in the member's role order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet {
    names: Vec<String>,
}

impl RoleSet {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl From<Vec<String>> for RoleSet {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl FromIterator<String> for RoleSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_exact_match() {
        let roles = RoleSet::new(vec!["Cat People".to_string(), "mod".to_string()]);
        assert!(roles.contains("Cat People"));
        assert!(!roles.contains("cat people"));
        assert!(!roles.contains("mo"));
    }

    #[test]
    fn display_keeps_order() {
        let roles: RoleSet = vec!["b".to_string(), "a".to_string()].into_iter().collect();
        assert_eq!(roles.to_string(), "[b, a]");
        assert_eq!(RoleSet::empty().to_string(), "[]");
    }
}
