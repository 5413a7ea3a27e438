//! Per-connection planning context: current user, default schema, string
//! collation mode and session variables.

use hashbrown::HashMap;

#[derive(Debug, Clone)]
pub struct SessionContext {
    user: Option<String>,
    current_schema: String,
    binary_collation: bool,
    variables: HashMap<String, String>,
}

impl SessionContext {
    pub fn new(current_schema: impl Into<String>) -> Self {
        Self {
            user: None,
            current_schema: current_schema.into(),
            binary_collation: true,
            variables: HashMap::new(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn current_schema(&self) -> &str {
        &self.current_schema
    }

    pub fn set_current_schema(&mut self, schema: impl Into<String>) {
        self.current_schema = schema.into();
    }

    /// True when string comparison and LIKE prefix extraction operate on
    /// raw bytes. Collation-aware comparison is the executor's business;
    /// the planner only ever runs in binary mode.
    pub fn binary_collation(&self) -> bool {
        self.binary_collation
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new("test")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let session = SessionContext::default();
        assert_eq!(session.current_schema(), "test");
        assert!(session.binary_collation());
        assert_eq!(session.user(), None);
    }

    #[test]
    fn test_variables() {
        let mut session = SessionContext::new("app").with_user("root");
        session.set_variable("sql_mode", "STRICT_ALL_TABLES");
        assert_eq!(session.variable("sql_mode"), Some("STRICT_ALL_TABLES"));
        assert_eq!(session.variable("missing"), None);
        assert_eq!(session.user(), Some("root"));
    }
}
