//! Volume domain types.

/// Default volume driver.
pub const DEFAULT_VOLUME_DRIVER: &str = "local";

/// Named volume declared by a stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    /// Volume name (unique within the stack)
    pub name: String,

    /// Volume driver
    pub driver: String,
}

impl Volume {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), driver: DEFAULT_VOLUME_DRIVER.to_string() }
    }

    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }
}
