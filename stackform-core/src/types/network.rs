//! Network domain types.

/// Default network driver.
pub const DEFAULT_NETWORK_DRIVER: &str = "bridge";

/// Network declared by a stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    /// Network name (unique within the stack)
    pub name: String,

    /// Network driver
    pub driver: String,
}

impl Network {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), driver: DEFAULT_NETWORK_DRIVER.to_string() }
    }

    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }
}
