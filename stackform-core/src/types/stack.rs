//! Stack domain types (compose services).

use crate::types::{DeclaredValue, Network, Volume};
use std::collections::BTreeMap;

/// Default restart policy for services.
pub const DEFAULT_RESTART: &str = "always";

/// Default replica count for services.
pub const DEFAULT_REPLICAS: u32 = 1;

/// Multi-service stack, rebuilt from the declaration on every pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stack {
    /// Stack name, used as the reconciliation identity
    pub name: String,

    /// Services in declaration order
    pub services: Vec<Service>,

    /// Networks, keyed by name
    pub networks: BTreeMap<String, Network>,

    /// Volumes, keyed by name
    pub volumes: BTreeMap<String, Volume>,
}

impl Stack {
    /// Create an empty stack.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Add a service, keeping declaration order.
    pub fn with_service(mut self, service: Service) -> Self {
        self.services.push(service);
        self
    }

    /// Add a network. A network with the same name is replaced.
    pub fn with_network(mut self, network: Network) -> Self {
        self.networks.insert(network.name.clone(), network);
        self
    }

    /// Add a volume. A volume with the same name is replaced.
    pub fn with_volume(mut self, volume: Volume) -> Self {
        self.volumes.insert(volume.name.clone(), volume);
        self
    }

    /// Names of all services, in declaration order.
    pub fn service_names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Service in a stack.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    /// Service name (unique within the stack)
    pub name: String,

    /// Container image reference
    pub image: String,

    /// Restart policy. Not validated here; the engine rejects unknown policies.
    pub restart: String,

    /// Port mappings (e.g., ["8080:80"])
    pub ports: Vec<String>,

    /// Services this depends on
    pub depends_on: Vec<String>,

    /// Environment variables
    pub environment: BTreeMap<String, String>,

    /// Override the default command
    pub command: Vec<String>,

    /// Override the default entrypoint
    pub entrypoint: Vec<String>,

    /// Number of replicas (>= 1)
    pub replicas: u32,

    /// Health check configuration
    pub healthcheck: HealthCheck,

    /// Passthrough keys merged verbatim into the service entry
    pub extra_config: BTreeMap<String, DeclaredValue>,
}

impl Service {
    /// Create a service with every optional field at its default.
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            restart: DEFAULT_RESTART.to_string(),
            ports: Vec::new(),
            depends_on: Vec::new(),
            environment: BTreeMap::new(),
            command: Vec::new(),
            entrypoint: Vec::new(),
            replicas: DEFAULT_REPLICAS,
            healthcheck: HealthCheck::default(),
            extra_config: BTreeMap::new(),
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HealthCheck {
    /// Shell command run inside the container
    pub test: String,

    /// Interval between checks (e.g., "30s")
    pub interval: String,

    /// Number of retries before marking unhealthy
    pub retries: u32,
}

impl HealthCheck {
    /// A health check is only rendered when both test and interval are set.
    pub fn is_configured(&self) -> bool {
        !self.test.is_empty() && !self.interval.is_empty()
    }
}
