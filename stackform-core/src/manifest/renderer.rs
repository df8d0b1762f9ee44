//! Compose manifest renderer.
//!
//! Walks a `Stack` and builds the `docker-compose.yml` document. Rendering is
//! pure and deterministic: the same stack always yields the same bytes.

use super::document::{Document, Mapping, Node};
use super::passthrough;
use crate::error::Result;
use crate::types::{Network, Service, Stack, Volume};
use tracing::{debug, instrument};

/// Test type used for health checks; the test is a single shell string.
const HEALTHCHECK_KIND: &str = "CMD-SHELL";

/// Renderer for compose manifests.
pub struct ManifestRenderer;

impl ManifestRenderer {
    /// Render a stack to manifest text.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A passthrough key collides with a rendered field (`ExtraConfigConflict`)
    /// - A passthrough value has no manifest form, or the document cannot be
    ///   emitted (`SerializationError`)
    #[instrument(skip(stack), fields(stack = %stack.name))]
    pub fn render(stack: &Stack) -> Result<String> {
        let yaml = Self::build(stack)?.to_yaml()?;
        debug!(bytes = yaml.len(), "Rendered manifest");
        Ok(yaml)
    }

    /// Build the manifest document without emitting it.
    pub fn build(stack: &Stack) -> Result<Document> {
        let mut root = Mapping::new();

        let mut services = Mapping::new();
        for service in &stack.services {
            services.insert(service.name.as_str(), Self::service_entry(service)?);
        }
        root.insert_if_nonempty("services", services);

        let mut networks = Mapping::new();
        for network in stack.networks.values() {
            networks.insert(network.name.as_str(), Self::network_entry(network));
        }
        root.insert_if_nonempty("networks", networks);

        let mut volumes = Mapping::new();
        for volume in stack.volumes.values() {
            volumes.insert(volume.name.as_str(), Self::volume_entry(volume));
        }
        root.insert_if_nonempty("volumes", volumes);

        Ok(Document::new(root))
    }

    fn service_entry(service: &Service) -> Result<Mapping> {
        let mut entry = Mapping::new();
        entry
            .insert("image", Node::string(service.image.as_str()))
            .insert("restart", Node::string(service.restart.as_str()))
            .insert_if_nonempty("ports", Node::strings(&service.ports))
            .insert_if_nonempty("depends_on", Node::strings(&service.depends_on))
            .insert_if_nonempty(
                "environment",
                Node::strings(service.environment.iter().map(|(k, v)| format!("{}={}", k, v))),
            )
            .insert_if_nonempty("command", Node::strings(&service.command))
            .insert_if_nonempty("entrypoint", Node::strings(&service.entrypoint));

        let mut deploy = Mapping::new();
        deploy.insert("replicas", Node::int(i64::from(service.replicas)));
        entry.insert("deploy", deploy);

        if service.healthcheck.is_configured() {
            let mut healthcheck = Mapping::new();
            healthcheck
                .insert("test", Node::strings([HEALTHCHECK_KIND, service.healthcheck.test.as_str()]))
                .insert("interval", Node::string(service.healthcheck.interval.as_str()))
                .insert("retries", Node::int(i64::from(service.healthcheck.retries)));
            entry.insert("healthcheck", healthcheck);
        }

        passthrough::merge_into(&mut entry, &service.name, &service.extra_config)?;

        Ok(entry)
    }

    fn network_entry(network: &Network) -> Mapping {
        let mut entry = Mapping::new();
        entry.insert("driver", Node::string(network.driver.as_str()));
        entry
    }

    fn volume_entry(volume: &Volume) -> Mapping {
        let mut entry = Mapping::new();
        entry.insert("driver", Node::string(volume.driver.as_str()));
        entry
    }
}
