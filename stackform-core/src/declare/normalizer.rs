//! Declaration normalizer.
//!
//! Turns a loosely-typed `DeclaredValue` into a `Stack`, applying the default
//! of every optional field when it is absent or null.

use crate::error::{Result, StackformError};
use crate::types::{
    DeclaredValue, HealthCheck, Network, Service, Stack, Volume, DEFAULT_NETWORK_DRIVER,
    DEFAULT_REPLICAS, DEFAULT_RESTART, DEFAULT_VOLUME_DRIVER,
};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, instrument};

const STACK_KEYS: &[&str] = &["name", "services", "networks", "volumes"];

const SERVICE_KEYS: &[&str] = &[
    "name",
    "image",
    "restart",
    "ports",
    "depends_on",
    "environment",
    "command",
    "entrypoint",
    "replicas",
    "healthcheck_test",
    "healthcheck_interval",
    "healthcheck_retries",
    "extra_config",
];

const RESOURCE_KEYS: &[&str] = &["name", "driver"];

/// Normalizer for stack declarations.
pub struct StackNormalizer;

impl StackNormalizer {
    /// Normalize a whole stack declaration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A field cannot be coerced to its expected shape (`TypeMismatch`)
    /// - A required field is absent or null (`MissingField`)
    /// - A value is out of range or a key is unknown (`InvalidValue`)
    /// - Two services, networks or volumes share a name (`DuplicateName`)
    #[instrument(skip(declaration))]
    pub fn normalize(declaration: &DeclaredValue) -> Result<Stack> {
        let fields = Fields::root(declaration)?;
        fields.reject_unknown(STACK_KEYS)?;

        let name = fields.required_string("name")?;
        let mut stack = Stack::new(name);

        let mut seen = HashSet::new();
        for service_fields in fields.list_of_maps("services")? {
            let service = Self::normalize_service(&service_fields)?;
            if !seen.insert(service.name.clone()) {
                return Err(StackformError::DuplicateName { kind: "service", name: service.name });
            }
            stack.services.push(service);
        }

        for network_fields in fields.list_of_maps("networks")? {
            network_fields.reject_unknown(RESOURCE_KEYS)?;
            let network = Network::new(network_fields.required_string("name")?)
                .with_driver(network_fields.string_or("driver", DEFAULT_NETWORK_DRIVER)?);
            if stack.networks.contains_key(&network.name) {
                return Err(StackformError::DuplicateName { kind: "network", name: network.name });
            }
            stack.networks.insert(network.name.clone(), network);
        }

        for volume_fields in fields.list_of_maps("volumes")? {
            volume_fields.reject_unknown(RESOURCE_KEYS)?;
            let volume = Volume::new(volume_fields.required_string("name")?)
                .with_driver(volume_fields.string_or("driver", DEFAULT_VOLUME_DRIVER)?);
            if stack.volumes.contains_key(&volume.name) {
                return Err(StackformError::DuplicateName { kind: "volume", name: volume.name });
            }
            stack.volumes.insert(volume.name.clone(), volume);
        }

        debug!(
            stack = %stack.name,
            services = stack.services.len(),
            networks = stack.networks.len(),
            volumes = stack.volumes.len(),
            "Normalized stack declaration"
        );

        Ok(stack)
    }

    fn normalize_service(fields: &Fields<'_>) -> Result<Service> {
        fields.reject_unknown(SERVICE_KEYS)?;

        let replicas = fields.int_or("replicas", i64::from(DEFAULT_REPLICAS))?;
        if replicas < 1 {
            return Err(StackformError::InvalidValue {
                field: fields.path_of("replicas"),
                reason: format!("replicas must be at least 1, got {}", replicas),
            });
        }

        let retries = fields.int_or("healthcheck_retries", 0)?;
        if retries < 0 {
            return Err(StackformError::InvalidValue {
                field: fields.path_of("healthcheck_retries"),
                reason: format!("retries must not be negative, got {}", retries),
            });
        }

        Ok(Service {
            name: fields.required_string("name")?,
            image: fields.required_string("image")?,
            restart: fields.string_or("restart", DEFAULT_RESTART)?,
            ports: fields.string_list("ports")?,
            depends_on: fields.string_list("depends_on")?,
            environment: fields.string_map("environment")?,
            command: fields.string_list("command")?,
            entrypoint: fields.string_list("entrypoint")?,
            replicas: to_u32(replicas, || fields.path_of("replicas"))?,
            healthcheck: HealthCheck {
                test: fields.string_or("healthcheck_test", "")?,
                interval: fields.string_or("healthcheck_interval", "")?,
                retries: to_u32(retries, || fields.path_of("healthcheck_retries"))?,
            },
            extra_config: fields.map("extra_config")?,
        })
    }
}

fn to_u32(value: i64, field: impl FnOnce() -> String) -> Result<u32> {
    u32::try_from(value).map_err(|_| StackformError::InvalidValue {
        field: field(),
        reason: format!("{} is out of range", value),
    })
}

/// A declared map together with its location in the declaration.
///
/// Each accessor coerces one field to its target shape and fails closed with
/// `TypeMismatch` on anything else.
struct Fields<'a> {
    path: String,
    map: &'a BTreeMap<String, DeclaredValue>,
}

impl<'a> Fields<'a> {
    fn root(value: &'a DeclaredValue) -> Result<Self> {
        match value {
            DeclaredValue::Map(map) => Ok(Self { path: String::new(), map }),
            other => Err(StackformError::mismatch("declaration", "map", other.kind())),
        }
    }

    fn path_of(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    /// Absent and explicit null are treated the same.
    fn get(&self, key: &str) -> Option<&'a DeclaredValue> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn reject_unknown(&self, allowed: &[&str]) -> Result<()> {
        match self.map.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(key) => Err(StackformError::InvalidValue {
                field: self.path_of(key),
                reason: "unknown field".to_string(),
            }),
            None => Ok(()),
        }
    }

    fn required_string(&self, key: &str) -> Result<String> {
        let value = self
            .get(key)
            .ok_or_else(|| StackformError::MissingField { field: self.path_of(key) })?;
        let s = expect_string(value, || self.path_of(key))?;
        if s.is_empty() {
            return Err(StackformError::InvalidValue {
                field: self.path_of(key),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(s)
    }

    fn string_or(&self, key: &str, default: &str) -> Result<String> {
        match self.get(key) {
            Some(value) => expect_string(value, || self.path_of(key)),
            None => Ok(default.to_string()),
        }
    }

    fn int_or(&self, key: &str, default: i64) -> Result<i64> {
        match self.get(key) {
            Some(DeclaredValue::Integer(i)) => Ok(*i),
            Some(other) => Err(StackformError::mismatch(self.path_of(key), "integer", other.kind())),
            None => Ok(default),
        }
    }

    fn string_list(&self, key: &str) -> Result<Vec<String>> {
        match self.get(key) {
            Some(DeclaredValue::List(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| expect_string(item, || format!("{}[{}]", self.path_of(key), i)))
                .collect(),
            Some(other) => Err(StackformError::mismatch(self.path_of(key), "list", other.kind())),
            None => Ok(Vec::new()),
        }
    }

    fn string_map(&self, key: &str) -> Result<BTreeMap<String, String>> {
        match self.get(key) {
            Some(DeclaredValue::Map(entries)) => entries
                .iter()
                .map(|(k, v)| {
                    let value = expect_string(v, || format!("{}.{}", self.path_of(key), k))?;
                    Ok((k.clone(), value))
                })
                .collect(),
            Some(other) => Err(StackformError::mismatch(self.path_of(key), "map", other.kind())),
            None => Ok(BTreeMap::new()),
        }
    }

    fn map(&self, key: &str) -> Result<BTreeMap<String, DeclaredValue>> {
        match self.get(key) {
            Some(DeclaredValue::Map(entries)) => Ok(entries.clone()),
            Some(other) => Err(StackformError::mismatch(self.path_of(key), "map", other.kind())),
            None => Ok(BTreeMap::new()),
        }
    }

    fn list_of_maps(&self, key: &str) -> Result<Vec<Fields<'a>>> {
        match self.get(key) {
            Some(DeclaredValue::List(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let path = format!("{}[{}]", self.path_of(key), i);
                    match item {
                        DeclaredValue::Map(map) => Ok(Fields { path, map }),
                        other => Err(StackformError::mismatch(path, "map", other.kind())),
                    }
                })
                .collect(),
            Some(other) => Err(StackformError::mismatch(self.path_of(key), "list", other.kind())),
            None => Ok(Vec::new()),
        }
    }
}

fn expect_string(value: &DeclaredValue, field: impl FnOnce() -> String) -> Result<String> {
    match value {
        DeclaredValue::String(s) => Ok(s.clone()),
        other => Err(StackformError::mismatch(field(), "string", other.kind())),
    }
}
