//! Process identity attached to all telemetry.

use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;

use crate::config::ServiceIdentity;

// Semantic convention keys (avoiding dependency on semconv_experimental feature)
const SERVICE_NAME: &str = "service.name";
const SERVICE_VERSION: &str = "service.version";
const DEPLOYMENT_ENVIRONMENT: &str = "deployment.environment";

/// Static service identity, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    service_name: String,
    service_version: String,
    environment: String,
}

impl ResourceDescriptor {
    pub fn new(
        service_name: impl Into<String>,
        service_version: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: service_version.into(),
            environment: environment.into(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn service_version(&self) -> &str {
        &self.service_version
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Attribute list in OpenTelemetry form.
    pub fn attributes(&self) -> Vec<KeyValue> {
        vec![
            KeyValue::new(SERVICE_NAME, self.service_name.clone()),
            KeyValue::new(SERVICE_VERSION, self.service_version.clone()),
            KeyValue::new(DEPLOYMENT_ENVIRONMENT, self.environment.clone()),
        ]
    }

    /// Build the SDK resource shared by the tracer and meter providers.
    pub fn to_resource(&self) -> Resource {
        Resource::new(self.attributes())
    }
}

impl From<&ServiceIdentity> for ResourceDescriptor {
    fn from(identity: &ServiceIdentity) -> Self {
        Self::new(&identity.name, &identity.version, &identity.environment)
    }
}
