//! The client: transport, wire format, and the schema registry, wired once.
//!
//! Build one [`Client`] at startup, registering every resource schema, then
//! hand out [`Resource`] handles. The client is a cheap-clone handle around
//! shared state; registration is write-once, so association resolution can
//! look schemas up without locking.

use std::sync::Arc;

use crate::errors::Error;
use crate::format::{JsonFormat, WireFormat};
use crate::resource::Resource;
use crate::schema::{Registry, Schema};
use crate::transport::{Headers, Transport};

struct ClientInner {
    transport: Arc<dyn Transport>,
    format: Arc<dyn WireFormat>,
    headers: Headers,
    registry: Registry,
}

/// Shared context for every record and resource handle. Clones share the
/// same transport, format, and registry.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    /// Starts a builder around the transport that will carry every request.
    pub fn builder(transport: impl Transport + 'static) -> ClientBuilder {
        ClientBuilder {
            transport: Arc::new(transport),
            format: Arc::new(JsonFormat),
            headers: Headers::new(),
            schemas: Vec::new(),
        }
    }

    /// Handle for a registered resource, by singular name.
    pub fn resource(&self, name: &str) -> Result<Resource, Error> {
        let schema = self
            .inner
            .registry
            .get(name)
            .ok_or_else(|| Error::UnknownResource(name.to_string()))?;
        Ok(Resource::new(schema, self.clone()))
    }

    /// Association targets resolve strictly: an undeclared class is an
    /// error, the same way a dangling class name was in the original.
    pub(crate) fn resource_for(&self, association: &str) -> Result<Resource, Error> {
        self.resource(association)
    }

    /// Loading nested documents is lenient: unknown keys get an anonymous
    /// schema instead of failing the whole load.
    pub(crate) fn schema_or_default(&self, name: &str) -> Arc<Schema> {
        self.inner.registry.get_or_default(name)
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        &*self.inner.transport
    }

    pub(crate) fn format(&self) -> &dyn WireFormat {
        &*self.inner.format
    }

    pub(crate) fn headers(&self) -> &Headers {
        &self.inner.headers
    }

    pub(crate) fn extension(&self) -> &str {
        self.inner.format.extension()
    }
}

/// Accumulates registrations, then freezes them into a [`Client`].
pub struct ClientBuilder {
    transport: Arc<dyn Transport>,
    format: Arc<dyn WireFormat>,
    headers: Headers,
    schemas: Vec<Arc<Schema>>,
}

impl ClientBuilder {
    /// Replaces the bundled JSON wire format.
    pub fn format(mut self, format: impl WireFormat + 'static) -> Self {
        self.format = Arc::new(format);
        self
    }

    /// Adds a header to every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Registers a resource schema.
    pub fn register(mut self, schema: Arc<Schema>) -> Self {
        self.schemas.push(schema);
        self
    }

    pub fn build(self) -> Client {
        let mut headers = vec![(
            "Content-Type".to_string(),
            self.format.mime_type().to_string(),
        )];
        headers.extend(self.headers);
        Client {
            inner: Arc::new(ClientInner {
                transport: self.transport,
                format: self.format,
                headers,
                registry: Registry::new(self.schemas),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn unregistered_resources_are_unknown() {
        let client = Client::builder(MockTransport::new())
            .register(Schema::builder("race").build())
            .build();

        assert!(client.resource("race").is_ok());
        let err = client.resource("gender").unwrap_err();
        assert!(matches!(err, Error::UnknownResource(name) if name == "gender"));
    }

    #[test]
    fn content_type_follows_the_format() {
        let client = Client::builder(MockTransport::new()).build();
        assert_eq!(
            client.headers().first(),
            Some(&("Content-Type".to_string(), "application/json".to_string()))
        );
    }
}
