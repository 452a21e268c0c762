//! Class-level resource handles.
//!
//! A [`Resource`] pairs one schema with the client and exposes the
//! operations the original system put on the class: construction, remote
//! finds, and the dynamic finder entry point. Records hand out these same
//! operations indirectly when associations resolve.

use std::sync::Arc;

use serde_json::Value as Json;
use tracing::{debug, instrument};

use crate::attributes::AttributeStore;
use crate::client::Client;
use crate::errors::Error;
use crate::finder::{self, FinderCall, Found};
use crate::format::unwrap_root;
use crate::paths;
use crate::record::Record;
use crate::schema::Schema;

/// Handle for one registered resource class.
#[derive(Clone)]
pub struct Resource {
    schema: Arc<Schema>,
    client: Client,
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("schema", &self.schema.name())
            .finish()
    }
}

impl Resource {
    pub(crate) fn new(schema: Arc<Schema>, client: Client) -> Self {
        Self { schema, client }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// A record with no attributes.
    pub fn new_record(&self) -> Record {
        Record::new(self.schema.clone(), self.client.clone())
    }

    /// Constructs a record from an attribute map, applying load coercions.
    pub fn build(&self, attrs: Json) -> Result<Record, Error> {
        let mut record = self.new_record();
        record.load(attrs)?;
        Ok(record)
    }

    /// Build-and-save. The returned record carries validation errors when
    /// the save was rejected — inspect `errors()` or `id()`.
    pub async fn create(&self, attrs: Json) -> Result<Record, Error> {
        let mut record = self.build(attrs)?;
        record.save().await?;
        Ok(record)
    }

    /// Fetches a single element by id. A 404 is [`Error::NotFound`].
    #[instrument(skip(self), fields(resource = %self.schema.name()))]
    pub async fn find(&self, id: i64) -> Result<Record, Error> {
        let path = paths::element_path(
            &self.schema,
            id,
            &AttributeStore::new(),
            self.client.extension(),
        );
        debug!(%path, "find");
        let response = self
            .client
            .transport()
            .get(&path, self.client.headers())
            .await?;

        if response.status == 404 {
            return Err(Error::NotFound { path });
        }
        if !response.is_success() {
            return Err(Error::RequestFailed {
                status: response.status,
                path,
            });
        }

        let tree = self.client.format().decode(&response.body)?;
        let mut record = self.new_record();
        record.load(unwrap_root(&tree).clone())?;
        Ok(record)
    }

    /// Fetches the collection, filtered by the given query parameters.
    #[instrument(skip(self, params), fields(resource = %self.schema.name()))]
    pub async fn find_all(&self, params: &[(String, Json)]) -> Result<Vec<Record>, Error> {
        let query = render_params(params);
        let path = paths::collection_path(
            &self.schema,
            &AttributeStore::new(),
            &query,
            self.client.extension(),
        );
        debug!(%path, "find_all");
        let response = self
            .client
            .transport()
            .get(&path, self.client.headers())
            .await?;

        if response.status == 404 {
            return Err(Error::NotFound { path });
        }
        if !response.is_success() {
            return Err(Error::RequestFailed {
                status: response.status,
                path,
            });
        }

        let tree = self.client.format().decode(&response.body)?;
        let root = unwrap_root(&tree);
        let Json::Array(elements) = root else {
            return Err(Error::InvalidAttributes(root.to_string()));
        };
        let mut records = Vec::with_capacity(elements.len());
        for element in elements {
            let mut record = self.new_record();
            record.load(element.clone())?;
            records.push(record);
        }
        Ok(records)
    }

    /// First element of the filtered collection, when there is one.
    pub async fn find_first(&self, params: &[(String, Json)]) -> Result<Option<Record>, Error> {
        Ok(self.find_all(params).await?.into_iter().next())
    }

    /// `find_first` with a single `{field: value}` filter.
    pub async fn find_by(&self, field: &str, value: Json) -> Result<Option<Record>, Error> {
        self.find_first(&[(field.to_string(), value)]).await
    }

    /// `find_all` with a single `{field: value}` filter.
    pub async fn find_all_by(&self, field: &str, value: Json) -> Result<Vec<Record>, Error> {
        self.find_all(&[(field.to_string(), value)]).await
    }

    /// Dynamic finder dispatch: `find_by_<field>` and `find_all_by_<field>`
    /// method names resolve to the generic finds above; any other name is
    /// [`Error::NoSuchMethod`].
    pub async fn call(&self, method: &str, arg: Json) -> Result<Found, Error> {
        match finder::parse(method) {
            Some(FinderCall::All(field)) => {
                Ok(Found::Many(self.find_all_by(&field, arg).await?))
            }
            Some(FinderCall::First(field)) => Ok(Found::One(self.find_by(&field, arg).await?)),
            None => Err(Error::NoSuchMethod(method.to_string())),
        }
    }

    /// Whether an element with this id exists remotely.
    pub async fn exists(&self, id: i64) -> Result<bool, Error> {
        match self.find(id).await {
            Ok(_) => Ok(true),
            Err(Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn render_params(params: &[(String, Json)]) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(k, v)| (k.clone(), scalar_param(v)))
        .collect()
}

fn scalar_param(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        Json::Null => String::new(),
        other => other.to_string(),
    }
}
