//! Validation and the save state machine.
//!
//! A record moves New -> Validating -> Persisting (create or update) ->
//! Persisted, or stops at Invalid with the error collection populated.
//! Local validation failures never escape `save` as errors; only
//! [`Record::save_strict`] converts them into [`Error::RecordNotSaved`].

use async_recursion::async_recursion;
use serde_json::Value as Json;
use tracing::{debug, info, warn};

use crate::errors::Error;
use crate::format::unwrap_root;
use crate::paths;
use crate::transport::Response;

use super::Record;

impl Record {
    /// Runs the validation hook chain. Success is judged by the error
    /// collection being empty afterward, not by a return value.
    pub fn validate(&mut self) {
        let hooks = self.schema.hooks();
        hooks.validate(self);
    }

    /// Clears the error collection, re-runs validation, and reports whether
    /// the collection stayed empty.
    pub fn is_valid(&mut self) -> bool {
        self.errors.clear();
        self.validate();
        self.errors.is_empty()
    }

    /// Validates, then creates or updates on the remote service.
    ///
    /// Returns `Ok(false)` without remote traffic when validation fails,
    /// and `Ok(false)` with the remote messages loaded into the error
    /// collection when the service rejects the save as invalid. Transport
    /// and codec failures propagate unmodified.
    #[async_recursion]
    pub async fn save(&mut self) -> Result<bool, Error> {
        if !self.is_valid() {
            debug!(
                resource = %self.schema.name(),
                errors = self.errors.len(),
                "validation failed, skipping remote save"
            );
            return Ok(false);
        }

        let hooks = self.schema.hooks();
        hooks.before_save(self);

        let persisted = if self.is_new() {
            self.create_remote().await?
        } else {
            self.update_remote().await?
        };

        if persisted {
            hooks.after_save(self);
        }
        Ok(persisted)
    }

    /// [`Record::save`] that insists: validation errors or a rejected
    /// remote save become [`Error::RecordNotSaved`].
    pub async fn save_strict(&mut self) -> Result<(), Error> {
        self.validate();
        if self.errors.is_empty() && self.save().await? {
            Ok(())
        } else {
            Err(Error::RecordNotSaved)
        }
    }

    /// Create on the remote service, then cascade nested saves with the
    /// server-assigned id, refresh from the response, and merge the saved
    /// children back.
    async fn create_remote(&mut self) -> Result<bool, Error> {
        let body = self.to_wire()?;
        let path = paths::collection_path(
            &self.schema,
            &self.prefix_options,
            &[],
            self.client.extension(),
        );
        debug!(resource = %self.schema.name(), %path, "create");

        let response = self
            .client
            .transport()
            .post(&path, &body, self.client.headers())
            .await?;

        if response.status == 422 {
            warn!(resource = %self.schema.name(), status = response.status, "create rejected");
            self.absorb_remote_errors(&response);
            return Ok(false);
        }
        if !response.is_success() {
            return Err(Error::RequestFailed {
                status: response.status,
                path,
            });
        }

        if let Some(id) = self.id_from_response(&response)? {
            self.set_id(id);
        }
        let saved = self.save_nested().await?;
        self.load_from_response(&response)?;
        self.merge_saved_nested(saved);

        info!(resource = %self.schema.name(), id = ?self.id(), "created");
        Ok(true)
    }

    /// Update on the remote service; same nested cascade and merge-back as
    /// create, minus the id assignment.
    async fn update_remote(&mut self) -> Result<bool, Error> {
        let id = self.id().ok_or(Error::MissingId)?;
        let body = self.to_wire()?;
        let path = paths::element_path(
            &self.schema,
            id,
            &self.prefix_options,
            self.client.extension(),
        );
        debug!(resource = %self.schema.name(), %path, "update");

        let response = self
            .client
            .transport()
            .put(&path, &body, self.client.headers())
            .await?;

        if response.status == 422 {
            warn!(resource = %self.schema.name(), status = response.status, "update rejected");
            self.absorb_remote_errors(&response);
            return Ok(false);
        }
        if !response.is_success() {
            return Err(Error::RequestFailed {
                status: response.status,
                path,
            });
        }

        let saved = self.save_nested().await?;
        self.load_from_response(&response)?;
        self.merge_saved_nested(saved);

        info!(resource = %self.schema.name(), id, "updated");
        Ok(true)
    }

    /// Deletes the element on the remote service. The local record keeps
    /// its attributes; only the remote side is gone.
    pub async fn destroy(&mut self) -> Result<(), Error> {
        let id = self.id().ok_or(Error::MissingId)?;
        let path = paths::element_path(
            &self.schema,
            id,
            &self.prefix_options,
            self.client.extension(),
        );
        let response = self
            .client
            .transport()
            .delete(&path, self.client.headers())
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
        info!(resource = %self.schema.name(), id, "destroyed");
        Ok(())
    }

    /// Re-fetches the element and merges the response over the local
    /// attributes.
    pub async fn reload(&mut self) -> Result<(), Error> {
        let id = self.id().ok_or(Error::MissingId)?;
        let path = paths::element_path(
            &self.schema,
            id,
            &self.prefix_options,
            self.client.extension(),
        );
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
        self.load_from_response(&response)?;
        Ok(())
    }

    /// Pulls validation messages out of a rejection document. The service
    /// answers either a flat message list or a field-to-messages map.
    fn absorb_remote_errors(&mut self, response: &Response) {
        let Ok(tree) = self.client.format().decode(&response.body) else {
            self.errors.add_to_base("remote save rejected");
            return;
        };
        match unwrap_root(&tree) {
            Json::Array(messages) => {
                for message in messages {
                    if let Json::String(s) = message {
                        self.errors.add_to_base(s.clone());
                    }
                }
            }
            Json::Object(fields) => {
                for (field, messages) in fields {
                    match messages {
                        Json::String(s) => self.errors.add(field.clone(), s.clone()),
                        Json::Array(list) => {
                            for message in list {
                                if let Json::String(s) = message {
                                    self.errors.add(field.clone(), s.clone());
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => self.errors.add_to_base("remote save rejected"),
        }
    }
}
