//! Per-request attribute scopes.
//!
//! Session attributes live for one dispatch and are echoed back to the
//! platform. Persistent attributes come from the configured adapter, are
//! loaded at most once per dispatch, and are written only on request.

use std::sync::Arc;

use tracing::debug;

use metro_core::types::Attributes;
use metro_storage::PersistenceAdapter;

use crate::envelope::RequestEnvelope;
use crate::error::SkillError;

pub struct AttributesManager {
    user_id: Option<String>,
    session: Attributes,
    persistent: Option<Attributes>,
    adapter: Option<Arc<dyn PersistenceAdapter>>,
    saves: usize,
}

impl AttributesManager {
    /// Seed session attributes from the envelope.
    pub fn new(envelope: &RequestEnvelope, adapter: Option<Arc<dyn PersistenceAdapter>>) -> Self {
        let session = envelope
            .session
            .as_ref()
            .and_then(|s| s.attributes.clone())
            .unwrap_or_default();

        Self {
            user_id: envelope.user_id().map(str::to_string),
            session,
            persistent: None,
            adapter,
            saves: 0,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn session_attributes(&self) -> &Attributes {
        &self.session
    }

    pub fn session_attributes_mut(&mut self) -> &mut Attributes {
        &mut self.session
    }

    pub fn set_session_attributes(&mut self, attributes: Attributes) {
        self.session = attributes;
    }

    pub fn has_persistence(&self) -> bool {
        self.adapter.is_some()
    }

    /// Durable attributes for this user, fetched on first access.
    ///
    /// A user with nothing stored yet gets an empty map.
    pub async fn persistent_attributes(&mut self) -> Result<&Attributes, SkillError> {
        if self.persistent.is_none() {
            let adapter = self
                .adapter
                .as_ref()
                .ok_or(SkillError::PersistenceUnavailable)?;
            let user_id = self.user_id.as_deref().ok_or(SkillError::MissingUserId)?;
            let loaded = adapter.get_attributes(user_id).await?;
            debug!(user_id, found = loaded.is_some(), "Loaded persistent attributes");
            self.persistent = Some(loaded.unwrap_or_default());
        }
        Ok(self.persistent.get_or_insert_with(Attributes::new))
    }

    /// Stage durable attributes. Nothing is written until
    /// [`save_persistent_attributes`](Self::save_persistent_attributes).
    pub fn set_persistent_attributes(&mut self, attributes: Attributes) {
        self.persistent = Some(attributes);
    }

    /// Write the staged durable attributes through the adapter.
    pub async fn save_persistent_attributes(&mut self) -> Result<(), SkillError> {
        let adapter = self
            .adapter
            .as_ref()
            .ok_or(SkillError::PersistenceUnavailable)?;
        let user_id = self.user_id.as_deref().ok_or(SkillError::MissingUserId)?;
        let attributes = self.persistent.get_or_insert_with(Attributes::new);

        adapter.save_attributes(user_id, attributes).await?;
        self.saves += 1;
        debug!(user_id, keys = attributes.len(), "Saved persistent attributes");
        Ok(())
    }

    /// How many times this manager has written through the adapter.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    pub fn into_session_attributes(self) -> Attributes {
        self.session
    }
}
