//! Admin capability check.
//!
//! Whether an actor may run moderation commands is decided by the host
//! environment (chat admin list, bot owner, ...). The core only asks the
//! question through [`AdminCheck`]. A failed lookup is reported as
//! [`CapabilityError`] and is never confused with a definite "no".

use std::collections::BTreeSet;

use kickoff_types::ParticipantId;

use crate::config::AdminsConfig;

/// The admin lookup itself failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("admin lookup for {actor} failed: {message}")]
pub struct CapabilityError {
    /// The actor whose status could not be determined.
    pub actor: ParticipantId,
    /// Description of the failure.
    pub message: String,
}

/// Answers "may this actor run admin commands?".
pub trait AdminCheck: Send + Sync {
    /// `Ok(true)` for admins, `Ok(false)` for everyone else.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError`] if the answer could not be determined.
    fn is_admin(&self, actor: ParticipantId) -> Result<bool, CapabilityError>;
}

/// A fixed admin list: the bot owner plus configured group admins.
#[derive(Debug, Clone, Default)]
pub struct StaticAdmins {
    owner: Option<ParticipantId>,
    admins: BTreeSet<ParticipantId>,
}

impl StaticAdmins {
    /// Build from an owner and a list of admins.
    pub fn new(owner: Option<ParticipantId>, admins: impl IntoIterator<Item = ParticipantId>) -> Self {
        Self {
            owner,
            admins: admins.into_iter().collect(),
        }
    }

    /// Build from the `admins` config section.
    pub fn from_config(config: &AdminsConfig) -> Self {
        Self::new(config.owner_id, config.admin_ids.iter().copied())
    }
}

impl AdminCheck for StaticAdmins {
    fn is_admin(&self, actor: ParticipantId) -> Result<bool, CapabilityError> {
        Ok(self.owner == Some(actor) || self.admins.contains(&actor))
    }
}
