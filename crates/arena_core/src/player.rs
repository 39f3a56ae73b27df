//! Registered player.

use crate::PlayerId;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};

/// A registered player. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters, new)]
pub struct Player {
    id: PlayerId,
    username: String,
}
