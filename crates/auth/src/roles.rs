use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role name used for authorization decisions.
///
/// Role names are intentionally opaque strings at this layer; resolving them
/// to catalog entries (ids, menu grants) is the store's concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(Cow<'static, str>);

impl RoleName {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The known role catalog.
///
/// The store remains the source of truth for which roles exist; these
/// constants exist so guard presets can be expressed without allocation.
pub const ADMIN: RoleName = RoleName::from_static("admin");
pub const MANAJER: RoleName = RoleName::from_static("manajer");
pub const STAFF: RoleName = RoleName::from_static("staff");
pub const USER: RoleName = RoleName::from_static("user");
