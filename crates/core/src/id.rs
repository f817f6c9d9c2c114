// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID newtypes and generation.
//!
//! Two families of identifiers exist:
//!
//! - **Generated** ids ([`EntryId`], [`AnomalyId`], [`ClientId`]) are minted
//!   by this process as `{4-char prefix}{19-char nanoid}`.
//! - **External** ids (tenant, job, file; see [`crate::tenant`] and
//!   [`crate::job`]) arrive from outside the core and are opaque strings of
//!   arbitrary length.
//!
//! Both are `String`-backed newtypes produced by [`define_id!`].

/// Returns a string slice truncated to at most `n` characters.
pub fn short(s: &str, n: usize) -> &str {
    if s.len() <= n {
        s
    } else {
        &s[..n]
    }
}

/// Define a `String`-backed newtype ID.
///
/// With a prefix literal, generates `new()` minting `{prefix}{nanoid(19)}`:
///
/// ```ignore
/// define_id! {
///     /// Doc comment for the ID type.
///     pub struct AnomalyId("ano-");
/// }
/// ```
///
/// Without a prefix, the ID is externally assigned and `new(impl Into<String>)`
/// wraps the given value:
///
/// ```ignore
/// define_id! {
///     pub struct TenantId;
/// }
/// ```
///
/// Both forms get `as_str()`, `is_empty()`, `Display`, `From<&str>/<String>`,
/// `PartialEq<str>`, `Borrow<str>`, and `Deref<Target = str>`.
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($prefix:literal);
    ) => {
        $crate::define_id!(@common $(#[$meta])* $name);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Generate a new random ID with the type prefix.
            pub fn new() -> Self {
                Self(format!("{}{}", Self::PREFIX, nanoid::nanoid!(19)))
            }

            /// Get the ID suffix (without prefix).
            pub fn suffix(&self) -> &str {
                self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };

    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $crate::define_id!(@common $(#[$meta])* $name);

        impl $name {
            /// Wrap an externally assigned identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }
        }
    };

    (@common $(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the ID is an empty string.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&String> for $name {
            fn from(s: &String) -> Self {
                Self(s.clone())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }
    };
}

crate::define_id! {
    /// Identifier for one parsed log entry within a job.
    pub struct EntryId("ent-");
}

crate::define_id! {
    /// Identifier for a detected anomaly.
    pub struct AnomalyId("ano-");
}

crate::define_id! {
    /// Identifier for a connected hub client (one WebSocket).
    pub struct ClientId("cli-");
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
