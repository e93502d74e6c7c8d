//! Domain primitives: TimeMs, Space, and id newtypes.

use serde::{Deserialize, Serialize};

pub const MS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    /// Create a TimeMs from milliseconds.
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        TimeMs(chrono::Utc::now().timestamp_millis())
    }

    /// Get the underlying milliseconds value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// This time shifted forward by a whole number of hours.
    pub fn plus_hours(&self, hours: i64) -> Self {
        TimeMs(self.0 + hours * MS_PER_HOUR)
    }

    /// This time shifted backward by a whole number of hours.
    pub fn minus_hours(&self, hours: i64) -> Self {
        TimeMs(self.0 - hours * MS_PER_HOUR)
    }

    /// Milliseconds from `self` until `until`, clamped at zero.
    pub fn remaining_until(&self, until: TimeMs) -> i64 {
        (until.0 - self.0).max(0)
    }
}

/// One of the two independent game-economy domains.
///
/// Spaces share the app shell but have distinct catalogs and stock pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Space {
    /// The potion/drug crafting loop (timed transformations, crate sales).
    Potions,
    /// The crafting/order-fulfillment loop (recipes, orders, laundering).
    Crafting,
}

impl Space {
    pub fn as_str(&self) -> &'static str {
        match self {
            Space::Potions => "potions",
            Space::Crafting => "crafting",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "potions" => Some(Space::Potions),
            "crafting" => Some(Space::Crafting),
            _ => None,
        }
    }
}

impl std::fmt::Display for Space {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(
    /// Account owning the per-user collections.
    UserId
);
id_newtype!(
    /// Catalog recipe / transformation identifier.
    RecipeId
);
id_newtype!(
    /// Raw-material identifier.
    MaterialId
);
id_newtype!(
    /// Sellable crate identifier.
    CrateId
);
id_newtype!(
    /// Order-recipient group identifier.
    GroupId
);
