use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(RestaurantId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cuisine {
    #[default]
    Italian,
    Mexican,
    Japanese,
    American,
    Indian,
    Thai,
}

impl Cuisine {
    pub const ALL: [Cuisine; 6] = [
        Cuisine::Italian,
        Cuisine::Mexican,
        Cuisine::Japanese,
        Cuisine::American,
        Cuisine::Indian,
        Cuisine::Thai,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Cuisine::Italian => "Italian",
            Cuisine::Mexican => "Mexican",
            Cuisine::Japanese => "Japanese",
            Cuisine::American => "American",
            Cuisine::Indian => "Indian",
            Cuisine::Thai => "Thai",
        }
    }
}

impl fmt::Display for Cuisine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cuisine '{0}'")]
pub struct UnknownCuisine(pub String);

impl FromStr for Cuisine {
    type Err = UnknownCuisine;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Cuisine::ALL
            .into_iter()
            .find(|cuisine| cuisine.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownCuisine(trimmed.to_string()))
    }
}

/// The signed-in owner. The session credential itself stays inside the
/// backend client and never appears here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoVariant {
    pub url: String,
}

/// Opaque bundle of image URLs keyed by size variant (`thumbnail`, `large`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Photo(pub BTreeMap<String, PhotoVariant>);

impl Photo {
    pub fn variant(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|variant| variant.url.as_str())
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.variant("thumbnail")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantRecord {
    pub id: RestaurantId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub cuisine: Cuisine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Photo>,
    pub owner_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Create-form payload before the owner is attached.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RestaurantDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cuisine: Cuisine,
}

impl RestaurantDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_cuisine(mut self, cuisine: Cuisine) -> Self {
        self.cuisine = cuisine;
        self
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}
