//! Wire shapes spoken by the Manifest-style REST backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Cuisine, Identity, Photo, RestaurantDraft, RestaurantId, RestaurantRecord, UserId,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<MeResponse> for Identity {
    fn from(value: MeResponse) -> Self {
        let name = value
            .name
            .filter(|name| !name.trim().is_empty())
            .or_else(|| value.email.clone())
            .unwrap_or_else(|| format!("user {}", value.id));
        Self {
            id: value.id,
            name,
            email: value.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub last_page: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl<T> Paginated<T> {
    /// Page counters win when the backend sends them; otherwise a short or
    /// empty page marks the end.
    pub fn is_last_page(&self, per_page: u32) -> bool {
        if self.data.is_empty() {
            return true;
        }
        match (self.current_page, self.last_page) {
            (Some(current), Some(last)) => current >= last,
            _ => self.data.len() < per_page as usize,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerPayload {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantPayload {
    pub id: RestaurantId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cuisine: Cuisine,
    #[serde(default)]
    pub photo: Option<Photo>,
    #[serde(default)]
    pub owner: Option<OwnerPayload>,
    #[serde(default)]
    pub owner_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl RestaurantPayload {
    /// Resolves the owner from the included relation, then the raw foreign
    /// key, then `fallback_owner` when the backend echoed neither.
    pub fn into_record(self, fallback_owner: UserId) -> RestaurantRecord {
        let (owner_id, owner_name) = match self.owner {
            Some(owner) => (owner.id, owner.name),
            None => (self.owner_id.unwrap_or(fallback_owner), None),
        };
        RestaurantRecord {
            id: self.id,
            name: self.name,
            description: self.description.filter(|text| !text.is_empty()),
            cuisine: self.cuisine,
            photo: self.photo.filter(|photo| !photo.0.is_empty()),
            owner_id,
            owner_name,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRestaurantRequest {
    pub name: String,
    pub description: String,
    pub cuisine: Cuisine,
    pub owner: UserId,
}

impl CreateRestaurantRequest {
    pub fn scoped(owner: UserId, draft: &RestaurantDraft) -> Self {
        Self {
            name: draft.name.trim().to_string(),
            description: draft.description.clone(),
            cuisine: draft.cuisine,
            owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restaurant_payload_prefers_included_owner() {
        let payload: RestaurantPayload = serde_json::from_value(serde_json::json!({
            "id": 4,
            "name": "Trattoria",
            "description": "",
            "cuisine": "Italian",
            "photo": { "thumbnail": { "url": "http://cdn/thumb.jpg" } },
            "owner": { "id": 9, "name": "Ada" },
            "createdAt": "2024-03-01T10:00:00.000Z"
        }))
        .expect("payload");

        let record = payload.into_record(UserId(1));
        assert_eq!(record.owner_id, UserId(9));
        assert_eq!(record.owner_name.as_deref(), Some("Ada"));
        assert_eq!(record.description, None);
        assert_eq!(
            record.photo.as_ref().and_then(Photo::thumbnail_url),
            Some("http://cdn/thumb.jpg")
        );
    }

    #[test]
    fn restaurant_payload_falls_back_to_query_owner() {
        let payload: RestaurantPayload = serde_json::from_value(serde_json::json!({
            "id": 5,
            "name": "Taqueria",
            "cuisine": "Mexican",
            "createdAt": "2024-03-01T10:00:00Z"
        }))
        .expect("payload");

        let record = payload.into_record(UserId(3));
        assert_eq!(record.owner_id, UserId(3));
        assert_eq!(record.cuisine, Cuisine::Mexican);
    }

    #[test]
    fn last_page_uses_counters_then_page_length() {
        let page = |data: Vec<u8>, current: Option<u32>, last: Option<u32>| Paginated {
            data,
            current_page: current,
            last_page: last,
            total: None,
        };
        assert!(!page(vec![1, 2], Some(1), Some(2)).is_last_page(2));
        assert!(page(vec![3], Some(2), Some(2)).is_last_page(2));
        assert!(!page(vec![1, 2], None, None).is_last_page(2));
        assert!(page(vec![3], None, None).is_last_page(2));
        assert!(page(Vec::new(), Some(1), Some(4)).is_last_page(2));
    }

    #[test]
    fn me_response_without_name_uses_email() {
        let identity: Identity = MeResponse {
            id: UserId(2),
            name: None,
            email: Some("owner@example.com".into()),
        }
        .into();
        assert_eq!(identity.name, "owner@example.com");
    }

    #[test]
    fn cuisine_parses_case_insensitively() {
        assert_eq!("thai".parse::<Cuisine>(), Ok(Cuisine::Thai));
        assert!("Klingon".parse::<Cuisine>().is_err());
        assert_eq!(RestaurantDraft::default().cuisine, Cuisine::Italian);
    }
}
