use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::owner::{Owner, OwnerId};

/// The fixed set of derived avatar sizes.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ToSchema,
)]
pub enum VariantName {
    #[serde(rename = "40x40")]
    Small,
    #[default]
    #[serde(rename = "80x80")]
    Medium,
    #[serde(rename = "160x160")]
    Large,
}

impl VariantName {
    pub const ALL: [VariantName; 3] = [VariantName::Small, VariantName::Medium, VariantName::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            VariantName::Small => "40x40",
            VariantName::Medium => "80x80",
            VariantName::Large => "160x160",
        }
    }

    /// Edge length in pixels; every variant is square.
    pub fn size(&self) -> u32 {
        match self {
            VariantName::Small => 40,
            VariantName::Medium => 80,
            VariantName::Large => 160,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.size(), self.size())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown avatar variant: {0} (expected one of 40x40, 80x80, 160x160)")]
pub struct UnknownVariant(pub String);

impl FromStr for VariantName {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VariantName::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

impl Display for VariantName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A stored derived image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VariantRecord {
    pub name: VariantName,
    pub width: u32,
    pub height: u32,
    pub storage_key: String,
    pub url: String,
    pub size_bytes: u64,
}

/// The committed single-file "avatar" collection for one owner.
///
/// A slot is only ever constructed with its full variant set, and it is replaced
/// wholesale (never mutated) when a new avatar is promoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MediaSlot {
    pub owner_id: OwnerId,
    /// Unique per upload; every storage key of this slot lives under it.
    pub generation: Uuid,
    pub original_key: String,
    pub original_url: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub width: u32,
    pub height: u32,
    pub created_at: DateTime<Utc>,
    pub variants: BTreeMap<VariantName, VariantRecord>,
}

impl MediaSlot {
    pub fn variant(&self, name: VariantName) -> Option<&VariantRecord> {
        self.variants.get(&name)
    }

    /// True when every fixed variant is present.
    pub fn is_complete(&self) -> bool {
        VariantName::ALL
            .iter()
            .all(|name| self.variants.contains_key(name))
    }

    /// Every storage key owned by this slot, original first.
    pub fn storage_keys(&self) -> Vec<String> {
        std::iter::once(self.original_key.clone())
            .chain(self.variants.values().map(|v| v.storage_key.clone()))
            .collect()
    }
}

/// What `resolve` hands to the display layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AvatarRef {
    Stored {
        variant: VariantName,
        url: String,
        width: u32,
        height: u32,
    },
    Placeholder {
        url: String,
    },
}

impl AvatarRef {
    pub fn url(&self) -> &str {
        match self {
            AvatarRef::Stored { url, .. } => url,
            AvatarRef::Placeholder { url } => url,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, AvatarRef::Placeholder { .. })
    }
}

/// Owner as rendered by the settings page: the resolved avatar URL plus fallback initials.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvatarView {
    pub owner_id: OwnerId,
    pub name: String,
    pub avatar: String,
    pub initials: String,
    pub has_avatar: bool,
    pub variant: VariantName,
}

impl AvatarView {
    pub fn new(owner: &Owner, variant: VariantName, reference: &AvatarRef) -> Self {
        Self {
            owner_id: owner.id,
            name: owner.name.clone(),
            avatar: reference.url().to_string(),
            initials: owner.initials(),
            has_avatar: !reference.is_placeholder(),
            variant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: VariantName) -> VariantRecord {
        VariantRecord {
            name,
            width: name.size(),
            height: name.size(),
            storage_key: format!("avatars/x/{}.png", name),
            url: format!("http://localhost/media/avatars/x/{}.png", name),
            size_bytes: 10,
        }
    }

    #[test]
    fn test_variant_name_parse() {
        assert_eq!("40x40".parse::<VariantName>().unwrap(), VariantName::Small);
        assert_eq!("80x80".parse::<VariantName>().unwrap(), VariantName::Medium);
        assert_eq!("160x160".parse::<VariantName>().unwrap(), VariantName::Large);
        assert!("100x100".parse::<VariantName>().is_err());
    }

    #[test]
    fn test_variant_name_serde_uses_size_label() {
        let json = serde_json::to_string(&VariantName::Large).unwrap();
        assert_eq!(json, "\"160x160\"");
        let back: VariantName = serde_json::from_str("\"40x40\"").unwrap();
        assert_eq!(back, VariantName::Small);
    }

    #[test]
    fn test_default_variant_is_medium() {
        assert_eq!(VariantName::default().as_str(), crate::constants::DEFAULT_DISPLAY_VARIANT);
    }

    #[test]
    fn test_slot_completeness_and_keys() {
        let mut slot = MediaSlot {
            owner_id: OwnerId::new(),
            generation: Uuid::new_v4(),
            original_key: "avatars/x/original.png".to_string(),
            original_url: "http://localhost/media/avatars/x/original.png".to_string(),
            mime_type: "image/png".to_string(),
            size_bytes: 100,
            width: 80,
            height: 80,
            created_at: Utc::now(),
            variants: BTreeMap::new(),
        };
        assert!(!slot.is_complete());

        for name in VariantName::ALL {
            slot.variants.insert(name, record(name));
        }
        assert!(slot.is_complete());
        assert_eq!(slot.storage_keys().len(), 4);
        assert_eq!(slot.storage_keys()[0], slot.original_key);

        // Manifest round trip keeps the map keyed by size label.
        let json = serde_json::to_value(&slot).unwrap();
        assert!(json["variants"].get("80x80").is_some());
        let back: MediaSlot = serde_json::from_value(json).unwrap();
        assert_eq!(back, slot);
    }

    #[test]
    fn test_avatar_view_from_placeholder() {
        let owner = Owner::new(OwnerId::new(), "Ada Lovelace");
        let reference = AvatarRef::Placeholder {
            url: "https://example.test/?name=Ada".to_string(),
        };
        let view = AvatarView::new(&owner, VariantName::Medium, &reference);
        assert!(!view.has_avatar);
        assert_eq!(view.initials, "AL");
        assert_eq!(view.avatar, "https://example.test/?name=Ada");
    }
}
