//! Event categories and priorities.
//!
//! Event types form a closed set; every type maps to a fixed color and icon
//! used by the calendar views. Unknown type names fall back to `Other`.

use serde::{Deserialize, Serialize};

/// Category of a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Work,
    Study,
    Hobby,
    Health,
    Social,
    Personal,
    Meeting,
    #[default]
    #[serde(other)]
    Other,
}

impl EventType {
    pub const ALL: [EventType; 8] = [
        EventType::Work,
        EventType::Study,
        EventType::Hobby,
        EventType::Health,
        EventType::Social,
        EventType::Personal,
        EventType::Meeting,
        EventType::Other,
    ];

    /// Parse a stored type name. Unrecognised names map to `Other`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "work" => EventType::Work,
            "study" => EventType::Study,
            "hobby" => EventType::Hobby,
            "health" | "exercise" => EventType::Health,
            "social" => EventType::Social,
            "personal" => EventType::Personal,
            "meeting" => EventType::Meeting,
            _ => EventType::Other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EventType::Work => "work",
            EventType::Study => "study",
            EventType::Hobby => "hobby",
            EventType::Health => "health",
            EventType::Social => "social",
            EventType::Personal => "personal",
            EventType::Meeting => "meeting",
            EventType::Other => "other",
        }
    }

    /// Hex color used to fill events of this type.
    pub fn color(&self) -> &'static str {
        match self {
            EventType::Work => "#3B82F6",
            EventType::Study => "#8B5CF6",
            EventType::Hobby => "#F59E0B",
            EventType::Health => "#10B981",
            EventType::Social => "#EC4899",
            EventType::Personal => "#14B8A6",
            EventType::Meeting => "#6366F1",
            EventType::Other => "#6B7280",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            EventType::Work => "💼",
            EventType::Study => "📚",
            EventType::Hobby => "🎨",
            EventType::Health => "🏃",
            EventType::Social => "🎉",
            EventType::Personal => "🏠",
            EventType::Meeting => "👥",
            EventType::Other => "📌",
        }
    }
}

/// Event priority. `High` events get a louder reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn is_high(&self) -> bool {
        matches!(self, Priority::High)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("work", EventType::Work; "work")]
    #[test_case("Study", EventType::Study; "mixed case")]
    #[test_case(" hobby ", EventType::Hobby; "padded")]
    #[test_case("exercise", EventType::Health; "alias")]
    #[test_case("gardening", EventType::Other; "unknown falls back")]
    #[test_case("", EventType::Other; "empty falls back")]
    fn test_from_name(input: &str, expected: EventType) {
        assert_eq!(EventType::from_name(input), expected);
    }

    #[test]
    fn test_name_round_trip() {
        for event_type in EventType::ALL {
            assert_eq!(EventType::from_name(event_type.name()), event_type);
        }
    }

    #[test]
    fn test_colors_are_hex() {
        for event_type in EventType::ALL {
            let color = event_type.color();
            assert!(color.starts_with('#'));
            assert_eq!(color.len(), 7);
        }
    }

    #[test]
    fn test_unknown_type_deserializes_to_other() {
        let parsed: EventType = serde_json::from_str("\"gardening\"").unwrap();
        assert_eq!(parsed, EventType::Other);
        let parsed: EventType = serde_json::from_str("\"work\"").unwrap();
        assert_eq!(parsed, EventType::Work);
    }

    #[test]
    fn test_priority_default_is_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert!(Priority::High.is_high());
        assert!(!Priority::Low.is_high());
    }
}
