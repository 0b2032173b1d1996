use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{BoardError, BoardResult};

/// `#` optional, then 3, 4, 6 or 8 hex digits.
static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#?([0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .expect("hex color pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub column_id: String,
    pub position: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A column row without its cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRecord {
    pub id: String,
    pub title: String,
    pub position: i64,
}

/// A column together with its cards, ordered by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub title: String,
    pub position: i64,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Column {
    pub fn from_record(record: ColumnRecord, cards: Vec<Card>) -> Self {
        Self {
            id: record.id,
            title: record.title,
            position: record.position,
            cards,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub columns: Vec<Column>,
}

/// One entry of a bulk reposition request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: String,
    pub position: i64,
}

/// Cross-column move request. `from_column_id` is the caller's belief about
/// where the card currently lives; a mismatch is a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMove {
    pub from_column_id: String,
    pub to_column_id: String,
    pub position: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardUpdate {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Trim and reject empty titles.
pub fn validate_title(title: &str) -> BoardResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(BoardError::validation("title must not be empty"));
    }
    Ok(trimmed.to_string())
}

pub fn validate_color(color: &str) -> BoardResult<()> {
    if HEX_COLOR.is_match(color) {
        Ok(())
    } else {
        Err(BoardError::validation(format!(
            "color '{}' is not a hex color",
            color
        )))
    }
}

/// Largest position a client may submit; the GraphQL `Int` range.
pub const MAX_POSITION: i64 = i32::MAX as i64;

pub fn validate_position(position: i64) -> BoardResult<()> {
    if !(0..=MAX_POSITION).contains(&position) {
        return Err(BoardError::validation(format!(
            "position must be in 0..={}, got {}",
            MAX_POSITION, position
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_card() -> Card {
        Card {
            id: "c1".into(),
            title: "Write docs".into(),
            description: "README".into(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            column_id: "col".into(),
            position: 0,
            color: Some("#ff8800".into()),
        }
    }

    #[test]
    fn card_serializes_camel_case() {
        let json = serde_json::to_value(sample_card()).unwrap();
        assert_eq!(json["columnId"], "col");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("column_id").is_none());
    }

    #[test]
    fn card_without_color_omits_field() {
        let mut card = sample_card();
        card.color = None;
        let json = serde_json::to_value(card).unwrap();
        assert!(json.get("color").is_none());
    }

    #[test]
    fn board_round_trip_is_stable() {
        let board = Board {
            columns: vec![Column {
                id: "col".into(),
                title: "Todo".into(),
                position: 0,
                cards: vec![sample_card()],
            }],
        };
        let first = serde_json::to_string(&board).unwrap();
        let parsed: Board = serde_json::from_str(&first).unwrap();
        let second = serde_json::to_string(&parsed).unwrap();
        assert_eq!(parsed, board);
        assert_eq!(first, second);
    }

    #[test]
    fn title_is_trimmed_and_required() {
        assert_eq!(validate_title("  Todo ").unwrap(), "Todo");
        assert!(matches!(
            validate_title("   "),
            Err(BoardError::Validation(_))
        ));
    }

    #[test]
    fn hex_colors() {
        for ok in ["#fff", "fff", "#FFAA00", "#ffaa0080", "#abcd"] {
            assert!(validate_color(ok).is_ok(), "{} should be valid", ok);
        }
        for bad in ["", "#ff", "red", "#gggggg", "#12345"] {
            assert!(validate_color(bad).is_err(), "{} should be invalid", bad);
        }
    }

    #[test]
    fn positions_are_bounded() {
        assert!(validate_position(0).is_ok());
        assert!(validate_position(MAX_POSITION).is_ok());
        assert!(validate_position(-1).is_err());
        assert!(validate_position(MAX_POSITION + 1).is_err());
        assert!(validate_position(i64::MAX).is_err());
    }
}
