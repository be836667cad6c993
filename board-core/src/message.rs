//! # Wire Protocol
//!
//! Messages exchanged between participants through the relay. Every message
//! is a JSON text frame tagged by `type`:
//!
//! - `{"type": "beginPath", "x": 10, "y": 20}`
//! - `{"type": "draw", "x": 11, "y": 21, "color": "#ff0000", "thickness": 5}`
//! - `{"type": "clear"}`
//! - `{"type": "undo", "image": "data:image/png;base64,..."}`
//! - `{"type": "redo", "image": "data:image/png;base64,..."}`
//!
//! The relay never looks inside these frames; only engines interpret them.

use serde::{Deserialize, Serialize};

use crate::{Color, Point, Snapshot, StrokeStyle};

/// A message broadcast between participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BoardMessage {
    /// Start a new path at a point.
    BeginPath {
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
    },
    /// Extend the current path, carrying the sender's full style.
    Draw {
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
        /// Sender's stroke color.
        color: Color,
        /// Sender's stroke thickness.
        thickness: f32,
    },
    /// Clear the visible surface.
    Clear,
    /// Surface state after the sender's undo.
    Undo {
        /// Encoded snapshot to render. May be absent on the wire.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<Snapshot>,
    },
    /// Surface state after the sender's redo.
    Redo {
        /// Encoded snapshot to render. May be absent on the wire.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<Snapshot>,
    },
}

impl BoardMessage {
    /// Build a `beginPath` message.
    #[must_use]
    pub fn begin_path(point: Point) -> Self {
        Self::BeginPath {
            x: point.x,
            y: point.y,
        }
    }

    /// Build a `draw` message.
    #[must_use]
    pub fn draw(point: Point, style: StrokeStyle) -> Self {
        Self::Draw {
            x: point.x,
            y: point.y,
            color: style.color,
            thickness: style.thickness,
        }
    }

    /// Build an `undo` message carrying the snapshot to render.
    #[must_use]
    pub fn undo(snapshot: Snapshot) -> Self {
        Self::Undo {
            image: Some(snapshot),
        }
    }

    /// Build a `redo` message carrying the snapshot to render.
    #[must_use]
    pub fn redo(snapshot: Snapshot) -> Self {
        Self::Redo {
            image: Some(snapshot),
        }
    }

    /// The wire name of this message kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BeginPath { .. } => "beginPath",
            Self::Draw { .. } => "draw",
            Self::Clear => "clear",
            Self::Undo { .. } => "undo",
            Self::Redo { .. } => "redo",
        }
    }

    /// Serialize to a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is not a known message or a field is
    /// invalid (for example a malformed color).
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_begin_path_wire_shape() {
        let msg = BoardMessage::begin_path(Point::new(10.0, 20.5));
        let value = serde_json::to_value(&msg).expect("should serialize");
        assert_eq!(value, json!({"type": "beginPath", "x": 10.0, "y": 20.5}));
    }

    #[test]
    fn test_draw_wire_shape() {
        let msg = BoardMessage::draw(
            Point::new(1.0, 2.0),
            StrokeStyle::new(Color::rgb(255, 0, 0), 5.0),
        );
        let value = serde_json::to_value(&msg).expect("should serialize");
        assert_eq!(
            value,
            json!({"type": "draw", "x": 1.0, "y": 2.0, "color": "#ff0000", "thickness": 5.0})
        );
    }

    #[test]
    fn test_clear_has_no_payload() {
        assert_eq!(
            BoardMessage::Clear.to_json().expect("should serialize"),
            r#"{"type":"clear"}"#
        );
        let parsed = BoardMessage::from_json(r#"{"type":"clear"}"#).expect("should parse");
        assert_eq!(parsed, BoardMessage::Clear);
    }

    #[test]
    fn test_undo_without_image_parses() {
        let parsed = BoardMessage::from_json(r#"{"type":"undo"}"#).expect("should parse");
        assert_eq!(parsed, BoardMessage::Undo { image: None });

        let parsed = BoardMessage::from_json(r#"{"type":"redo","image":"data:x"}"#)
            .expect("should parse");
        assert_eq!(
            parsed,
            BoardMessage::Redo {
                image: Some(Snapshot::from("data:x"))
            }
        );
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(BoardMessage::from_json(r#"{"type":"erase"}"#).is_err());
        assert!(BoardMessage::from_json("not json").is_err());
    }

    #[test]
    fn test_bad_color_is_rejected() {
        let frame = r#"{"type":"draw","x":1,"y":2,"color":"red","thickness":3}"#;
        assert!(BoardMessage::from_json(frame).is_err());
    }

    #[test]
    fn test_kind_names_match_wire_tags() {
        let messages = [
            BoardMessage::begin_path(Point::default()),
            BoardMessage::draw(Point::default(), StrokeStyle::default()),
            BoardMessage::Clear,
            BoardMessage::undo(Snapshot::from("a")),
            BoardMessage::redo(Snapshot::from("b")),
        ];
        for msg in messages {
            let value = serde_json::to_value(&msg).expect("should serialize");
            assert_eq!(value["type"], msg.kind());
        }
    }
}
