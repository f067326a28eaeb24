//! Leap Motion WebSocket tracking protocol (v6 JSON).
//!
//! The tracking service streams one JSON object per frame. Hands and
//! pointables arrive as sibling arrays; pointables point back at their hand
//! through `handId` and name their finger through `type`
//! (0 = thumb .. 4 = pinky). Besides frames the service sends a version
//! handshake and event objects, which decode to `None`.

use serde::Deserialize;
use serde_json::Value;

use crate::types::{
    FingerType, Frame, Gesture, GestureKind, GestureState, Hand, Pointable, Vector3,
};
use crate::{PilotError, Result};

/// Default endpoint of the local tracking service.
pub const DEFAULT_URL: &str = "ws://127.0.0.1:6437/v6.json";

/// Protocol version this decoder understands.
pub const PROTOCOL_VERSION: u64 = 6;

/// Ask the service to include recognized gestures in frames.
pub fn enable_gestures_message(enabled: bool) -> String {
    serde_json::json!({ "enableGestures": enabled }).to_string()
}

/// Ask the service to keep streaming while the client is unfocused.
pub fn background_message(enabled: bool) -> String {
    serde_json::json!({ "background": enabled }).to_string()
}

#[derive(Deserialize)]
struct RawFrame {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    timestamp: u64,
    #[serde(default)]
    hands: Vec<RawHand>,
    #[serde(default)]
    pointables: Vec<RawPointable>,
    #[serde(default)]
    gestures: Vec<RawGesture>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHand {
    id: Option<i64>,
    palm_position: Option<[f64; 3]>,
    direction: Option<[f64; 3]>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPointable {
    hand_id: Option<i64>,
    #[serde(rename = "type")]
    finger: Option<i64>,
    extended: Option<bool>,
    tip_position: Option<[f64; 3]>,
    direction: Option<[f64; 3]>,
    #[serde(default)]
    tool: bool,
}

#[derive(Deserialize)]
struct RawGesture {
    #[serde(rename = "type")]
    kind: Option<String>,
    state: Option<String>,
    radius: Option<f64>,
    normal: Option<[f64; 3]>,
}

/// Decode one service message. Non-frame messages yield `Ok(None)`.
pub fn decode_message(text: &str) -> Result<Option<Frame>> {
    let value: Value = serde_json::from_str(text)?;
    if !is_frame(&value) {
        if let Some(version) = value.get("version").and_then(Value::as_u64) {
            if version != PROTOCOL_VERSION {
                log::warn!(
                    "Tracking service speaks protocol v{}, expected v{}",
                    version,
                    PROTOCOL_VERSION
                );
            }
        }
        log::trace!("Skipping non-frame message");
        return Ok(None);
    }
    let raw: RawFrame = serde_json::from_value(value)?;
    convert_frame(raw).map(Some)
}

/// Decode a message that must be a frame.
pub fn decode_frame(text: &str) -> Result<Frame> {
    decode_message(text)?.ok_or_else(|| PilotError::missing("hands"))
}

fn is_frame(value: &Value) -> bool {
    value.get("hands").is_some() || value.get("pointables").is_some()
}

fn convert_frame(raw: RawFrame) -> Result<Frame> {
    let mut hands = Vec::with_capacity(raw.hands.len());
    for (i, raw_hand) in raw.hands.iter().enumerate() {
        hands.push(convert_hand(i, raw_hand, &raw.pointables)?);
    }

    let mut gestures = Vec::with_capacity(raw.gestures.len());
    for (i, raw_gesture) in raw.gestures.iter().enumerate() {
        if let Some(gesture) = convert_gesture(i, raw_gesture)? {
            gestures.push(gesture);
        }
    }

    Ok(Frame {
        id: raw.id,
        timestamp_us: raw.timestamp,
        hands,
        gestures,
    })
}

fn convert_hand(index: usize, raw: &RawHand, pointables: &[RawPointable]) -> Result<Hand> {
    let palm_position = raw
        .palm_position
        .ok_or_else(|| PilotError::missing(format!("hands[{}].palmPosition", index)))?;
    let direction = raw
        .direction
        .ok_or_else(|| PilotError::missing(format!("hands[{}].direction", index)))?;

    let hand_id = raw
        .id
        .ok_or_else(|| PilotError::missing(format!("hands[{}].id", index)))?;

    let mut owned = Vec::new();
    for (j, p) in pointables.iter().enumerate() {
        if p.hand_id != Some(hand_id) {
            continue;
        }
        owned.push(convert_pointable(j, p)?);
    }

    let find = |finger: FingerType| owned.iter().find(|p| p.finger == Some(finger)).cloned();
    let thumb = find(FingerType::Thumb);
    let middle_finger = find(FingerType::Middle);
    let pinky = find(FingerType::Pinky);

    Ok(Hand {
        palm_position: palm_position.into(),
        direction: direction.into(),
        pointables: owned,
        thumb,
        middle_finger,
        pinky,
    })
}

fn convert_pointable(index: usize, raw: &RawPointable) -> Result<Pointable> {
    let extended = raw
        .extended
        .ok_or_else(|| PilotError::missing(format!("pointables[{}].extended", index)))?;
    let tip_position = raw
        .tip_position
        .ok_or_else(|| PilotError::missing(format!("pointables[{}].tipPosition", index)))?;
    let direction = raw.direction.map(Vector3::from).unwrap_or_default();
    let finger = if raw.tool {
        None
    } else {
        raw.finger.and_then(FingerType::from_code)
    };

    Ok(Pointable {
        extended,
        tip_position: tip_position.into(),
        direction,
        finger,
    })
}

fn convert_gesture(index: usize, raw: &RawGesture) -> Result<Option<Gesture>> {
    let kind = match raw.kind.as_deref() {
        Some("circle") => GestureKind::Circle,
        Some("swipe") => GestureKind::Swipe,
        Some("keyTap") => GestureKind::KeyTap,
        Some("screenTap") => GestureKind::ScreenTap,
        Some(other) => {
            log::debug!("Skipping unknown gesture type '{}'", other);
            return Ok(None);
        }
        None => return Err(PilotError::missing(format!("gestures[{}].type", index))),
    };
    let state = match raw.state.as_deref() {
        Some("start") => GestureState::Start,
        Some("update") => GestureState::Update,
        Some("stop") => GestureState::Stop,
        _ => return Err(PilotError::missing(format!("gestures[{}].state", index))),
    };

    let (radius, normal) = if kind == GestureKind::Circle {
        let radius = raw
            .radius
            .ok_or_else(|| PilotError::missing(format!("gestures[{}].radius", index)))?;
        let normal = raw
            .normal
            .ok_or_else(|| PilotError::missing(format!("gestures[{}].normal", index)))?;
        (radius, normal.into())
    } else {
        (0.0, Vector3::default())
    };

    Ok(Some(Gesture {
        kind,
        state,
        radius,
        normal,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: &str = r#"{
        "currentFrameRate": 110.3,
        "id": 4410,
        "timestamp": 1596313963,
        "hands": [
            {"id": 7, "type": "right", "palmPosition": [12.5, 181.0, -20.0],
             "direction": [0.1, 0.2, -0.97]}
        ],
        "pointables": [
            {"id": 70, "handId": 7, "type": 0, "extended": true,
             "tipPosition": [-40.0, 170.0, -30.0], "direction": [0.0, 0.0, -1.0], "tool": false},
            {"id": 71, "handId": 7, "type": 1, "extended": true,
             "tipPosition": [-10.0, 230.0, -60.0], "direction": [0.0, 0.0, -1.0], "tool": false},
            {"id": 72, "handId": 7, "type": 2, "extended": false,
             "tipPosition": [5.0, 240.0, -62.0], "direction": [0.0, 0.0, -1.0], "tool": false},
            {"id": 73, "handId": 7, "type": 3, "extended": true,
             "tipPosition": [20.0, 232.0, -58.0], "direction": [0.0, 0.0, -1.0], "tool": false},
            {"id": 74, "handId": 7, "type": 4, "extended": true,
             "tipPosition": [35.0, 215.0, -50.0], "direction": [0.0, 0.0, -1.0], "tool": false},
            {"id": 90, "handId": 8, "type": 0, "extended": true,
             "tipPosition": [0.0, 0.0, 0.0], "direction": [0.0, 0.0, -1.0], "tool": false}
        ],
        "gestures": [
            {"id": 3, "type": "circle", "state": "stop", "radius": 52.5,
             "normal": [0.02, -0.1, -0.99], "handIds": [7], "pointableIds": [71]},
            {"id": 4, "type": "keyTap", "state": "stop", "handIds": [7]}
        ]
    }"#;

    #[test]
    fn test_decode_frame() {
        let frame = decode_frame(FRAME).unwrap();
        assert_eq!(frame.id, 4410);
        assert_eq!(frame.timestamp_us, 1596313963);
        assert_eq!(frame.hands.len(), 1);

        let hand = &frame.hands[0];
        assert_eq!(hand.palm_position, Vector3::new(12.5, 181.0, -20.0));
        assert_eq!(hand.pointables.len(), 5);
        assert_eq!(crate::metrics::extended_finger_count(hand), 4);
        assert_eq!(hand.thumb.as_ref().unwrap().tip_position.y, 170.0);
        assert_eq!(hand.middle_finger.as_ref().unwrap().tip_position.y, 240.0);
        assert_eq!(hand.pinky.as_ref().unwrap().tip_position.x, 35.0);

        assert_eq!(frame.gestures.len(), 2);
        let circle = &frame.gestures[0];
        assert_eq!(circle.kind, GestureKind::Circle);
        assert_eq!(circle.state, GestureState::Stop);
        assert_eq!(circle.radius, 52.5);
        assert!(circle.normal.z < 0.0);
        assert_eq!(frame.gestures[1].kind, GestureKind::KeyTap);
    }

    #[test]
    fn test_handshake_is_not_a_frame() {
        let msg = r#"{"serviceVersion":"2.3.1+33747","version":6}"#;
        assert_eq!(decode_message(msg).unwrap(), None);
        let event = r#"{"event":{"type":"deviceEvent","state":{"attached":true}}}"#;
        assert_eq!(decode_message(event).unwrap(), None);
    }

    #[test]
    fn test_empty_frame() {
        let frame = decode_frame(r#"{"id":1,"timestamp":2,"hands":[],"pointables":[],"gestures":[]}"#)
            .unwrap();
        assert!(frame.hands.is_empty());
        assert!(frame.gestures.is_empty());
    }

    #[test]
    fn test_missing_palm_is_malformed() {
        let msg = r#"{"hands":[{"id":1,"direction":[0,0,-1]}],"pointables":[]}"#;
        match decode_message(msg) {
            Err(PilotError::MalformedInput { field }) => {
                assert_eq!(field, "hands[0].palmPosition")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_hand_without_id_is_malformed() {
        let msg = r#"{"hands":[{"palmPosition":[0,100,0],"direction":[0,0,-1]}],
                      "pointables":[{"handId":1,"type":0,"extended":true,"tipPosition":[0,0,0]}]}"#;
        match decode_message(msg) {
            Err(PilotError::MalformedInput { field }) => assert_eq!(field, "hands[0].id"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_tip_is_malformed() {
        let msg = r#"{"hands":[{"id":1,"palmPosition":[0,100,0],"direction":[0,0,-1]}],
                      "pointables":[{"handId":1,"type":0,"extended":true}]}"#;
        match decode_message(msg) {
            Err(PilotError::MalformedInput { field }) => {
                assert_eq!(field, "pointables[0].tipPosition")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_circle_without_radius_is_malformed() {
        let msg = r#"{"hands":[],"gestures":[{"type":"circle","state":"stop","normal":[0,0,1]}]}"#;
        assert!(matches!(
            decode_message(msg),
            Err(PilotError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_unknown_gesture_skipped() {
        let msg = r#"{"hands":[],"gestures":[{"type":"wave","state":"stop"}]}"#;
        assert!(decode_frame(msg).unwrap().gestures.is_empty());
    }

    #[test]
    fn test_tools_have_no_finger() {
        let msg = r#"{"hands":[{"id":1,"palmPosition":[0,100,0],"direction":[0,0,-1]}],
                      "pointables":[{"handId":1,"type":0,"extended":true,
                                     "tipPosition":[0,0,0],"tool":true}]}"#;
        let frame = decode_frame(msg).unwrap();
        assert_eq!(frame.hands[0].pointables[0].finger, None);
        assert!(frame.hands[0].thumb.is_none());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(decode_message("{not json"), Err(PilotError::Decode(_))));
    }

    #[test]
    fn test_control_messages() {
        assert_eq!(enable_gestures_message(true), r#"{"enableGestures":true}"#);
        assert_eq!(background_message(false), r#"{"background":false}"#);
    }
}
