//! Post types.
//!
//! The payload shape varies by [`PostKind`]; ownership and visibility do not.
//! A post never stores its owner's privacy flag: [`PostView`] carries the
//! value read from the owner's account at query time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The discriminant of a [`PostContent`] variant, stored in the `kind` column.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::AsRefStr,
  strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PostKind {
  Image,
  Measurement,
  Text,
  Workout,
  Challenge,
}

// ─── Payload ─────────────────────────────────────────────────────────────────

/// One exercise line in a workout post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutItem {
  pub exercise:      String,
  pub sets:          Option<u32>,
  pub reps:          Option<u32>,
  /// Load in kilograms.
  pub weight:        Option<f64>,
  pub duration_secs: Option<u32>,
}

/// The typed payload of a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PostContent {
  Image {
    image_ref: String,
    caption:   Option<String>,
  },
  Measurement {
    /// Body weight in kilograms.
    weight:       Option<f64>,
    /// Free-form measurement line, e.g. "waist 81cm, chest 102cm".
    measurements: Option<String>,
    caption:      Option<String>,
  },
  Text {
    body: String,
  },
  Workout {
    items:   Vec<WorkoutItem>,
    caption: Option<String>,
  },
  /// A periodic check-in against a personal challenge.
  Challenge {
    title:   String,
    day:     u32,
    caption: Option<String>,
  },
}

impl PostContent {
  pub fn kind(&self) -> PostKind {
    match self {
      Self::Image { .. } => PostKind::Image,
      Self::Measurement { .. } => PostKind::Measurement,
      Self::Text { .. } => PostKind::Text,
      Self::Workout { .. } => PostKind::Workout,
      Self::Challenge { .. } => PostKind::Challenge,
    }
  }

  /// Serialise the inner payload (without the type tag) for the
  /// `payload_json` column.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    let full = serde_json::to_value(self)?;
    Ok(full.get("data").cloned().unwrap_or(serde_json::Value::Null))
  }

  /// Rebuild from the stored kind and JSON payload.
  pub fn from_parts(kind: PostKind, data: serde_json::Value) -> Result<Self> {
    let wrapped = serde_json::json!({ "type": kind.as_ref(), "data": data });
    Ok(serde_json::from_value(wrapped)?)
  }

  /// Reject payloads that carry nothing to show.
  pub fn validate(&self) -> Result<()> {
    let problem = match self {
      Self::Image { image_ref, .. } if image_ref.trim().is_empty() => {
        Some("image post without an image reference")
      }
      Self::Measurement { weight: None, measurements: None, .. } => {
        Some("measurement post without a weight or measurements")
      }
      Self::Text { body } if body.trim().is_empty() => Some("empty text post"),
      Self::Workout { items, .. } if items.is_empty() => {
        Some("workout post without any items")
      }
      Self::Challenge { title, .. } if title.trim().is_empty() => {
        Some("challenge post without a title")
      }
      _ => None,
    };
    match problem {
      Some(msg) => Err(Error::InvalidOperation(msg.to_owned())),
      None => Ok(()),
    }
  }
}

// ─── Post ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
  pub post_id:    Uuid,
  pub owner_id:   Uuid,
  pub content:    PostContent,
  pub created_at: DateTime<Utc>,
  pub edited_at:  Option<DateTime<Utc>>,
}

/// A post joined with its owner's privacy flag as of the read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
  #[serde(flatten)]
  pub post:             Post,
  pub owner_is_private: bool,
}

impl PostView {
  pub fn owner_id(&self) -> Uuid { self.post.owner_id }
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub post_id:    Uuid,
  pub author_id:  Uuid,
  pub body:       String,
  pub created_at: DateTime<Utc>,
}
