//! Core engram type definitions.
//!
//! Defines [`EngramType`] (the three kinds of stored experience), [`Engram`]
//! (a validated, stored unit), [`EngramInput`] (what callers hand to
//! `remember`) and [`RecallMode`] (retrieval breadth tuning).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Strength assigned when the caller does not supply one.
pub const DEFAULT_STRENGTH: f64 = 0.8;

/// The three kinds of engram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EngramType {
    /// A discrete fact or entity ("Redis default port is 6379").
    Atomic,
    /// A relationship between concepts.
    Link,
    /// A recurring process or method.
    Pattern,
}

impl EngramType {
    pub const ALL: [EngramType; 3] = [Self::Atomic, Self::Link, Self::Pattern];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Atomic => "ATOMIC",
            Self::Link => "LINK",
            Self::Pattern => "PATTERN",
        }
    }
}

impl std::fmt::Display for EngramType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EngramType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ATOMIC" => Ok(Self::Atomic),
            "LINK" => Ok(Self::Link),
            "PATTERN" => Ok(Self::Pattern),
            _ => Err(format!("unknown engram type: {s} (expected ATOMIC, LINK or PATTERN)")),
        }
    }
}

/// Retrieval breadth for a recall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecallMode {
    /// Broad association: looser matching, many-keyword activation first.
    Creative,
    /// Substring cue matching ranked by strength then recency.
    #[default]
    Balanced,
    /// Precise lookup: exact cue matches, frequently recalled engrams first.
    Focused,
}

impl RecallMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creative => "creative",
            Self::Balanced => "balanced",
            Self::Focused => "focused",
        }
    }
}

impl std::fmt::Display for RecallMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecallMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "creative" => Ok(Self::Creative),
            "balanced" => Ok(Self::Balanced),
            "focused" => Ok(Self::Focused),
            _ => Err(format!("unknown recall mode: {s} (expected creative, balanced or focused)")),
        }
    }
}

/// One stored unit of experience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engram {
    /// Unique within a role's store. UUID v7 unless the caller chose one.
    pub id: String,
    /// Raw text of the experience. Never empty.
    pub content: String,
    /// Optional mind-map outline of the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(rename = "type")]
    pub engram_type: EngramType,
    /// Retrieval priority in `[0.0, 1.0]`.
    pub strength: f64,
    /// Creation time; only used as a ranking tie-breaker.
    pub timestamp: DateTime<Utc>,
}

impl Engram {
    /// Check the invariants every stored engram must hold.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_id(&self.id)?;
        validate_content(&self.content)?;
        validate_strength(self.strength)
    }
}

/// Caller-supplied engram, not yet validated.
///
/// `engram_type` stays a string so unknown types surface as a
/// [`ValidationError`] rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngramInput {
    #[serde(default)]
    pub id: Option<String>,
    pub content: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub strength: Option<f64>,
    #[serde(rename = "type")]
    pub engram_type: String,
}

impl EngramInput {
    pub fn new(content: impl Into<String>, engram_type: EngramType) -> Self {
        Self {
            content: content.into(),
            engram_type: engram_type.as_str().to_string(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength);
        self
    }

    /// Validate and stamp the input, producing a storable [`Engram`].
    pub fn into_engram(self) -> Result<Engram, ValidationError> {
        let engram_type: EngramType = self
            .engram_type
            .parse()
            .map_err(|e: String| ValidationError::new("type", e))?;

        let id = match self.id {
            Some(id) => id,
            None => uuid::Uuid::now_v7().to_string(),
        };

        let schema = self.schema.filter(|s| !s.trim().is_empty());

        let engram = Engram {
            id,
            content: self.content,
            schema,
            engram_type,
            strength: self.strength.unwrap_or(DEFAULT_STRENGTH),
            timestamp: Utc::now(),
        };
        engram.validate()?;
        Ok(engram)
    }
}

fn validate_id(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::new("id", "id must not be empty"));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::new("content", "content must not be empty"));
    }
    Ok(())
}

fn validate_strength(strength: f64) -> Result<(), ValidationError> {
    if !(0.0..=1.0).contains(&strength) {
        return Err(ValidationError::new(
            "strength",
            format!("strength must be between 0.0 and 1.0, got {strength}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engram_type_parses_case_insensitively() {
        assert_eq!("ATOMIC".parse::<EngramType>().unwrap(), EngramType::Atomic);
        assert_eq!("link".parse::<EngramType>().unwrap(), EngramType::Link);
        assert_eq!(" Pattern ".parse::<EngramType>().unwrap(), EngramType::Pattern);
        assert!("EPISODIC".parse::<EngramType>().is_err());
    }

    #[test]
    fn engram_type_serializes_uppercase() {
        let json = serde_json::to_string(&EngramType::Pattern).unwrap();
        assert_eq!(json, "\"PATTERN\"");
    }

    #[test]
    fn recall_mode_defaults_to_balanced() {
        assert_eq!(RecallMode::default(), RecallMode::Balanced);
        assert_eq!("FOCUSED".parse::<RecallMode>().unwrap(), RecallMode::Focused);
        assert!("wide".parse::<RecallMode>().is_err());
    }

    #[test]
    fn input_defaults_strength_and_assigns_id() {
        let engram = EngramInput::new("Redis default port is 6379", EngramType::Atomic)
            .into_engram()
            .unwrap();
        assert_eq!(engram.strength, DEFAULT_STRENGTH);
        assert!(!engram.id.is_empty());
        assert!(engram.schema.is_none());
    }

    #[test]
    fn input_keeps_caller_id() {
        let engram = EngramInput::new("fact", EngramType::Link)
            .with_id("fixed-id")
            .into_engram()
            .unwrap();
        assert_eq!(engram.id, "fixed-id");
    }

    #[test]
    fn strength_boundaries() {
        for ok in [0.0, 1.0, 0.5] {
            assert!(EngramInput::new("x y", EngramType::Atomic)
                .with_strength(ok)
                .into_engram()
                .is_ok());
        }
        for bad in [1.2, -0.1, f64::NAN, f64::INFINITY] {
            let err = EngramInput::new("x y", EngramType::Atomic)
                .with_strength(bad)
                .into_engram()
                .unwrap_err();
            assert_eq!(err.field, "strength");
        }
    }

    #[test]
    fn empty_content_is_rejected() {
        let err = EngramInput::new("   ", EngramType::Atomic)
            .into_engram()
            .unwrap_err();
        assert_eq!(err.field, "content");
    }

    #[test]
    fn unknown_type_is_rejected() {
        let input = EngramInput {
            content: "something".into(),
            engram_type: "EPISODIC".into(),
            ..Default::default()
        };
        let err = input.into_engram().unwrap_err();
        assert_eq!(err.field, "type");
    }

    #[test]
    fn blank_schema_is_dropped() {
        let engram = EngramInput::new("content", EngramType::Atomic)
            .with_schema("  \n ")
            .into_engram()
            .unwrap();
        assert!(engram.schema.is_none());
    }

    #[test]
    fn input_deserializes_from_tool_json() {
        let input: EngramInput = serde_json::from_str(
            r#"{"content":"Login then pay","schema":"login pay","strength":0.7,"type":"PATTERN"}"#,
        )
        .unwrap();
        let engram = input.into_engram().unwrap();
        assert_eq!(engram.engram_type, EngramType::Pattern);
        assert_eq!(engram.strength, 0.7);
        assert_eq!(engram.schema.as_deref(), Some("login pay"));
    }
}
