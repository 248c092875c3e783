use serde::{Deserialize, Serialize};

/// Result returned by the waste classification endpoint.
///
/// `is_verified_waste` implies `is_waste`; the gate checks the verified flag
/// first so a server that violates this still resolves as verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub confidence: f64,

    #[serde(default)]
    pub is_waste: bool,

    #[serde(default)]
    pub is_verified_waste: bool,
}

impl ClassificationResult {
    /// Confidence rendered as a percentage with one decimal, e.g. `62.0%`.
    pub fn confidence_percent(&self) -> String {
        format_confidence(self.confidence)
    }
}

/// Format a 0..1 confidence value as a percentage with one decimal.
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{"label":"plastic bottle","confidence":0.91,"isWaste":true,"isVerifiedWaste":true}"#;
        let result: ClassificationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.label, "plastic bottle");
        assert!(result.is_waste);
        assert!(result.is_verified_waste);
    }

    #[test]
    fn test_missing_flags_default_to_false() {
        let result: ClassificationResult = serde_json::from_str(r#"{"label":"cat"}"#).unwrap();
        assert!(!result.is_waste);
        assert!(!result.is_verified_waste);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_confidence_percent() {
        assert_eq!(format_confidence(0.62), "62.0%");
        assert_eq!(format_confidence(0.3), "30.0%");
        assert_eq!(format_confidence(0.0), "0.0%");
        assert_eq!(format_confidence(0.5), "50.0%");
    }
}
