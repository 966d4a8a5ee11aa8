//! Domain Models
//!
//! Data that flows through a tutoring session: the student profile, the
//! lesson plan, the performance log and the feedback bundle.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Student profile
// ============================================================================

/// Scalar value stored in a student profile
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ProfileValue {
    /// Convert a JSON scalar; arrays, objects and null are rejected
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float)),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Convert a field reported by the feedback model or the scoring API:
    /// scalars as in [`Self::from_json`], a list of strings joined with `, `
    pub fn from_report(value: &serde_json::Value) -> Option<Self> {
        Self::from_json(value).or_else(|| {
            let items: Vec<&str> = value
                .as_array()?
                .iter()
                .filter_map(serde_json::Value::as_str)
                .collect();
            (!items.is_empty()).then(|| Self::Text(items.join(", ")))
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProfileValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ProfileValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ProfileValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ProfileValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for ProfileValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for ProfileValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for ProfileValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Student profile: `level`, `progress`, `strengths`, `weaknesses`, …
///
/// Keys iterate in sorted order. Only the supervisor produces updated
/// profiles; everyone else reads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentProfile(BTreeMap<String, ProfileValue>);

impl StudentProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ProfileValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ProfileValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub(crate) fn set(&mut self, key: impl Into<String>, value: ProfileValue) {
        self.0.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ProfileValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flat `key: value, key: value` rendering used in prompts
    pub fn to_prompt_string(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<K: Into<String>, V: Into<ProfileValue>> FromIterator<(K, V)> for StudentProfile {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ============================================================================
// Lesson plan
// ============================================================================

/// Lesson plan produced once per session; read-only after creation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LessonPlan {
    text: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    structured: Option<serde_json::Value>,
}

impl LessonPlan {
    /// Build from raw model output. Reasoning traces are dropped and a JSON
    /// object in the remaining text, if any, is kept as the structured form.
    pub fn from_model_output(raw: &str) -> Self {
        let text = strip_reasoning(raw);
        let structured = extract_json_object(&text);
        Self { text, structured }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn structured(&self) -> Option<&serde_json::Value> {
        self.structured.as_ref()
    }

    /// Number of questions in a structured `{"lesson": {"questions": [...]}}` plan
    pub fn question_count(&self) -> Option<usize> {
        self.structured
            .as_ref()?
            .pointer("/lesson/questions")?
            .as_array()
            .map(Vec::len)
    }
}

impl std::fmt::Display for LessonPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Remove `<think>…</think>` blocks emitted by reasoning models
pub(crate) fn strip_reasoning(raw: &str) -> String {
    const OPEN: &str = "<think>";
    const CLOSE: &str = "</think>";

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        match rest[start..].find(CLOSE) {
            Some(end) => rest = &rest[start + end + CLOSE.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Find a JSON object in model output: a fenced ```json block first, then
/// the outermost `{ … }` span, then the last top-level object that parses
/// on its own (prose before it may contain stray braces).
pub(crate) fn extract_json_object(text: &str) -> Option<serde_json::Value> {
    const FENCE: &str = "```json";

    let fenced = text.find(FENCE).and_then(|start| {
        let after = &text[start + FENCE.len()..];
        after
            .find("```")
            .and_then(|end| serde_json::from_str::<serde_json::Value>(after[..end].trim()).ok())
    });

    let value = fenced
        .or_else(|| {
            let start = text.find('{')?;
            let end = text.rfind('}')?;
            if end <= start {
                return None;
            }
            serde_json::from_str::<serde_json::Value>(&text[start..=end]).ok()
        })
        .or_else(|| last_json_object(text))?;

    value.is_object().then_some(value)
}

fn last_json_object(text: &str) -> Option<serde_json::Value> {
    let mut found = None;
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('{') {
        let start = pos + offset;
        let mut values =
            serde_json::Deserializer::from_str(&text[start..]).into_iter::<serde_json::Value>();
        match values.next() {
            Some(Ok(value)) => {
                // Skip the parsed span so nested objects are not picked up
                pos = start + values.byte_offset();
                found = Some(value);
            }
            _ => pos = start + 1,
        }
    }

    found
}

// ============================================================================
// Performance log
// ============================================================================

/// One student response and the tutor's answer to it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceLogEntry {
    pub student_response: String,
    pub tutor_feedback: String,

    /// Set when the tutor call failed and the lesson carried on
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl PerformanceLogEntry {
    pub fn new(student_response: impl Into<String>, tutor_feedback: impl Into<String>) -> Self {
        Self {
            student_response: student_response.into(),
            tutor_feedback: tutor_feedback.into(),
            error: None,
        }
    }

    pub fn failed(student_response: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            student_response: student_response.into(),
            tutor_feedback: String::new(),
            error: Some(error.into()),
        }
    }

    pub const fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Ordered record of a lesson, one entry per student response
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerformanceLog(Vec<PerformanceLogEntry>);

impl PerformanceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: PerformanceLogEntry) {
        self.0.push(entry);
    }

    pub fn entries(&self) -> &[PerformanceLogEntry] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PerformanceLogEntry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.0.iter().filter(|e| e.is_failed()).count()
    }

    /// Entries rendered as `Response: …\nFeedback: …`, joined by newlines
    /// in lesson order. An empty log yields an empty string.
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|e| {
                format!(
                    "Response: {}\nFeedback: {}",
                    e.student_response, e.tutor_feedback
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl FromIterator<PerformanceLogEntry> for PerformanceLog {
    fn from_iter<I: IntoIterator<Item = PerformanceLogEntry>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PerformanceLog {
    type Item = &'a PerformanceLogEntry;
    type IntoIter = std::slice::Iter<'a, PerformanceLogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// Feedback
// ============================================================================

/// A failed scoring call, carried as data
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringApiError {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status_code: Option<u16>,
}

impl ScoringApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status_code: None,
        }
    }

    pub fn with_status(error: impl Into<String>, status_code: u16) -> Self {
        Self {
            error: error.into(),
            status_code: Some(status_code),
        }
    }
}

/// Scores returned by the competency-scoring API, or why there are none
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompetencyScores {
    Failed(ScoringApiError),
    Scores(serde_json::Value),
}

impl CompetencyScores {
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub const fn error(&self) -> Option<&ScoringApiError> {
        match self {
            Self::Failed(e) => Some(e),
            Self::Scores(_) => None,
        }
    }

    pub const fn scores(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Scores(v) => Some(v),
            Self::Failed(_) => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.error().and_then(|e| e.status_code)
    }
}

/// Result of the feedback stage
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResult {
    pub detailed_feedback: String,

    pub competency_scores: CompetencyScores,

    /// Profile fields the feedback model reported (`strengths`,
    /// `weaknesses`, `progress`)
    #[serde(default)]
    pub profile_updates: BTreeMap<String, ProfileValue>,
}

impl FeedbackResult {
    /// Value for a profile field: the model's reported update first, then a
    /// scalar of the same name in the competency scores.
    pub fn field(&self, key: &str) -> Option<ProfileValue> {
        self.profile_updates.get(key).cloned().or_else(|| {
            self.competency_scores
                .scores()
                .and_then(|scores| scores.get(key))
                .and_then(ProfileValue::from_report)
        })
    }
}

// ============================================================================
// Session result
// ============================================================================

/// Everything a completed session produced
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub session_id: Uuid,
    pub lesson_plan: LessonPlan,
    pub performance_logs: PerformanceLog,
    pub feedback: FeedbackResult,
    pub updated_profile: StudentProfile,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SessionResult {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_prompt_string_is_sorted() {
        let profile = StudentProfile::new()
            .with("weaknesses", "Pronunciation")
            .with("level", "Intermediate")
            .with("progress", 50)
            .with("strengths", "Vocabulary");

        assert_eq!(
            profile.to_prompt_string(),
            "level: Intermediate, progress: 50, strengths: Vocabulary, weaknesses: Pronunciation"
        );
    }

    #[test]
    fn test_profile_json_shape() {
        let profile: StudentProfile =
            serde_json::from_value(json!({"level": "B1", "progress": 50, "score": 7.5, "active": true}))
                .unwrap();

        assert_eq!(profile.get("level"), Some(&ProfileValue::Text("B1".into())));
        assert_eq!(profile.get("progress"), Some(&ProfileValue::Integer(50)));
        assert_eq!(profile.get("score"), Some(&ProfileValue::Float(7.5)));
        assert_eq!(profile.get("active"), Some(&ProfileValue::Bool(true)));
        assert_eq!(
            serde_json::to_value(&profile).unwrap(),
            json!({"active": true, "level": "B1", "progress": 50, "score": 7.5})
        );
    }

    #[test]
    fn test_profile_rejects_nested_values() {
        let result = serde_json::from_value::<StudentProfile>(json!({"level": {"cefr": "B1"}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_lesson_plan_strips_reasoning_and_finds_json() {
        let raw = r#"<think>The student is intermediate...</think>
Here is the plan:
```json
{"lesson": {"context": "Mission", "questions": [{"question": "Q1"}, {"question": "Q2"}]}}
```"#;

        let plan = LessonPlan::from_model_output(raw);
        assert!(!plan.text().contains("<think>"));
        assert!(plan.text().starts_with("Here is the plan:"));
        assert_eq!(plan.question_count(), Some(2));
    }

    #[test]
    fn test_free_text_lesson_plan() {
        let plan = LessonPlan::from_model_output("Practice the past simple tense.");
        assert_eq!(plan.text(), "Practice the past simple tense.");
        assert!(plan.structured().is_none());
        assert_eq!(plan.question_count(), None);
    }

    #[test]
    fn test_unterminated_reasoning_is_dropped() {
        assert_eq!(strip_reasoning("Plan A <think>still thinking"), "Plan A");
    }

    #[test]
    fn test_extract_json_ignores_non_objects() {
        assert!(extract_json_object("scores: [1, 2, 3]").is_none());
        assert_eq!(
            extract_json_object(r#"Summary... {"progress": 60}"#),
            Some(json!({"progress": 60}))
        );
    }

    #[test]
    fn test_extract_json_after_stray_braces() {
        let text = "Scores so far: {pronunciation: 7/10}. Keep practising.\n{\"strengths\": \"Vocabulary\", \"weaknesses\": \"Articles\", \"progress\": 60}";
        assert_eq!(
            extract_json_object(text),
            Some(json!({"strengths": "Vocabulary", "weaknesses": "Articles", "progress": 60}))
        );
    }

    #[test]
    fn test_extract_json_takes_last_top_level_object() {
        let text = r#"Earlier: {"progress": 10}. Note {this}. Final: {"progress": 70, "detail": {"fluency": 80}} done"#;
        assert_eq!(
            extract_json_object(text),
            Some(json!({"progress": 70, "detail": {"fluency": 80}}))
        );
        assert!(extract_json_object("{not json} and {neither}").is_none());
    }

    #[test]
    fn test_log_summary_order_and_empty() {
        assert_eq!(PerformanceLog::new().summary(), "");

        let log: PerformanceLog = vec![
            PerformanceLogEntry::new("I am going to the store.", "Good."),
            PerformanceLogEntry::new("Yesterday I read an article.", "Well done."),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            log.summary(),
            "Response: I am going to the store.\nFeedback: Good.\nResponse: Yesterday I read an article.\nFeedback: Well done."
        );
    }

    #[test]
    fn test_scoring_error_shape() {
        let scores = CompetencyScores::Failed(ScoringApiError::with_status("Speechsuper API error", 500));
        assert_eq!(
            serde_json::to_value(&scores).unwrap(),
            json!({"error": "Speechsuper API error", "status_code": 500})
        );

        let transport = CompetencyScores::Failed(ScoringApiError::new("connection refused"));
        assert_eq!(
            serde_json::to_value(&transport).unwrap(),
            json!({"error": "connection refused"})
        );
    }

    #[test]
    fn test_feedback_field_lookup_order() {
        let mut profile_updates = BTreeMap::new();
        profile_updates.insert("progress".to_string(), ProfileValue::Integer(65));

        let feedback = FeedbackResult {
            detailed_feedback: "Nice work.".into(),
            competency_scores: CompetencyScores::Scores(json!({
                "progress": 10,
                "weaknesses": "Stress patterns",
                "details": {"fluency": 80}
            })),
            profile_updates,
        };

        assert_eq!(feedback.field("progress"), Some(ProfileValue::Integer(65)));
        assert_eq!(
            feedback.field("weaknesses"),
            Some(ProfileValue::Text("Stress patterns".into()))
        );
        assert_eq!(feedback.field("details"), None);
        assert_eq!(feedback.field("strengths"), None);
    }

    #[test]
    fn test_feedback_field_joins_score_lists() {
        let feedback = FeedbackResult {
            detailed_feedback: "Nice work.".into(),
            competency_scores: CompetencyScores::Scores(json!({
                "strengths": ["Vocabulary", "Listening"],
                "weaknesses": [1, 2]
            })),
            profile_updates: BTreeMap::new(),
        };

        assert_eq!(
            feedback.field("strengths"),
            Some(ProfileValue::Text("Vocabulary, Listening".into()))
        );
        assert_eq!(feedback.field("weaknesses"), None);
    }
}
