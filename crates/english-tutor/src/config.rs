//! Configuration
//!
//! Typed settings for the tutoring pipeline, read from the environment
//! (binaries load `.env` first with `dotenvy`).
//!
//! | Variable                | Default                               |
//! |-------------------------|---------------------------------------|
//! | `TUTOR_PLANNER_MODEL`   | `deepseek-r1:8b`                      |
//! | `TUTOR_TUTOR_MODEL`     | `llama3.2:3b`                         |
//! | `TUTOR_FEEDBACK_MODEL`  | `llama3.2:3b`                         |
//! | `TUTOR_CHAT_MODEL`      | `llama3.2:3b`                         |
//! | `SCORING_BACKEND`       | `http` (`http` or `mock`)             |
//! | `SCORING_API_URL`       | `https://api.speechsuper.com/analyze` |
//! | `SCORING_TIMEOUT_SECS`  | `5`                                   |
//! | `TUTOR_ERROR_POLICY`    | `fail_fast` (or `record_and_continue`)|
//! | `TUTOR_CONCURRENCY`     | `1`                                   |
//! | `TUTOR_LESSON_TEMPLATE` | built-in `templates/lesson_example.json` |
//! | `TAVILY_API_KEY`        | unset (web search disabled)           |

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TutorError};

pub const DEFAULT_SCORING_URL: &str = "https://api.speechsuper.com/analyze";
pub const DEFAULT_SCORING_TIMEOUT: Duration = Duration::from_secs(5);

const BUILTIN_LESSON_TEMPLATE: &str = include_str!("../templates/lesson_example.json");

/// Lesson template format this build understands
pub const LESSON_TEMPLATE_VERSION: u32 = 1;

/// Models used by each agent
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelConfig {
    pub planner: String,
    pub tutor: String,
    pub feedback: String,
    pub chat: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            planner: "deepseek-r1:8b".into(),
            tutor: "llama3.2:3b".into(),
            feedback: "llama3.2:3b".into(),
            chat: "llama3.2:3b".into(),
        }
    }
}

/// Which competency scorer to use
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScoringBackend {
    #[default]
    Http,
    /// Static scores, no network
    Mock,
}

impl FromStr for ScoringBackend {
    type Err = TutorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "mock" => Ok(Self::Mock),
            other => Err(TutorError::Config(format!(
                "unknown scoring backend '{other}' (expected 'http' or 'mock')"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoringConfig {
    pub backend: ScoringBackend,
    pub url: String,
    pub timeout: Duration,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            backend: ScoringBackend::Http,
            url: DEFAULT_SCORING_URL.into(),
            timeout: DEFAULT_SCORING_TIMEOUT,
        }
    }
}

/// What the tutor does when a model call fails mid-lesson
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TutorErrorPolicy {
    /// Abort the lesson with the first error
    #[default]
    FailFast,
    /// Log the failed response with its error and carry on
    RecordAndContinue,
}

impl FromStr for TutorErrorPolicy {
    type Err = TutorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_fast" => Ok(Self::FailFast),
            "record_and_continue" => Ok(Self::RecordAndContinue),
            other => Err(TutorError::Config(format!(
                "unknown tutor error policy '{other}' (expected 'fail_fast' or 'record_and_continue')"
            ))),
        }
    }
}

/// Example lesson handed to the planner, versioned so its shape can change
/// without touching the prompt
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LessonTemplate {
    pub version: u32,
    pub lesson: serde_json::Value,
}

impl LessonTemplate {
    /// The template shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_LESSON_TEMPLATE)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| TutorError::Template(format!("{}: {e}", path.display())))?;
        Self::parse(&source)
    }

    pub fn parse(source: &str) -> Result<Self> {
        let template: Self =
            serde_json::from_str(source).map_err(|e| TutorError::Template(e.to_string()))?;

        if template.version != LESSON_TEMPLATE_VERSION {
            return Err(TutorError::Template(format!(
                "unsupported lesson template version {} (expected {LESSON_TEMPLATE_VERSION})",
                template.version
            )));
        }
        if !template.lesson.is_object() {
            return Err(TutorError::Template("'lesson' must be an object".into()));
        }

        Ok(template)
    }

    /// Example payload as it appears in the planning prompt
    pub fn example_json(&self) -> String {
        let example = serde_json::json!({ "lesson": self.lesson });
        serde_json::to_string_pretty(&example).unwrap_or_else(|_| example.to_string())
    }
}

/// Settings for the whole tutoring pipeline
#[derive(Clone, Debug)]
pub struct TutorConfig {
    pub models: ModelConfig,
    pub scoring: ScoringConfig,
    pub error_policy: TutorErrorPolicy,
    /// Tutor calls in flight at once; 1 means strictly sequential
    pub concurrency: usize,
    pub lesson_template: LessonTemplate,
    pub tavily_api_key: Option<String>,
}

impl TutorConfig {
    /// Defaults with the built-in lesson template
    pub fn with_defaults() -> Result<Self> {
        Ok(Self {
            models: ModelConfig::default(),
            scoring: ScoringConfig::default(),
            error_policy: TutorErrorPolicy::default(),
            concurrency: 1,
            lesson_template: LessonTemplate::builtin()?,
            tavily_api_key: None,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::with_defaults()?;

        if let Some(model) = get("TUTOR_PLANNER_MODEL") {
            config.models.planner = model;
        }
        if let Some(model) = get("TUTOR_TUTOR_MODEL") {
            config.models.tutor = model;
        }
        if let Some(model) = get("TUTOR_FEEDBACK_MODEL") {
            config.models.feedback = model;
        }
        if let Some(model) = get("TUTOR_CHAT_MODEL") {
            config.models.chat = model;
        }

        if let Some(backend) = get("SCORING_BACKEND") {
            config.scoring.backend = backend.parse()?;
        }
        if let Some(url) = get("SCORING_API_URL") {
            config.scoring.url = url;
        }
        if let Some(secs) = get("SCORING_TIMEOUT_SECS") {
            let secs: f64 = secs
                .trim()
                .parse()
                .map_err(|_| TutorError::Config(format!("SCORING_TIMEOUT_SECS '{secs}' is not a number")))?;
            config.scoring.timeout = Duration::try_from_secs_f64(secs)
                .ok()
                .filter(|d| !d.is_zero())
                .ok_or_else(|| {
                    TutorError::Config(format!("SCORING_TIMEOUT_SECS must be positive, got {secs}"))
                })?;
        }

        if let Some(policy) = get("TUTOR_ERROR_POLICY") {
            config.error_policy = policy.parse()?;
        }
        if let Some(n) = get("TUTOR_CONCURRENCY") {
            config.concurrency = n
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    TutorError::Config(format!("TUTOR_CONCURRENCY must be a positive integer, got '{n}'"))
                })?;
        }

        if let Some(path) = get("TUTOR_LESSON_TEMPLATE") {
            config.lesson_template = LessonTemplate::from_file(path)?;
        }
        config.tavily_api_key = get("TAVILY_API_KEY");

        Ok(config)
    }
}
