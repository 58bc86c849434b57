//! Generative-AI estimation of meals and workouts.
//!
//! [`Estimator`] is the seam between the engines and the network. The
//! Gemini-backed implementation returns `Err` on any failure (missing key,
//! transport, API status, malformed output); the `*_or_default` helpers turn
//! that into the documented fallback so a user action never fails because the
//! service is unavailable.

use crate::config::AiConfig;
use crate::{Error, Exercise, ExerciseKind, ExerciseType, Macros, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Structured estimate for a free-text food description
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoodEstimate {
    pub name: String,
    pub macros: Macros,
}

impl FoodEstimate {
    /// The description itself with zero macros
    pub fn fallback(description: &str) -> Self {
        Self {
            name: description.to_string(),
            macros: Macros::default(),
        }
    }
}

/// A generated workout: session name plus exercises
#[derive(Clone, Debug, PartialEq)]
pub struct WorkoutPlan {
    pub name: String,
    pub exercises: Vec<Exercise>,
}

impl WorkoutPlan {
    pub fn fallback(kind: ExerciseType) -> Self {
        let name = match kind {
            ExerciseType::Strength => "Custom Workout",
            ExerciseType::Cardio => "Custom Cardio",
        };
        Self {
            name: name.into(),
            exercises: Vec::new(),
        }
    }
}

pub trait Estimator {
    fn estimate_nutrition(&self, description: &str) -> Result<FoodEstimate>;

    fn generate_workout_plan(&self, request: &str, kind: ExerciseType) -> Result<WorkoutPlan>;
}

/// Estimator used when no client can be built; every call fails with `reason`
#[derive(Clone, Debug)]
pub struct Unavailable(pub String);

impl Estimator for Unavailable {
    fn estimate_nutrition(&self, _description: &str) -> Result<FoodEstimate> {
        Err(Error::Config(self.0.clone()))
    }

    fn generate_workout_plan(&self, _request: &str, _kind: ExerciseType) -> Result<WorkoutPlan> {
        Err(Error::Config(self.0.clone()))
    }
}

/// Gemini client from config, or [`Unavailable`] when disabled or unkeyed
pub fn estimator_from_config(config: &AiConfig) -> Box<dyn Estimator> {
    match GeminiClient::from_config(config) {
        Ok(client) => Box::new(client),
        Err(e) => {
            tracing::info!("AI estimation unavailable: {}", e);
            Box::new(Unavailable(e.to_string()))
        }
    }
}

pub fn estimate_nutrition_or_default<E: Estimator + ?Sized>(
    estimator: &E,
    description: &str,
) -> FoodEstimate {
    match estimator.estimate_nutrition(description) {
        Ok(estimate) => estimate,
        Err(e) => {
            tracing::warn!("Nutrition estimate failed, using fallback: {}", e);
            FoodEstimate::fallback(description)
        }
    }
}

pub fn generate_workout_or_default<E: Estimator + ?Sized>(
    estimator: &E,
    request: &str,
    kind: ExerciseType,
) -> WorkoutPlan {
    match estimator.generate_workout_plan(request, kind) {
        Ok(plan) => plan,
        Err(e) => {
            tracing::warn!("Workout generation failed, using fallback: {}", e);
            WorkoutPlan::fallback(kind)
        }
    }
}

// ============================================================================
// Gemini wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

static FOOD_SCHEMA: Lazy<Value> = Lazy::new(|| {
    let number = json!({ "type": "NUMBER" });
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING", "description": "A short, clean name for the food item" },
            "macros": {
                "type": "OBJECT",
                "properties": {
                    "calories": number, "protein": number, "carbs": number, "fat": number,
                    "fiber": number, "potassium": number, "sodium": number
                },
                "required": ["calories", "protein", "carbs", "fat", "fiber", "potassium", "sodium"]
            }
        },
        "required": ["name", "macros"]
    })
});

static WORKOUT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING", "description": "Name of the workout session" },
            "exercises": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "sets": { "type": "NUMBER", "description": "For strength exercises" },
                        "reps": { "type": "STRING", "description": "For strength exercises" },
                        "weight": { "type": "NUMBER", "description": "Estimated weight in kg" },
                        "duration": { "type": "NUMBER", "description": "For cardio: duration in minutes" },
                        "distance": { "type": "NUMBER", "description": "For cardio: distance in km" },
                        "intensity": { "type": "STRING", "description": "For cardio: speed, incline or zone" },
                        "notes": { "type": "STRING" }
                    },
                    "required": ["name"]
                }
            }
        },
        "required": ["name", "exercises"]
    })
});

fn food_prompt(description: &str) -> String {
    format!(
        "Analyze the nutritional value of this food: \"{}\". \
         Estimate values if exact data is unavailable. Return JSON.",
        description
    )
}

fn workout_prompt(request: &str, kind: ExerciseType) -> String {
    let (label, focus) = match kind {
        ExerciseType::Strength => ("strength", "Focus on sets, reps, and weight."),
        ExerciseType::Cardio => (
            "cardio",
            "Focus on duration (minutes), distance (km), and intensity \
             (e.g., 'Pace 5:00', 'Zone 2', 'Incline 12').",
        ),
    };
    format!(
        "Create a {} workout routine based on this request: \"{}\". {} Return JSON.",
        label, request, focus
    )
}

// ============================================================================
// Model output parsing
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawFood {
    #[serde(default)]
    name: String,
    macros: Macros,
}

#[derive(Debug, Deserialize)]
struct RawWorkout {
    name: String,
    #[serde(default)]
    exercises: Vec<RawExercise>,
}

#[derive(Debug, Deserialize)]
struct RawExercise {
    name: String,
    sets: Option<f64>,
    reps: Option<Value>,
    weight: Option<f64>,
    duration: Option<f64>,
    distance: Option<f64>,
    intensity: Option<String>,
    notes: Option<String>,
}

impl RawExercise {
    fn into_exercise(self, kind: ExerciseType) -> Exercise {
        let kind = match kind {
            ExerciseType::Strength => ExerciseKind::Strength {
                sets: self.sets.map(|s| s.round().max(0.0) as u32).unwrap_or(0),
                reps: match self.reps {
                    Some(Value::String(s)) => s,
                    Some(Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                },
                weight: self.weight.unwrap_or(0.0),
            },
            ExerciseType::Cardio => ExerciseKind::Cardio {
                distance: self.distance.unwrap_or(0.0),
                duration: self.duration.unwrap_or(0.0),
                intensity: self.intensity.unwrap_or_default(),
            },
        };
        Exercise {
            id: format!("ai-{}", Uuid::new_v4()),
            name: self.name,
            kind,
            notes: self.notes.filter(|n| !n.is_empty()),
        }
    }
}

/// Parse the model's JSON text into a food estimate
pub fn parse_food_estimate(text: &str, description: &str) -> Result<FoodEstimate> {
    let raw: RawFood = serde_json::from_str(text)
        .map_err(|e| Error::Ai(format!("Malformed nutrition estimate: {}", e)))?;
    let name = if raw.name.trim().is_empty() {
        description.to_string()
    } else {
        raw.name
    };
    Ok(FoodEstimate {
        name,
        macros: raw.macros,
    })
}

/// Parse the model's JSON text into a plan; every exercise gets a fresh id
/// and the requested discipline regardless of what the model said
pub fn parse_workout_plan(text: &str, kind: ExerciseType) -> Result<WorkoutPlan> {
    let raw: RawWorkout = serde_json::from_str(text)
        .map_err(|e| Error::Ai(format!("Malformed workout plan: {}", e)))?;
    Ok(WorkoutPlan {
        name: raw.name,
        exercises: raw
            .exercises
            .into_iter()
            .map(|e| e.into_exercise(kind))
            .collect(),
    })
}

// ============================================================================
// Client
// ============================================================================

/// Blocking Gemini `generateContent` client
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl GeminiClient {
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        if !config.enabled {
            return Err(Error::Config("AI estimation is disabled".into()));
        }
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!("{} environment variable not set", config.api_key_env))
            })?;

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Send one prompt constrained to `schema`; returns the first text part
    fn generate(&self, prompt: String, schema: &Value) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        };

        tracing::debug!("Sending request to {}", self.endpoint());
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(map_api_error(status.as_u16(), &body));
        }

        extract_text(&body)
    }
}

fn map_api_error(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<GenerateResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .map_or_else(|| body.to_string(), |e| e.message);
    Error::Ai(format!("Gemini API error ({}): {}", status, message))
}

fn extract_text(body: &str) -> Result<String> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| Error::Ai(format!("Failed to parse Gemini response: {}", e)))?;

    if let Some(error) = response.error {
        return Err(Error::Ai(format!("Gemini API error: {}", error.message)));
    }

    response
        .candidates
        .into_iter()
        .flatten()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| Error::Ai("No content in Gemini response".into()))
}

impl Estimator for GeminiClient {
    fn estimate_nutrition(&self, description: &str) -> Result<FoodEstimate> {
        let text = self.generate(food_prompt(description), &FOOD_SCHEMA)?;
        parse_food_estimate(&text, description)
    }

    fn generate_workout_plan(&self, request: &str, kind: ExerciseType) -> Result<WorkoutPlan> {
        let text = self.generate(workout_prompt(request, kind), &WORKOUT_SCHEMA)?;
        parse_workout_plan(&text, kind)
    }
}
