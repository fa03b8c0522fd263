use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{StudioError, UNKNOWN_ERROR};

/// Code-generation level passed to the assembly-text backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OptLevel {
    #[default]
    O0,
    O1,
    O2,
    O3,
    Os,
}

impl OptLevel {
    pub const ALL: [OptLevel; 5] = [
        OptLevel::O0,
        OptLevel::O1,
        OptLevel::O2,
        OptLevel::O3,
        OptLevel::Os,
    ];

    /// The compiler flag, e.g. `-O2`.
    pub fn flag(self) -> &'static str {
        match self {
            OptLevel::O0 => "-O0",
            OptLevel::O1 => "-O1",
            OptLevel::O2 => "-O2",
            OptLevel::O3 => "-O3",
            OptLevel::Os => "-Os",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            OptLevel::O0 => "none",
            OptLevel::O1 => "basic",
            OptLevel::O2 => "standard",
            OptLevel::O3 => "aggressive",
            OptLevel::Os => "size",
        }
    }
}

impl fmt::Display for OptLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flag())
    }
}

impl FromStr for OptLevel {
    type Err = StudioError;

    /// Accepts `-O2` as well as `O2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bare = trimmed.strip_prefix('-').unwrap_or(trimmed);
        match bare {
            "O0" => Ok(OptLevel::O0),
            "O1" => Ok(OptLevel::O1),
            "O2" => Ok(OptLevel::O2),
            "O3" => Ok(OptLevel::O3),
            "Os" => Ok(OptLevel::Os),
            _ => Err(StudioError::InvalidOptLevel(s.to_string())),
        }
    }
}

/// One comparison job. Built per call and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilationRequest {
    source_text: String,
    optimization_level: OptLevel,
}

impl CompilationRequest {
    pub fn new(source_text: impl Into<String>, optimization_level: OptLevel) -> Self {
        Self {
            source_text: source_text.into(),
            optimization_level,
        }
    }

    /// Build from the wire form. A missing level means `-O0`.
    pub fn parse(source_text: impl Into<String>, level: Option<&str>) -> Result<Self, StudioError> {
        let optimization_level = match level {
            Some(level) => level.parse()?,
            None => OptLevel::default(),
        };
        Ok(Self::new(source_text, optimization_level))
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn optimization_level(&self) -> OptLevel {
        self.optimization_level
    }

    /// True when there is nothing to compile.
    pub fn is_blank(&self) -> bool {
        self.source_text.trim().is_empty()
    }
}

/// Request body as sent by a front-end.
#[derive(Clone, Debug, Deserialize)]
pub struct WireRequest {
    pub source_text: String,
    #[serde(default)]
    pub optimization_level: Option<String>,
}

impl WireRequest {
    pub fn into_request(self) -> Result<CompilationRequest, StudioError> {
        CompilationRequest::parse(self.source_text, self.optimization_level.as_deref())
    }
}

/// Outcome of one backend: assembly on success, an error message otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendResult {
    pub success: bool,
    #[serde(rename = "asm_or_error")]
    pub output: String,
}

impl BackendResult {
    pub fn ok(asm: impl Into<String>) -> Self {
        Self {
            success: true,
            output: asm.into(),
        }
    }

    /// A failure. An empty message is replaced so the panel never goes blank.
    pub fn failed(message: impl Into<String>) -> Self {
        let mut output = message.into();
        if output.trim().is_empty() {
            output = UNKNOWN_ERROR.to_string();
        }
        Self {
            success: false,
            output,
        }
    }
}

impl From<Result<String, StudioError>> for BackendResult {
    fn from(result: Result<String, StudioError>) -> Self {
        match result {
            Ok(asm) => BackendResult::ok(asm),
            Err(e) => BackendResult::failed(e.to_string()),
        }
    }
}

/// Both panels of a comparison. Each side is computed independently.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub backend_a: BackendResult,
    pub backend_b: BackendResult,
}

impl ComparisonResult {
    /// Fail both sides with the same error, e.g. for a rejected request.
    pub fn rejected(err: &StudioError) -> Self {
        let message = err.to_string();
        Self {
            backend_a: BackendResult::failed(message.clone()),
            backend_b: BackendResult::failed(message),
        }
    }

    pub fn to_json(&self) -> String {
        // Two plain structs of strings and bools; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}
