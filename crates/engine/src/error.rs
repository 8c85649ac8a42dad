// ABOUTME: Error types for the extraction engine including the ErrorCode enum and EngineError struct.
// ABOUTME: Provides categorized errors with convenience constructors, predicates, and fatality rules.

use std::fmt;

/// Error codes representing the categories of engine failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed date, non-positive count, unknown team. Fails fast before navigation.
    InvalidRequest,
    /// Settings rejected at load time.
    Config,
    /// Driver-level navigation fault.
    Navigation,
    /// Page load or script execution exceeded its bound.
    Timeout,
    /// Expected container, anchor, or table absent from the page.
    MissingElement,
    /// HTTP 404 on a resolved location.
    ResourceAbsent,
    /// Any other HTTP-level failure.
    Fetch,
    /// Document rendering backend failure.
    Render,
    /// Writing an artifact failed.
    Io,
}

impl ErrorCode {
    /// Fatal codes abort the whole run; everything else is scoped to one item.
    pub fn is_fatal(self) -> bool {
        matches!(self, ErrorCode::InvalidRequest | ErrorCode::Config)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidRequest => "invalid request",
            ErrorCode::Config => "invalid settings",
            ErrorCode::Navigation => "navigation failed",
            ErrorCode::Timeout => "timeout",
            ErrorCode::MissingElement => "missing element",
            ErrorCode::ResourceAbsent => "file not found",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::Render => "render error",
            ErrorCode::Io => "write error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for engine operations.
#[derive(Debug, thiserror::Error)]
pub struct EngineError {
    pub code: ErrorCode,
    /// URL, file name, or request field the error is about.
    pub target: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.op)?;
        if !self.target.is_empty() {
            write!(f, " {}", self.target)?;
        }
        write!(f, ": {}", self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl EngineError {
    pub fn new(
        code: ErrorCode,
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            target: target.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an InvalidRequest error with a message.
    pub fn invalid_request(target: impl Into<String>, msg: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidRequest,
            target,
            "Request",
            Some(anyhow::anyhow!("{}", msg)),
        )
    }

    /// Create a Config error with a message.
    pub fn config(target: impl Into<String>, msg: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::Config,
            target,
            "Settings",
            Some(anyhow::anyhow!("{}", msg)),
        )
    }

    /// Create a Navigation error.
    pub fn navigation(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Navigation, target, op, source)
    }

    /// Create a Timeout error.
    pub fn timeout(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Timeout, target, op, source)
    }

    /// Create a MissingElement error with a message.
    pub fn missing_element(
        target: impl Into<String>,
        op: impl Into<String>,
        msg: impl fmt::Display,
    ) -> Self {
        Self::new(
            ErrorCode::MissingElement,
            target,
            op,
            Some(anyhow::anyhow!("{}", msg)),
        )
    }

    /// Create a ResourceAbsent error (HTTP 404).
    pub fn resource_absent(target: impl Into<String>, op: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceAbsent, target, op, None)
    }

    /// Create a Fetch error.
    pub fn fetch(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Fetch, target, op, source)
    }

    /// Create a Render error.
    pub fn render(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Render, target, op, source)
    }

    /// Create an Io error.
    pub fn io(target: impl Into<String>, op: impl Into<String>, source: std::io::Error) -> Self {
        Self::new(ErrorCode::Io, target, op, Some(source.into()))
    }

    /// Short human-readable reason, without the op/target prefix.
    pub fn reason(&self) -> String {
        match &self.source {
            Some(src) => src.to_string(),
            None => self.code.to_string(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.code.is_fatal()
    }

    /// Returns true if this is an InvalidRequest error.
    pub fn is_invalid_request(&self) -> bool {
        self.code == ErrorCode::InvalidRequest
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    /// Returns true if this is a MissingElement error.
    pub fn is_missing_element(&self) -> bool {
        self.code == ErrorCode::MissingElement
    }

    /// Returns true if this is a ResourceAbsent error.
    pub fn is_resource_absent(&self) -> bool {
        self.code == ErrorCode::ResourceAbsent
    }

    /// Returns true if this is a Navigation error.
    pub fn is_navigation(&self) -> bool {
        self.code == ErrorCode::Navigation
    }

    /// Returns true if this is a Fetch error.
    pub fn is_fetch(&self) -> bool {
        self.code == ErrorCode::Fetch
    }
}

impl From<gameday_tables::TableError> for EngineError {
    fn from(err: gameday_tables::TableError) -> Self {
        use gameday_tables::TableError;
        match err {
            TableError::InvalidRange { .. } | TableError::DateParse { .. } => {
                EngineError::invalid_request("date", err)
            }
            TableError::MissingColumn(_) | TableError::MissingField(_) => {
                EngineError::missing_element("", "Extract", err)
            }
        }
    }
}
