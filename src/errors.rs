use serde::{Deserialize, Serialize};

/// The two kinds of outbound request.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Discovery,
    Invocation,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WorkbenchError {
    pub kind: RequestKind,
    pub message: String,
    pub function: Option<String>,
    pub url: Option<String>,
    pub status: Option<u16>,
}

impl WorkbenchError {
    pub fn discovery(message: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::Discovery,
            message: message.into(),
            function: None,
            url: None,
            status: None,
        }
    }

    pub fn invocation(function: &str, message: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::Invocation,
            message: message.into(),
            function: Some(function.to_string()),
            url: None,
            status: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl std::fmt::Display for WorkbenchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            RequestKind::Discovery => write!(f, "discovery failed")?,
            RequestKind::Invocation => match &self.function {
                Some(function) => write!(f, "invocation of `{}` failed", function)?,
                None => write!(f, "invocation failed")?,
            },
        }
        if let Some(url) = &self.url {
            write!(f, " ({})", url)?;
        }
        if let Some(status) = self.status {
            write!(f, " with status {}", status)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for WorkbenchError {}

/// Writes the error to the log. Failed requests never surface anywhere else.
pub fn log_error(error: &WorkbenchError) {
    match error.kind {
        RequestKind::Discovery => log::error!("Error fetching functions: {}", error),
        RequestKind::Invocation => log::error!("Error executing function: {}", error),
    }
}
