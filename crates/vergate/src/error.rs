#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppErrorDetail {
    Message(String),
    Gate(vergate_core::GateError),
}

impl std::fmt::Display for AppErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(message) => write!(f, "{message}"),
            Self::Gate(error) => write!(f, "{error}"),
        }
    }
}

impl From<String> for AppErrorDetail {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<vergate_core::GateError> for AppErrorDetail {
    fn from(value: vergate_core::GateError) -> Self {
        Self::Gate(value)
    }
}

impl From<vergate_oracle::ClientBuildError> for AppErrorDetail {
    fn from(value: vergate_oracle::ClientBuildError) -> Self {
        Self::Message(value.to_string())
    }
}

impl From<regex::Error> for AppErrorDetail {
    fn from(value: regex::Error) -> Self {
        Self::Message(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    MissingSetting {
        setting: &'static str,
    },
    InvalidSetting {
        setting: &'static str,
        details: AppErrorDetail,
    },
    HttpClientFailed {
        details: AppErrorDetail,
    },
    UpdateCheckFailed {
        target: String,
        details: AppErrorDetail,
    },
}

impl AppError {
    pub fn missing_setting(setting: &'static str) -> Self {
        Self::MissingSetting { setting }
    }

    pub fn invalid_setting(setting: &'static str, details: impl Into<AppErrorDetail>) -> Self {
        Self::InvalidSetting {
            setting,
            details: details.into(),
        }
    }

    pub fn http_client_failed(details: impl Into<AppErrorDetail>) -> Self {
        Self::HttpClientFailed {
            details: details.into(),
        }
    }

    pub fn update_check_failed(
        target: impl Into<String>,
        details: impl Into<AppErrorDetail>,
    ) -> Self {
        Self::UpdateCheckFailed {
            target: target.into(),
            details: details.into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSetting { setting } => write!(f, "Setting {setting} is not configured"),
            Self::InvalidSetting { setting, details } => {
                write!(f, "Setting {setting} is invalid: {details}")
            }
            Self::HttpClientFailed { details } => {
                write!(f, "Could not create HTTP client: {details}")
            }
            Self::UpdateCheckFailed { target, details } => {
                write!(f, "{target} update check failed: {details}")
            }
        }
    }
}

impl std::error::Error for AppError {}
