use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShippingError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Table encoding error: {0}")]
    TableEncodeError(#[from] toml::ser::Error),

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Reference table error: {message}")]
    TableError { message: String },

    #[error("Distance service returned {status} for '{city}'")]
    UpstreamStatusError { city: String, status: String },

    #[error("No route found for '{city}': {status}")]
    NoRouteError { city: String, status: String },

    #[error("Malformed distance response for '{city}': {message}")]
    MalformedResponseError { city: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Upstream,
    Configuration,
    Data,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    High,
    Critical,
}

impl ShippingError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ShippingError::ApiError(_) => ErrorCategory::Network,
            ShippingError::UpstreamStatusError { .. }
            | ShippingError::NoRouteError { .. }
            | ShippingError::MalformedResponseError { .. } => ErrorCategory::Upstream,
            ShippingError::MissingConfigError { .. }
            | ShippingError::InvalidConfigValueError { .. }
            | ShippingError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ShippingError::TableEncodeError(_)
            | ShippingError::TableError { .. } => ErrorCategory::Data,
            ShippingError::IoError(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // a single city failing never fails a refresh run
            ErrorCategory::Network | ErrorCategory::Upstream => ErrorSeverity::Low,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ShippingError::MissingConfigError { field } => format!(
                "Provide '{}' via the command line, the config file or the environment (GOOGLE_MAPS_API_KEY)",
                field
            ),
            ShippingError::InvalidConfigValueError { field, .. }
            | ShippingError::ConfigValidationError { field, .. } => {
                format!("Check the value of '{}' in your configuration", field)
            }
            ShippingError::ApiError(_) => {
                "Check network connectivity and the distance service endpoint".to_string()
            }
            ShippingError::UpstreamStatusError { .. } => {
                "Make sure the Distance Matrix API is enabled for this key and quota is available"
                    .to_string()
            }
            ShippingError::NoRouteError { city, .. } => format!(
                "Check the spelling of '{}' or keep its previous distance",
                city
            ),
            ShippingError::MalformedResponseError { .. } => {
                "Verify the endpoint points at a Distance Matrix JSON API".to_string()
            }
            ShippingError::TableError { .. } | ShippingError::TableEncodeError(_) => {
                "Fix the reference table file or delete it to start from the built-in table"
                    .to_string()
            }
            ShippingError::IoError(_) => {
                "Check that the table path exists and is writable".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not reach the distance service: {}", self),
            ErrorCategory::Upstream => format!("Distance lookup failed: {}", self),
            ErrorCategory::Data => format!("Reference table problem: {}", self),
            ErrorCategory::Io => format!("File system problem: {}", self),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShippingError>;
