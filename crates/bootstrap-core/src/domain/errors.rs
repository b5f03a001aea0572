use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BootstrapResult<T> = Result<T, BootstrapError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl BootstrapErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }

    /// Errors a caller can fix by changing inputs and re-running, without
    /// losing checkpointed work.
    pub const fn is_recoverable(self) -> bool {
        matches!(self, Self::InputValidationError)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapError {
    category: BootstrapErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl BootstrapError {
    pub fn new(
        category: BootstrapErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            BootstrapErrorCategory::InputValidationError,
            placeholder,
            message,
        )
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(BootstrapErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(BootstrapErrorCategory::ComputationError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(BootstrapErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> BootstrapErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for BootstrapError {}

#[cfg(test)]
mod tests {
    use super::{BootstrapError, BootstrapErrorCategory};

    #[test]
    fn exit_mapping_is_stable() {
        let cases = [
            (BootstrapErrorCategory::InputValidationError, 2),
            (BootstrapErrorCategory::IoSystemError, 3),
            (BootstrapErrorCategory::ComputationError, 4),
            (BootstrapErrorCategory::InternalError, 5),
        ];

        for (category, exit_code) in cases {
            assert_eq!(category.exit_code(), exit_code);
        }
    }

    #[test]
    fn only_input_errors_are_recoverable() {
        assert!(BootstrapErrorCategory::InputValidationError.is_recoverable());
        assert!(!BootstrapErrorCategory::IoSystemError.is_recoverable());
        assert!(!BootstrapErrorCategory::ComputationError.is_recoverable());
    }

    #[test]
    fn error_renders_diagnostic_line() {
        let error = BootstrapError::input_validation("INPUT.SOLVE_MODE", "unknown mode 'Poly'");

        assert_eq!(error.exit_code(), 2);
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [INPUT.SOLVE_MODE] unknown mode 'Poly'"
        );
        assert_eq!(
            error.to_string(),
            "InputValidationError [INPUT.SOLVE_MODE] unknown mode 'Poly'"
        );
    }
}
