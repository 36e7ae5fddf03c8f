// Klass Error Handling Module
// Errors raised while dispatching methods, with a trace of the wrapped calls they crossed

use colored::*;
use std::fmt;
use thiserror::Error;

/// Types of errors raised by dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TypeError,
    AttributeError,
    ArgumentError,
    RuntimeError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::TypeError => write!(f, "TypeError"),
            ErrorKind::AttributeError => write!(f, "AttributeError"),
            ErrorKind::ArgumentError => write!(f, "ArgumentError"),
            ErrorKind::RuntimeError => write!(f, "RuntimeError"),
        }
    }
}

/// A wrapped-method frame an error travelled through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub class_name: String,
    pub method_name: String,
}

impl StackFrame {
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  at {}.{}", self.class_name, self.method_name)
    }
}

/// Main error type for Klass
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct KlassError {
    pub kind: ErrorKind,
    pub message: String,
    pub help: Option<String>,
    pub stack_trace: Vec<StackFrame>,
}

impl KlassError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            help: None,
            stack_trace: Vec::new(),
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn push_frame(&mut self, frame: StackFrame) {
        self.stack_trace.push(frame);
    }

    /// Format the error for display, innermost frame first
    pub fn format(&self) -> String {
        let mut output = format!(
            "{}: {}\n",
            self.kind.to_string().red().bold(),
            self.message.white().bold()
        );

        if let Some(ref help) = self.help {
            output.push_str(&format!("\n      {}: {}\n", "Help".cyan().bold(), help));
        }

        if !self.stack_trace.is_empty() {
            output.push_str(&format!("\n{}:\n", "Stack trace".yellow().bold()));
            for frame in &self.stack_trace {
                output.push_str(&format!("{}\n", frame));
            }
        }

        output
    }
}

/// Result type for Klass operations
pub type KlassResult<T> = Result<T, KlassError>;

// Convenience constructors for common errors
impl KlassError {
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    pub fn attribute_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AttributeError, message)
    }

    pub fn argument_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ArgumentError, message)
    }

    pub fn runtime_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RuntimeError, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_kind_and_message() {
        let err = KlassError::attribute_error("no method 'bark'");
        assert_eq!(err.to_string(), "AttributeError: no method 'bark'");
    }

    #[test]
    fn test_format_lists_frames() {
        let mut err = KlassError::runtime_error("boom").with_help("check the body");
        err.push_frame(StackFrame::new("Dog", "sound"));
        err.push_frame(StackFrame::new("Animal", "speak"));

        let text = err.format();
        assert!(text.contains("boom"));
        assert!(text.contains("check the body"));
        let dog = text.find("at Dog.sound").unwrap();
        let animal = text.find("at Animal.speak").unwrap();
        assert!(dog < animal);
    }
}
