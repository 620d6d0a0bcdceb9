use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use std::{
    backtrace::BacktraceStatus,
    error::Error,
    fmt::{Debug, Display},
};

/// Message used when a fault is built without one.
pub const UNKNOWN_FAULT_MESSAGE: &str = "An unknown error has occurred";

/// Message carried by `Fault::Misbehaved`.
pub const MISBEHAVED_MESSAGE: &str = "Error handler returned an invalid error";

/// Prefix of the message of every wrapped non-fault value.
pub const UNKNOWN_FAULT_PREFIX: &str = "Unknown error";

pub const DEFAULT_TRANSPORT_CODE: u16 = 500;

/// Capability shared by every fault shape: a human readable message and,
/// optionally, a numeric code.
pub trait FaultLike {
    fn message(&self) -> &str;

    fn code(&self) -> Option<u16> {
        None
    }
}

/// Failure of an external system, e.g. a service answering with a non-2xx status.
///
/// ```rust
/// use settle::TransportFault;
///
/// let fault = TransportFault::default();
/// assert_eq!(fault.code(), 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransportFault {
    code: u16,
    message: String,
}

impl TransportFault {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Builds fault from HTTP status, message is status' canonical reason.
    pub fn from_status(status: StatusCode) -> Self {
        Self::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or(UNKNOWN_FAULT_MESSAGE),
        )
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns code as HTTP status, None if code is not a valid status code.
    pub fn status(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.code).ok()
    }
}

impl Default for TransportFault {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSPORT_CODE, UNKNOWN_FAULT_MESSAGE)
    }
}

impl FaultLike for TransportFault {
    fn message(&self) -> &str {
        &self.message
    }

    fn code(&self) -> Option<u16> {
        Some(self.code)
    }
}

impl Display for TransportFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportFault {}

/// Catch-all fault used when nothing more specific can be determined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultFault {
    message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<u16>,

    /// Trace copied from the raised value, if it had one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trace: Option<String>,
}

impl ResultFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            trace: None,
        }
    }

    /// Sets code field.
    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    /// Sets trace field.
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<u16> {
        self.code
    }

    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }
}

impl Default for ResultFault {
    fn default() -> Self {
        Self::new(UNKNOWN_FAULT_MESSAGE)
    }
}

impl FaultLike for ResultFault {
    fn message(&self) -> &str {
        &self.message
    }

    fn code(&self) -> Option<u16> {
        self.code
    }
}

impl Display for ResultFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ResultFault {}

/// Normalized failure carried by `Outcome::Failure`.
///
/// Faults are never mutated after construction. Every variant exposes a
/// message, `code` and `trace` are present only where the variant has them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fault {
    /// External system failure with a numeric status code.
    Transport(TransportFault),

    /// Generic result fault, also used for wrapped non-fault values.
    Result(ResultFault),

    /// Caller supplied classifier did not produce a fault.
    Misbehaved,

    /// Message-bearing error raised by the computation itself.
    Raised {
        message: String,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<u16>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace: Option<String>,
    },
}

impl Fault {
    pub fn transport(code: u16, message: impl Into<String>) -> Self {
        Self::Transport(TransportFault::new(code, message))
    }

    pub fn result(message: impl Into<String>) -> Self {
        Self::Result(ResultFault::new(message))
    }

    /// Keeps message and captured backtrace of given error. Code is kept
    /// when the error was raised as `CodedError`.
    pub fn raised(error: &anyhow::Error) -> Self {
        let backtrace = error.backtrace();
        let trace = match backtrace.status() {
            BacktraceStatus::Captured => Some(backtrace.to_string()),
            _ => None,
        };

        let (message, code) = match error.downcast_ref::<CodedError>() {
            Some(coded) => (coded.message().to_string(), coded.code()),
            None => (error.to_string(), None),
        };

        Self::Raised {
            message,
            code,
            trace,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Fault::Transport(fault) => fault.message(),
            Fault::Result(fault) => fault.message(),
            Fault::Misbehaved => MISBEHAVED_MESSAGE,
            Fault::Raised { message, .. } => message,
        }
    }

    pub fn code(&self) -> Option<u16> {
        match self {
            Fault::Transport(fault) => Some(fault.code()),
            Fault::Result(fault) => fault.code(),
            Fault::Raised { code, .. } => *code,
            Fault::Misbehaved => None,
        }
    }

    pub fn trace(&self) -> Option<&str> {
        match self {
            Fault::Result(fault) => fault.trace(),
            Fault::Raised { trace, .. } => trace.as_deref(),
            Fault::Transport(_) | Fault::Misbehaved => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Fault::Transport(_))
    }

    pub fn is_misbehaved(&self) -> bool {
        matches!(self, Fault::Misbehaved)
    }
}

impl FaultLike for Fault {
    fn message(&self) -> &str {
        Fault::message(self)
    }

    fn code(&self) -> Option<u16> {
        Fault::code(self)
    }
}

impl From<TransportFault> for Fault {
    fn from(fault: TransportFault) -> Self {
        Self::Transport(fault)
    }
}

impl From<ResultFault> for Fault {
    fn from(fault: ResultFault) -> Self {
        Self::Result(fault)
    }
}

impl Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for Fault {}

/// Carries a caller's own fault-like error through `anyhow`, so message and
/// code survive classification.
///
/// ```rust
/// use settle::{CodedError, FaultLike, Invoker};
///
/// #[derive(Debug)]
/// struct RateLimited;
///
/// impl std::fmt::Display for RateLimited {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         f.write_str("rate limited")
///     }
/// }
///
/// impl std::error::Error for RateLimited {}
///
/// impl FaultLike for RateLimited {
///     fn message(&self) -> &str {
///         "rate limited"
///     }
///
///     fn code(&self) -> Option<u16> {
///         Some(429)
///     }
/// }
///
/// let outcome = Invoker::new().try_call(|| -> Result<u8, _> { Err(CodedError::new(RateLimited)) });
/// assert_eq!(outcome.fault().and_then(|f| f.code()), Some(429));
/// ```
pub struct CodedError {
    message: String,
    code: Option<u16>,
    source: Box<dyn Error + Send + Sync>,
}

impl CodedError {
    pub fn new<E>(error: E) -> Self
    where
        E: FaultLike + Error + Send + Sync + 'static,
    {
        Self {
            message: error.message().to_string(),
            code: error.code(),
            source: Box::new(error),
        }
    }
}

impl FaultLike for CodedError {
    fn message(&self) -> &str {
        &self.message
    }

    fn code(&self) -> Option<u16> {
        self.code
    }
}

impl Debug for CodedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodedError")
            .field("message", &self.message)
            .field("code", &self.code)
            .field("source", &self.source)
            .finish()
    }
}

impl Display for CodedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for CodedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.source.as_ref())
    }
}
