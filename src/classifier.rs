use crate::fault::{
    CodedError, Fault, FaultLike, ResultFault, TransportFault, UNKNOWN_FAULT_PREFIX,
};
use log::debug;
use std::{
    any::Any,
    backtrace::{Backtrace, BacktraceStatus},
    fmt::{Debug, Display},
};

/// Rendering used for panic payloads that are neither strings nor faults.
pub const OPAQUE_PAYLOAD: &str = "<opaque panic payload>";

/// Value raised by a computation, shape unknown until classified.
pub enum Raised {
    /// Computation returned an error.
    Error(anyhow::Error),

    /// Computation panicked, payload as handed over by `catch_unwind`.
    Panic {
        payload: Box<dyn Any + Send>,

        /// Backtrace taken where the panic was caught.
        trace: Option<String>,
    },
}

impl Raised {
    /// Panic without trace.
    pub fn panic(payload: Box<dyn Any + Send>) -> Self {
        Raised::Panic {
            payload,
            trace: None,
        }
    }

    /// Panic caught right now, backtrace is captured when enabled through
    /// `RUST_LIB_BACKTRACE` or `RUST_BACKTRACE`.
    pub fn caught(payload: Box<dyn Any + Send>) -> Self {
        let backtrace = Backtrace::capture();
        let trace = (backtrace.status() == BacktraceStatus::Captured).then(|| backtrace.to_string());

        Raised::Panic { payload, trace }
    }

    /// Error of a caller's own fault-like type, its code survives classification.
    pub fn fault_like<E>(error: E) -> Self
    where
        E: FaultLike + std::error::Error + Send + Sync + 'static,
    {
        Raised::Error(CodedError::new(error).into())
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, Raised::Panic { .. })
    }

    /// Returns reference to the raised value if it is of type T.
    pub fn downcast_ref<T>(&self) -> Option<&T>
    where
        T: Display + Debug + Send + Sync + 'static,
    {
        match self {
            Raised::Error(error) => error.downcast_ref::<T>(),
            Raised::Panic { payload, .. } => payload.downcast_ref::<T>(),
        }
    }

    /// Textual rendering of the raised value, if it has a non-empty one.
    pub fn render(&self) -> Option<String> {
        let rendered = match self {
            Raised::Error(error) => error.to_string(),
            Raised::Panic { payload, .. } => panic_message(&**payload),
        };

        (!rendered.is_empty()).then_some(rendered)
    }

    /// Captured backtrace of the raised value, if any.
    pub fn trace(&self) -> Option<String> {
        match self {
            Raised::Error(error) => {
                let backtrace = error.backtrace();
                (backtrace.status() == BacktraceStatus::Captured).then(|| backtrace.to_string())
            }
            Raised::Panic { trace, .. } => trace.clone(),
        }
    }
}

impl Debug for Raised {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Raised::Error(error) => f.debug_tuple("Error").field(error).finish(),
            Raised::Panic { payload, trace } => f
                .debug_struct("Panic")
                .field("payload", &panic_message(&**payload))
                .field("trace", trace)
                .finish(),
        }
    }
}

impl From<anyhow::Error> for Raised {
    fn from(error: anyhow::Error) -> Self {
        Raised::Error(error)
    }
}

/// Turns raised value into a fault of type F. Consumed on use, so every
/// classifier runs at most once per invocation.
pub trait Classifier<F> {
    /// `computation` is the rendering of what was attempted.
    fn classify(self, raised: Raised, computation: &str) -> F;
}

/// Classification used when the caller did not supply one, see `classify`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardClassifier;

impl<F> Classifier<F> for StandardClassifier
where
    F: From<Fault>,
{
    fn classify(self, raised: Raised, computation: &str) -> F {
        F::from(classify(raised, computation))
    }
}

/// Caller supplied classification. It fully overrides the standard one,
/// returning None yields `Fault::Misbehaved`.
pub struct CustomClassifier<C>(pub(crate) C);

impl<F, C> Classifier<F> for CustomClassifier<C>
where
    C: FnOnce(Raised) -> Option<F>,
    F: From<Fault>,
{
    fn classify(self, raised: Raised, computation: &str) -> F {
        match (self.0)(raised) {
            Some(fault) => fault,
            None => {
                debug!("classifier returned no fault for {}", computation);
                F::from(Fault::Misbehaved)
            }
        }
    }
}

/// Standard classification. Faults and errors, which always carry a message,
/// are passed through, any other panic payload is wrapped into
/// `Fault::Result` whose message names the computation.
///
/// ```rust
/// use settle::{classify, Fault, Raised};
///
/// let fault = classify(Raised::panic(Box::new("oops")), "fetch_user");
/// assert!(fault.message().contains("fetch_user"));
/// assert!(fault.message().contains("oops"));
/// ```
pub fn classify(raised: Raised, computation: &str) -> Fault {
    match recognize(raised) {
        Ok(fault) => {
            debug!("{} raised fault: {}", computation, fault);
            fault
        }
        Err(raised) => {
            debug!("{} raised non-fault value: {:?}", computation, raised);
            wrap(raised, computation)
        }
    }
}

/// Checks whether raised value exposes fault capabilities and returns it
/// as a fault, otherwise hands the value back.
fn recognize(raised: Raised) -> Result<Fault, Raised> {
    match raised {
        Raised::Error(error) => Ok(recognize_error(error)),
        Raised::Panic { payload, trace } => recognize_payload(payload, trace),
    }
}

/// Every error exposes a message through `Display`, so it always has a
/// fault shape. Own fault types keep their variant, `CodedError` keeps its code.
fn recognize_error(error: anyhow::Error) -> Fault {
    let error = match error.downcast::<Fault>() {
        Ok(fault) => return fault,
        Err(error) => error,
    };
    let error = match error.downcast::<TransportFault>() {
        Ok(fault) => return fault.into(),
        Err(error) => error,
    };
    match error.downcast::<ResultFault>() {
        Ok(fault) => fault.into(),
        Err(error) => Fault::raised(&error),
    }
}

fn recognize_payload(
    payload: Box<dyn Any + Send>,
    trace: Option<String>,
) -> Result<Fault, Raised> {
    let payload = match payload.downcast::<Fault>() {
        Ok(fault) => return Ok(*fault),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<TransportFault>() {
        Ok(fault) => return Ok((*fault).into()),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<ResultFault>() {
        Ok(fault) => return Ok((*fault).into()),
        Err(payload) => payload,
    };

    match payload.downcast::<anyhow::Error>() {
        Ok(error) => Ok(recognize_error(*error)),
        Err(payload) => Err(Raised::Panic { payload, trace }),
    }
}

fn wrap(raised: Raised, computation: &str) -> Fault {
    let mut message = format!("{}\n{}", UNKNOWN_FAULT_PREFIX, computation);
    if let Some(rendered) = raised.render() {
        message.push('\n');
        message.push_str(&rendered);
    }

    let fault = match raised.trace() {
        Some(trace) => ResultFault::new(message).with_trace(trace),
        None => ResultFault::new(message),
    };

    Fault::Result(fault)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        OPAQUE_PAYLOAD.to_string()
    }
}
