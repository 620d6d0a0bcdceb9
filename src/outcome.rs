use serde::{ser::SerializeStruct, Serialize, Serializer};

/// Explicit result of a single invocation. Exactly one of the two variants
/// holds, a failure never carries a value and a success never carries a fault.
///
/// ```rust
/// use settle::{Fault, Outcome};
///
/// let outcome: Outcome<Fault, i32> = Outcome::success(42);
/// assert_eq!(outcome.value(), Some(&42));
/// assert!(outcome.fault().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome<F, T> {
    Success(T),
    Failure(F),
}

/// Outcome whose success may legitimately carry no value.
pub type NullableOutcome<F, T> = Outcome<F, Option<T>>;

impl<F, T> Outcome<F, T> {
    pub fn success(value: T) -> Self {
        Self::Success(value)
    }

    pub fn failure(fault: F) -> Self {
        Self::Failure(fault)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    pub fn fault(&self) -> Option<&F> {
        match self {
            Outcome::Failure(fault) => Some(fault),
            Outcome::Success(_) => None,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn into_fault(self) -> Option<F> {
        match self {
            Outcome::Failure(fault) => Some(fault),
            Outcome::Success(_) => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn as_ref(&self) -> Outcome<&F, &T> {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(fault) => Outcome::Failure(fault),
        }
    }

    pub fn map<U>(self, op: impl FnOnce(T) -> U) -> Outcome<F, U> {
        match self {
            Outcome::Success(value) => Outcome::Success(op(value)),
            Outcome::Failure(fault) => Outcome::Failure(fault),
        }
    }

    pub fn map_fault<G>(self, op: impl FnOnce(F) -> G) -> Outcome<G, T> {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(fault) => Outcome::Failure(op(fault)),
        }
    }

    pub fn into_result(self) -> Result<T, F> {
        self.into()
    }

    /// Raises failure again as `anyhow::Error`, so it can be propagated with `?`.
    pub fn into_anyhow(self) -> anyhow::Result<T>
    where
        F: Into<anyhow::Error>,
    {
        self.into_result().map_err(Into::into)
    }
}

/// Shorthand for `Outcome::success`.
pub fn success<F, T>(value: T) -> Outcome<F, T> {
    Outcome::Success(value)
}

/// Shorthand for `Outcome::failure`.
pub fn failure<F, T>(fault: F) -> Outcome<F, T> {
    Outcome::Failure(fault)
}

impl<F, T> From<Result<T, F>> for Outcome<F, T> {
    fn from(result: Result<T, F>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(fault) => Outcome::Failure(fault),
        }
    }
}

impl<F, T> From<Outcome<F, T>> for Result<T, F> {
    fn from(outcome: Outcome<F, T>) -> Self {
        match outcome {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(fault) => Err(fault),
        }
    }
}

/// Serializes to `{"fault": ..., "value": ...}`, the missing side is `null`.
impl<F, T> Serialize for Outcome<F, T>
where
    F: Serialize,
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Outcome", 2)?;
        state.serialize_field("fault", &self.fault())?;
        state.serialize_field("value", &self.value())?;
        state.end()
    }
}
