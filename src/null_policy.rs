use crate::outcome::Outcome;

/// Decides whether a produced value is a success or has to become a fault.
///
/// P is the type produced by the computation, `Value` is the success type
/// of the resulting outcome.
pub trait NullPolicy<P, F> {
    type Value;

    fn resolve(self, produced: P) -> Outcome<F, Self::Value>;
}

/// Every produced value is a success, `None` included.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AllowNull;

impl<P, F> NullPolicy<P, F> for AllowNull {
    type Value = P;

    fn resolve(self, produced: P) -> Outcome<F, P> {
        Outcome::Success(produced)
    }
}

/// `None` becomes a failure carrying the configured fault as is. Only
/// applies to computations producing `Option<T>`, a successful outcome
/// then carries plain T.
///
/// ```rust
/// use settle::{Fault, NullFault, NullPolicy, Outcome};
///
/// let policy = NullFault::new(Fault::result("missing"));
/// let outcome: Outcome<Fault, i32> = policy.resolve(None);
/// assert_eq!(outcome, Outcome::failure(Fault::result("missing")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullFault<F>(F);

impl<F> NullFault<F> {
    pub fn new(fault: F) -> Self {
        Self(fault)
    }

    pub fn fault(&self) -> &F {
        &self.0
    }
}

impl<T, F> NullPolicy<Option<T>, F> for NullFault<F> {
    type Value = T;

    fn resolve(self, produced: Option<T>) -> Outcome<F, T> {
        match produced {
            Some(value) => Outcome::Success(value),
            None => Outcome::Failure(self.0),
        }
    }
}
