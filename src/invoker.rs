use crate::{
    classifier::{Classifier, CustomClassifier, Raised, StandardClassifier},
    fault::Fault,
    null_policy::{AllowNull, NullFault, NullPolicy},
    outcome::Outcome,
};
use futures::FutureExt;
use log::trace;
use std::{
    any::type_name,
    future::Future,
    marker::PhantomData,
    panic::{self, AssertUnwindSafe},
};

/// Runs a single computation and settles whatever it does into an `Outcome`.
///
/// Type parameters track the configuration: F is the fault type, C the
/// classifier and N the null policy. `Invoker::new()` starts with `Fault`,
/// the standard classifier and `AllowNull`, builder methods switch them, so
/// the strict "null is a failure" mode is chosen at compile time.
///
/// Every entry point consumes the invoker, a computation runs exactly once
/// and produces exactly one outcome. Panics and returned errors never escape.
///
/// ```rust
/// use settle::{Fault, Invoker, Outcome};
///
/// let outcome = Invoker::new().call(|| 42);
/// assert_eq!(outcome, Outcome::success(42));
///
/// let outcome = Invoker::new()
///     .null_fault(Fault::result("user not found"))
///     .call(|| None::<u32>);
/// assert_eq!(outcome, Outcome::failure(Fault::result("user not found")));
/// ```
pub struct Invoker<F = Fault, C = StandardClassifier, N = AllowNull> {
    classifier: C,
    null_policy: N,

    /// Rendering of the computation used in diagnostics. Defaults to the
    /// type name of the closure or future.
    description: Option<String>,

    _marker: PhantomData<fn() -> F>,
}

impl Invoker {
    pub fn new() -> Self {
        Self::for_fault()
    }
}

impl Default for Invoker {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> Invoker<F> {
    /// Creates invoker producing faults of own type F, which has to be
    /// constructible from the standard `Fault`.
    pub fn for_fault() -> Self {
        Self {
            classifier: StandardClassifier,
            null_policy: AllowNull,
            description: None,
            _marker: PhantomData,
        }
    }
}

impl<F, C> Invoker<F, C, AllowNull> {
    /// Switches to strict mode: a computation producing `None` results in
    /// failure with given fault, returned verbatim.
    pub fn null_fault(self, fault: impl Into<F>) -> Invoker<F, C, NullFault<F>> {
        Invoker {
            classifier: self.classifier,
            null_policy: NullFault::new(fault.into()),
            description: self.description,
            _marker: PhantomData,
        }
    }
}

impl<F, C, N> Invoker<F, C, N> {
    /// Replaces standard classification. Classifier is called once with the
    /// raised value, returning None produces `Fault::Misbehaved`.
    pub fn classifier<G>(self, classifier: G) -> Invoker<F, CustomClassifier<G>, N>
    where
        G: FnOnce(Raised) -> Option<F>,
    {
        Invoker {
            classifier: CustomClassifier(classifier),
            null_policy: self.null_policy,
            description: self.description,
            _marker: PhantomData,
        }
    }

    /// Sets rendering of the computation used in fault messages.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn computation<T: ?Sized>(&mut self) -> String {
        self.description
            .take()
            .unwrap_or_else(|| type_name::<T>().to_string())
    }
}

impl<F, C, N> Invoker<F, C, N>
where
    C: Classifier<F>,
{
    /// Calls producer synchronously, a panic is classified as raised value.
    pub fn call<P, G>(mut self, producer: G) -> Outcome<F, N::Value>
    where
        G: FnOnce() -> P,
        N: NullPolicy<P, F>,
    {
        let computation = self.computation::<G>();
        trace!("running {}", computation);

        let produced = panic::catch_unwind(AssertUnwindSafe(producer)).map_err(Raised::caught);
        self.settle(produced, computation)
    }

    /// Calls fallible producer synchronously, `Err` and panics are classified
    /// as raised values.
    pub fn try_call<P, E, G>(mut self, producer: G) -> Outcome<F, N::Value>
    where
        G: FnOnce() -> Result<P, E>,
        E: Into<anyhow::Error>,
        N: NullPolicy<P, F>,
    {
        let computation = self.computation::<G>();
        trace!("running {}", computation);

        let produced = match panic::catch_unwind(AssertUnwindSafe(producer)) {
            Ok(result) => result.map_err(|e| Raised::Error(e.into())),
            Err(payload) => Err(Raised::caught(payload)),
        };
        self.settle(produced, computation)
    }

    /// Awaits given future. This is the only point where the call yields.
    pub async fn call_async<P, Fut>(mut self, future: Fut) -> Outcome<F, N::Value>
    where
        Fut: Future<Output = P>,
        N: NullPolicy<P, F>,
    {
        let computation = self.computation::<Fut>();
        trace!("awaiting {}", computation);

        let produced = AssertUnwindSafe(future)
            .catch_unwind()
            .await
            .map_err(Raised::caught);
        self.settle(produced, computation)
    }

    /// Awaits given fallible future. This is the only point where the call yields.
    pub async fn try_call_async<P, E, Fut>(mut self, future: Fut) -> Outcome<F, N::Value>
    where
        Fut: Future<Output = Result<P, E>>,
        E: Into<anyhow::Error>,
        N: NullPolicy<P, F>,
    {
        let computation = self.computation::<Fut>();
        trace!("awaiting {}", computation);

        let produced = match AssertUnwindSafe(future).catch_unwind().await {
            Ok(result) => result.map_err(|e| Raised::Error(e.into())),
            Err(payload) => Err(Raised::caught(payload)),
        };
        self.settle(produced, computation)
    }

    /// Drives future to completion on the current thread.
    pub fn call_blocking<P, Fut>(self, future: Fut) -> Outcome<F, N::Value>
    where
        Fut: Future<Output = P>,
        N: NullPolicy<P, F>,
    {
        futures_executor::block_on(self.call_async(future))
    }

    /// Drives fallible future to completion on the current thread.
    pub fn try_call_blocking<P, E, Fut>(self, future: Fut) -> Outcome<F, N::Value>
    where
        Fut: Future<Output = Result<P, E>>,
        E: Into<anyhow::Error>,
        N: NullPolicy<P, F>,
    {
        futures_executor::block_on(self.try_call_async(future))
    }

    /// Routes produced value through null policy and raised value through
    /// classifier.
    fn settle<P>(self, produced: Result<P, Raised>, computation: String) -> Outcome<F, N::Value>
    where
        N: NullPolicy<P, F>,
    {
        match produced {
            Ok(value) => {
                let outcome = self.null_policy.resolve(value);
                if outcome.is_success() {
                    trace!("{} succeeded", computation);
                } else {
                    trace!("{} produced no value", computation);
                }
                outcome
            }
            Err(raised) => {
                trace!("{} failed", computation);
                Outcome::Failure(self.classifier.classify(raised, &computation))
            }
        }
    }
}
