/// Settles an expression into an `Outcome`, rendering the expression's
/// source text into diagnostics of wrapped faults.
///
/// ```rust
/// use settle::{settle, Fault, Invoker};
///
/// let outcome = settle!(1 + 1);
/// assert_eq!(outcome.value(), Some(&2));
///
/// let outcome = settle!(Invoker::new().null_fault(Fault::result("empty")), None::<u8>);
/// assert_eq!(outcome.fault(), Some(&Fault::result("empty")));
///
/// let outcome = settle!({
///     let v: Vec<u8> = vec![];
///     v[3]
/// });
/// assert!(outcome.fault().unwrap().message().contains("v[3]"));
/// ```
#[macro_export]
macro_rules! settle {
    ($invoker:expr, $computation:expr $(,)?) => {
        $invoker
            .describe(stringify!($computation))
            .call(|| $computation)
    };
    ($computation:expr $(,)?) => {
        $crate::settle!($crate::Invoker::new(), $computation)
    };
}

/// Same as `settle!` for expressions evaluating to `Result`.
///
/// ```rust
/// use settle::try_settle;
///
/// let outcome = try_settle!("12".parse::<u32>());
/// assert_eq!(outcome.value(), Some(&12));
///
/// let outcome = try_settle!("x".parse::<u32>());
/// assert!(outcome.is_failure());
/// ```
#[macro_export]
macro_rules! try_settle {
    ($invoker:expr, $computation:expr $(,)?) => {
        $invoker
            .describe(stringify!($computation))
            .try_call(|| $computation)
    };
    ($computation:expr $(,)?) => {
        $crate::try_settle!($crate::Invoker::new(), $computation)
    };
}
