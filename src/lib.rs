//! Settles a fallible computation into one explicit, inspectable `Outcome`.
//!
//! A computation, a plain producer or a future, is run exactly once. A
//! produced value goes through the null policy, a returned error or a panic
//! goes through the classifier, and the caller always gets an `Outcome` to
//! branch on.
//!
//! ```rust
//! use settle::{Fault, Invoker, Outcome};
//!
//! let outcome = Invoker::new().try_call(|| "42".parse::<i32>());
//! assert_eq!(outcome, Outcome::success(42));
//!
//! let outcome = Invoker::new().call(|| -> i32 { panic!("oops") });
//! assert!(outcome.fault().map(Fault::message).unwrap().contains("oops"));
//! ```

#[macro_use]
mod macros;

pub mod classifier;
pub mod fault;
pub mod invoker;
pub mod null_policy;
pub mod outcome;

pub use classifier::{classify, Classifier, CustomClassifier, Raised, StandardClassifier};
pub use fault::{CodedError, Fault, FaultLike, ResultFault, TransportFault};
pub use invoker::Invoker;
pub use null_policy::{AllowNull, NullFault, NullPolicy};
pub use outcome::{failure, success, NullableOutcome, Outcome};
