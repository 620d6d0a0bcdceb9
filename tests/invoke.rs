use settle::{
    settle, try_settle, CodedError, Fault, FaultLike, Invoker, NullableOutcome, Outcome,
    ResultFault, TransportFault,
};
use std::cell::Cell;
use tools::CaseBuilder;


#[derive(Debug, PartialEq)]
struct User {
    name: String,
}

fn find_user(id: u32) -> Option<User> {
    (id == 1).then(|| User {
        name: String::from("ada"),
    })
}

fn fetch_user(id: u32) -> Result<User, TransportFault> {
    find_user(id).ok_or_else(|| TransportFault::new(404, "no such user"))
}

#[test]
fn test_values() -> anyhow::Result<()> {
    CaseBuilder::new(Invoker::new().call(|| 42))
        .name("plain value")
        .value(42)
        .run()?;

    CaseBuilder::new(Invoker::new().call(|| 0))
        .name("zero")
        .value(0)
        .run()?;

    CaseBuilder::new(Invoker::new().call(|| false))
        .name("false")
        .value(false)
        .run()?;

    CaseBuilder::new(Invoker::new().call(String::new))
        .name("empty string")
        .value(String::new())
        .run()?;

    CaseBuilder::new(Invoker::new().call(|| None::<u32>))
        .name("null allowed")
        .value(None)
        .run()?;

    CaseBuilder::new(Invoker::new().try_call(|| fetch_user(1)))
        .name("fallible success")
        .value(User {
            name: String::from("ada"),
        })
        .run()?;

    Ok(())
}

#[test]
fn test_faults() -> anyhow::Result<()> {
    let outcome = Invoker::new().try_call(|| -> anyhow::Result<u32> { anyhow::bail!("boom") });
    assert!(matches!(outcome.fault(), Some(Fault::Raised { .. })));
    CaseBuilder::new(outcome)
        .name("error")
        .message_contains("boom")
        .run()?;

    CaseBuilder::new(Invoker::new().try_call(|| fetch_user(2)))
        .name("transport fault")
        .fault(Fault::transport(404, "no such user"))
        .run()?;

    CaseBuilder::new(Invoker::new().try_call(|| -> Result<u32, ResultFault> {
        Err(ResultFault::new("quota").with_code(9))
    }))
    .name("result fault")
    .fault(Fault::Result(ResultFault::new("quota").with_code(9)))
    .run()?;

    CaseBuilder::new(Invoker::new().call(|| -> u32 {
        std::panic::panic_any(Fault::transport(502, "upstream"))
    }))
    .name("panicked fault")
    .fault(Fault::transport(502, "upstream"))
    .run()?;

    CaseBuilder::new(Invoker::new().describe("parse header").call(|| -> u32 { panic!("oops") }))
        .name("non-fault panic")
        .message_contains("Unknown error")
        .message_contains("parse header")
        .message_contains("oops")
        .run()?;

    Ok(())
}

#[derive(Debug)]
struct Throttled {
    retry_after: u32,
}

impl std::fmt::Display for Throttled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "throttled, retry after {}s", self.retry_after)
    }
}

impl std::error::Error for Throttled {}

impl FaultLike for Throttled {
    fn message(&self) -> &str {
        "rate limited"
    }

    fn code(&self) -> Option<u16> {
        Some(429)
    }
}

#[test]
fn test_fault_like_errors() -> anyhow::Result<()> {
    let outcome = Invoker::new()
        .try_call(|| -> Result<u8, CodedError> { Err(CodedError::new(Throttled { retry_after: 3 })) });
    assert_eq!(outcome.fault().and_then(|f| f.code()), Some(429));
    CaseBuilder::new(outcome)
        .name("coded error")
        .message_contains("rate limited")
        .run()?;

    let outcome = Invoker::new()
        .try_call(|| -> Result<u8, Throttled> { Err(Throttled { retry_after: 3 }) });
    assert_eq!(outcome.fault().and_then(|f| f.code()), None);
    CaseBuilder::new(outcome)
        .name("plain error")
        .message_contains("retry after 3s")
        .run()?;

    Ok(())
}

#[derive(Debug)]
struct Empty;

impl std::fmt::Display for Empty {
    fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Ok(())
    }
}

impl std::error::Error for Empty {}

#[test]
fn test_empty_message_error_passes_through() {
    let outcome = Invoker::new().try_call(|| -> Result<u8, Empty> { Err(Empty) });

    let fault = outcome.into_fault().expect("failure");
    assert!(matches!(fault, Fault::Raised { .. }));
    assert_eq!(fault.message(), "");
}

#[test]
fn test_null_fault() -> anyhow::Result<()> {
    let missing = Fault::result("user missing");

    CaseBuilder::new(Invoker::new().null_fault(missing.clone()).call(|| find_user(2)))
        .name("none becomes fault")
        .fault(missing.clone())
        .run()?;

    CaseBuilder::new(Invoker::new().null_fault(missing.clone()).call(|| find_user(1)))
        .name("some is unwrapped")
        .value(User {
            name: String::from("ada"),
        })
        .run()?;

    CaseBuilder::new(
        Invoker::new()
            .null_fault(TransportFault::new(404, "gone"))
            .try_call(|| -> anyhow::Result<Option<u8>> { Ok(None) }),
    )
    .name("fallible none")
    .fault(Fault::transport(404, "gone"))
    .run()?;

    CaseBuilder::new(
        Invoker::new()
            .null_fault(missing)
            .try_call(|| -> anyhow::Result<Option<u8>> { anyhow::bail!("io") }),
    )
    .name("error wins over null fault")
    .message_contains("io")
    .run()?;

    Ok(())
}

#[test]
fn test_nullable_outcome_alias() {
    let outcome: NullableOutcome<Fault, u32> = Invoker::new().call(|| None);

    assert_eq!(outcome, Outcome::success(None));
    assert!(outcome.fault().is_none());
}

#[test]
fn test_classifier_overrides_everything() {
    let calls = Cell::new(0);
    let outcome = Invoker::new()
        .classifier(|raised| {
            calls.set(calls.get() + 1);
            assert!(raised.downcast_ref::<TransportFault>().is_some());
            Some(Fault::result("classified"))
        })
        .try_call(|| fetch_user(5));

    assert_eq!(outcome, Outcome::failure(Fault::result("classified")));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_classifier_sees_panics() {
    let outcome = Invoker::new()
        .classifier(|raised| raised.is_panic().then(|| Fault::transport(500, "panicked")))
        .call(|| -> u8 { panic!("nope") });

    assert_eq!(outcome, Outcome::failure(Fault::transport(500, "panicked")));
}

#[test]
fn test_misbehaving_classifier() {
    let outcome = Invoker::new()
        .classifier(|_| None)
        .try_call(|| -> anyhow::Result<u8> { anyhow::bail!("x") });

    let fault = outcome.into_fault().expect("failure");
    assert!(fault.is_misbehaved());
    assert_eq!(fault.message(), "Error handler returned an invalid error");
}

#[derive(Debug, PartialEq)]
enum AppFault {
    Settled(Fault),
    Throttled,
}

impl From<Fault> for AppFault {
    fn from(fault: Fault) -> Self {
        AppFault::Settled(fault)
    }
}

#[test]
fn test_own_fault_type() {
    let outcome = Invoker::<AppFault>::for_fault().call(|| -> u8 { panic!("x") });
    assert!(matches!(outcome, Outcome::Failure(AppFault::Settled(Fault::Result(_)))));

    let outcome = Invoker::<AppFault>::for_fault()
        .null_fault(AppFault::Throttled)
        .call(|| None::<u8>);
    assert_eq!(outcome, Outcome::failure(AppFault::Throttled));

    let outcome = Invoker::<AppFault>::for_fault()
        .classifier(|_| None)
        .call(|| -> u8 { panic!("x") });
    assert_eq!(outcome, Outcome::failure(AppFault::Settled(Fault::Misbehaved)));
}

#[test]
fn test_macros_render_computation() -> anyhow::Result<()> {
    CaseBuilder::new(settle!(6 * 7)).name("macro value").value(42).run()?;

    let empty: Vec<u32> = vec![];
    CaseBuilder::new(settle!(empty[3]))
        .name("macro panic")
        .message_contains("Unknown error")
        .message_contains("empty[3]")
        .run()?;

    CaseBuilder::new(try_settle!("x1".parse::<u32>()))
        .name("macro error")
        .message_contains("invalid digit")
        .run()?;

    CaseBuilder::new(settle!(
        Invoker::new().null_fault(Fault::result("nothing")),
        empty.first().copied()
    ))
    .name("macro null fault")
    .fault(Fault::result("nothing"))
    .run()?;

    Ok(())
}

#[test]
fn test_outcome_json() -> anyhow::Result<()> {
    let outcome = Invoker::new().call(|| 42);
    assert_eq!(
        serde_json::to_value(&outcome)?,
        serde_json::json!({"fault": null, "value": 42})
    );

    let outcome = Invoker::new().try_call(|| fetch_user(3).map(|u| u.name));
    assert_eq!(
        serde_json::to_value(&outcome)?,
        serde_json::json!({
            "fault": {"kind": "transport", "code": 404, "message": "no such user"},
            "value": null,
        })
    );

    Ok(())
}

#[test]
fn test_into_anyhow_roundtrip() {
    let err = Invoker::new()
        .try_call(|| fetch_user(9))
        .into_anyhow()
        .unwrap_err();

    assert_eq!(
        err.downcast_ref::<Fault>(),
        Some(&Fault::transport(404, "no such user"))
    );
}
