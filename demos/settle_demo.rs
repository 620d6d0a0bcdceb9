use log::info;
use settle::{settle, Fault, Invoker, TransportFault};

fn parse_port(raw: &str) -> anyhow::Result<Option<u16>> {
    if raw.is_empty() {
        return Ok(None);
    }
    Ok(Some(raw.parse()?))
}

async fn ping(host: &str) -> Result<u16, TransportFault> {
    match host {
        "localhost" => Ok(200),
        _ => Err(TransportFault::new(504, format!("{} did not answer", host))),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let outcome = Invoker::new()
        .null_fault(Fault::result("port not configured"))
        .try_call(|| parse_port("8080"));
    info!("port: {:?}", outcome);

    let outcome = Invoker::new()
        .null_fault(Fault::result("port not configured"))
        .try_call(|| parse_port(""));
    info!("empty port: {:?}", outcome);

    let outcome = Invoker::new().try_call(|| parse_port("eighty"));
    info!("invalid port: {:?}", outcome);

    let outcome = Invoker::new().try_call_blocking(ping("example.org"));
    if let Some(status) = outcome.fault().and_then(|f| f.code()) {
        info!("ping failed with status {}", status);
    }

    let hosts: Vec<&str> = vec![];
    let outcome = settle!(hosts[0]);
    info!("first host: {}", serde_json::to_string(&outcome)?);

    let status = Invoker::new().try_call_blocking(ping("localhost")).into_anyhow()?;
    info!("localhost answered {}", status);

    Ok(())
}
