//! # Example: Classic application bootstrap
//!
//! ```text
//! config ──► redis ──┐
//!        └─► mongo ──┴──► http ──► signals
//! ```
//!
//! Every service prints what it sees, hands off a dummy client and prints the
//! combined exit code of its dependents once they are done. `signals` plays
//! the long-running root and exits after 50ms.
//!
//! Run with: `cargo run --example bootstrap --features logging`

use std::sync::Arc;
use std::time::Duration;

use bootvisor::{
    Bootstrap, Config, Exit, Handoff, LogWriter, Registry, ServiceError, ServiceFn, ServiceRef,
    ServiceSpec, Subscribe,
};

/// Service that hands a named dummy client to its dependents.
fn with_deps(name: &'static str) -> ServiceRef {
    ServiceFn::arc(move |deps: Registry, handoff: Handoff| async move {
        println!("[{name}] running with {:?}", deps.keys());
        let code = handoff.provide(Arc::new(format!("{name}-client"))).await?;
        println!("[{name}] done: {code}");
        Ok::<_, ServiceError>(code)
    })
}

/// Root service: waits, then exits.
fn terminator(name: &'static str) -> ServiceRef {
    ServiceFn::arc(move |deps: Registry, _handoff: Handoff| async move {
        println!("[{name}] running with {:?}", deps.keys());
        tokio::time::sleep(Duration::from_millis(50)).await;
        println!("[{name}] done: 0");
        Ok::<_, ServiceError>(Exit::SUCCESS)
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::default())];
    let boot = Bootstrap::builder(Config::default())
        .with_subscribers(subs)
        .build();

    let code = boot
        .run(vec![
            ServiceSpec::new("config", with_deps("config")),
            ServiceSpec::new("redis", with_deps("redis")).after(["config"]),
            ServiceSpec::new("mongo", with_deps("mongo")).after(["config"]),
            ServiceSpec::new("http", with_deps("http")).after(["mongo", "redis"]),
            ServiceSpec::new("signals", terminator("signals")).after(["http"]),
        ])
        .await?;

    println!("bootstrap finished with {code}");
    Ok(())
}
