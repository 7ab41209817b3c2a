use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bootvisor::{
    Bootstrap, Config, Event, EventKind, Exit, GraphError, Handoff, LogFn, Registry, RuntimeError,
    ServiceError, ServiceFn, ServiceSpec, Subscribe, run,
};
use tokio::time::{Instant, sleep};

/// Canned service behaviours.
#[derive(Clone, Copy)]
enum Mock {
    ProvideSync,
    ProvideAfter(u64),
    TerminateSync(i32),
    TerminateAfter(u64, i32),
    ErrorAfter(u64, &'static str),
    ProvideAfterThenError(u64, &'static str),
}

impl Mock {
    async fn run(self, name: &'static str, handoff: Handoff) -> Result<Exit, ServiceError> {
        match self {
            Mock::ProvideSync => handoff.provide(Arc::new(name)).await,
            Mock::ProvideAfter(ms) => {
                sleep(Duration::from_millis(ms)).await;
                handoff.provide(Arc::new(name)).await
            }
            Mock::TerminateSync(code) => Ok(Exit::new(code)),
            Mock::TerminateAfter(ms, code) => {
                sleep(Duration::from_millis(ms)).await;
                Ok(Exit::new(code))
            }
            Mock::ErrorAfter(ms, msg) => {
                sleep(Duration::from_millis(ms)).await;
                Err(ServiceError::fail(msg))
            }
            Mock::ProvideAfterThenError(ms, msg) => {
                sleep(Duration::from_millis(ms)).await;
                handoff.provide(Arc::new(name)).await?;
                Err(ServiceError::fail(msg))
            }
        }
    }
}

/// Every declared dependency must be visible in the registry.
fn check_deps(registry: &Registry, deps: &[String]) -> Result<(), ServiceError> {
    let missing: Vec<&str> = deps
        .iter()
        .filter(|d| !registry.contains(d))
        .map(String::as_str)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::fail(format!(
            "service dependencies missing: [{}]",
            missing.join(", ")
        )))
    }
}

fn spec(mock: Mock, name: &'static str, after: &str) -> ServiceSpec {
    let deps: Vec<String> = after.split_whitespace().map(String::from).collect();
    let expected = deps.clone();
    let svc = ServiceFn::arc(move |registry: Registry, handoff: Handoff| {
        let expected = expected.clone();
        async move {
            check_deps(&registry, &expected)?;
            mock.run(name, handoff).await
        }
    });
    ServiceSpec::new(name, svc).after(deps)
}

/// Service that records its start/stop into `log` and hands off if it can.
fn recorded(log: &Arc<Mutex<Vec<String>>>, name: &'static str, code: i32, after: &str) -> ServiceSpec {
    let log = Arc::clone(log);
    let svc = ServiceFn::arc(move |_registry: Registry, handoff: Handoff| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push(format!("start {name}"));
            let below = if handoff.has_dependents() {
                handoff.provide(Arc::new(name)).await?
            } else {
                Exit::SUCCESS
            };
            log.lock().unwrap().push(format!("stop {name}"));
            Ok(below | Exit::new(code))
        }
    });
    ServiceSpec::new(name, svc).after(after.split_whitespace())
}

#[derive(Default)]
struct Collect {
    events: Mutex<Vec<Event>>,
}

#[async_trait]
impl Subscribe for Collect {
    async fn on_event(&self, ev: &Event) {
        self.events.lock().unwrap().push(ev.clone());
    }

    fn name(&self) -> &'static str {
        "collect"
    }
}

#[tokio::test]
async fn resolves_without_options() {
    let code = run(vec![spec(Mock::TerminateSync(42), "A", "")]).await.unwrap();
    assert_eq!(code, Exit::new(42));
}

#[tokio::test]
async fn resolves_a_synchronous_chain() {
    let code = run(vec![
        spec(Mock::ProvideSync, "A", ""),
        spec(Mock::ProvideSync, "B", "A"),
        spec(Mock::TerminateSync(123), "C", "B"),
    ])
    .await
    .unwrap();
    assert_eq!(code, Exit::new(123));
}

#[tokio::test]
async fn chain_starts_in_order_and_stops_in_reverse() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let code = run(vec![
        recorded(&log, "A", 0, ""),
        recorded(&log, "B", 0, "A"),
        recorded(&log, "C", 123, "B"),
    ])
    .await
    .unwrap();

    assert_eq!(code, Exit::new(123));
    assert_eq!(
        *log.lock().unwrap(),
        ["start A", "start B", "start C", "stop C", "stop B", "stop A"]
    );
}

#[tokio::test(start_paused = true)]
async fn resolves_an_asynchronous_chain() {
    let code = run(vec![
        spec(Mock::ProvideAfter(15), "A", ""),
        spec(Mock::ProvideAfter(10), "B", "A"),
        spec(Mock::TerminateAfter(5, 456), "C", "B"),
    ])
    .await
    .unwrap();
    assert_eq!(code, Exit::new(456));
}

#[tokio::test(start_paused = true)]
async fn fan_in_waits_for_the_slowest_not_the_sum() {
    let started = Instant::now();
    let code = run(vec![
        spec(Mock::ProvideAfter(50), "A1", ""),
        spec(Mock::ProvideAfter(48), "A2", ""),
        spec(Mock::ProvideAfter(45), "A3", ""),
        spec(Mock::ProvideAfter(42), "A4", ""),
        spec(Mock::TerminateAfter(5, 1337), "B", "A1 A2 A3 A4"),
    ])
    .await
    .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(code, Exit::new(1337));
    assert!(elapsed >= Duration::from_millis(55), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(100), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn resolves_a_parallel_and_converge_graph() {
    let started = Instant::now();
    let code = run(vec![
        spec(Mock::ProvideAfter(5), "A", ""),
        spec(Mock::ProvideAfter(25), "B1", "A"),
        spec(Mock::ProvideAfter(24), "B2", "A"),
        spec(Mock::ProvideAfter(25), "C1", "B1"),
        spec(Mock::ProvideAfter(24), "C2", "B1"),
        spec(Mock::ProvideAfter(23), "C3", "B2"),
        spec(Mock::ProvideAfter(22), "C4", "B2"),
        spec(Mock::ProvideAfter(25), "D1", "C1 C2"),
        spec(Mock::ProvideAfter(24), "D2", "C3 C4"),
        spec(Mock::TerminateAfter(5, 1337), "E", "D1 D2"),
    ])
    .await
    .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(code, Exit::new(1337));
    assert!(elapsed >= Duration::from_millis(85), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(120), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn wide_layers_run_in_parallel() {
    let mut specs = Vec::new();
    let mut root_deps = Vec::new();
    let names: Vec<[&'static str; 3]> = vec![
        ["A1", "B1", "C1"],
        ["A2", "B2", "C2"],
        ["A3", "B3", "C3"],
        ["A4", "B4", "C4"],
        ["A5", "B5", "C5"],
    ];
    for [a, b, c] in names {
        specs.push(spec(Mock::ProvideAfter(20), a, ""));
        specs.push(spec(Mock::ProvideAfter(20), b, a));
        specs.push(spec(Mock::ProvideAfter(20), c, b));
        root_deps.push(c);
    }
    specs.push(spec(Mock::TerminateAfter(5, 678), "Terminator", &root_deps.join(" ")));

    let started = Instant::now();
    let code = run(specs).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(code, Exit::new(678));
    assert!(elapsed >= Duration::from_millis(65), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(100), "{elapsed:?}");
}

#[tokio::test]
async fn falsy_terminal_results_resolve_to_zero() {
    let terminal_false = ServiceFn::arc(|_r: Registry, _h: Handoff| async { Ok(Exit::from(false)) });
    let code = run(vec![
        spec(Mock::ProvideSync, "A", ""),
        ServiceSpec::new("B", terminal_false).after(["A"]),
    ])
    .await
    .unwrap();
    assert_eq!(code, Exit::SUCCESS);

    let terminal_unit = ServiceFn::arc(|_r: Registry, _h: Handoff| async { Ok(Exit::from(())) });
    let code = run(vec![
        spec(Mock::ProvideSync, "A", ""),
        ServiceSpec::new("B", terminal_unit).after(["A"]),
    ])
    .await
    .unwrap();
    assert_eq!(code, Exit::SUCCESS);
}

#[tokio::test]
async fn detects_multiple_roots() {
    let err = run(vec![
        spec(Mock::TerminateSync(0), "A", ""),
        spec(Mock::TerminateSync(0), "B", ""),
    ])
    .await
    .unwrap_err();

    assert_eq!(
        err,
        RuntimeError::Graph(GraphError::RootCount {
            roots: vec!["A".into(), "B".into()]
        })
    );
    assert!(err.to_string().starts_with("must have exactly 1 root, actually:"));
}

#[tokio::test]
async fn detects_unknown_dependencies() {
    let err = run(vec![spec(Mock::TerminateSync(0), "A", "UndefinedB")])
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("unknown dependencies found"), "{msg}");
    assert!(msg.contains("in A [UndefinedB]"), "{msg}");

    let err = run(vec![
        spec(Mock::ProvideSync, "A", "B UndefinedC"),
        spec(Mock::TerminateSync(0), "B", "UndefinedD"),
    ])
    .await
    .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("in A [UndefinedC]"), "{msg}");
    assert!(msg.contains("in B [UndefinedD]"), "{msg}");
}

#[tokio::test]
async fn detects_self_dependencies() {
    let err = run(vec![spec(Mock::TerminateSync(0), "A", "A")])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "service has a dependency to itself: A");

    let err = run(vec![
        spec(Mock::TerminateSync(0), "A", "A"),
        spec(Mock::TerminateSync(0), "B", "B"),
    ])
    .await
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "services having a dependency to themselves: A, B"
    );
}

#[tokio::test]
async fn detects_circular_dependencies() {
    let err = run(vec![
        spec(Mock::ProvideSync, "A", "B"),
        spec(Mock::TerminateSync(0), "B", "A"),
    ])
    .await
    .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("found circular dependency"), "{msg}");
    assert!(msg.contains("A => B"), "{msg}");

    let err = run(vec![
        spec(Mock::ProvideSync, "A", "B"),
        spec(Mock::ProvideSync, "B", "A"),
        spec(Mock::ProvideSync, "C", "D"),
        spec(Mock::TerminateSync(0), "D", "C"),
    ])
    .await
    .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("found circular dependencies"), "{msg}");
    assert!(msg.contains("A => B"), "{msg}");
    assert!(msg.contains("C => D"), "{msg}");
}

#[tokio::test]
async fn rejects_duplicate_names() {
    let err = run(vec![
        spec(Mock::TerminateSync(0), "A", ""),
        spec(Mock::TerminateSync(1), "A", ""),
    ])
    .await
    .unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidSpec { .. }), "{err:?}");
}

#[tokio::test(start_paused = true)]
async fn failure_in_phase_one_fails_the_run() {
    let err = run(vec![
        spec(Mock::ProvideAfter(5), "A", ""),
        spec(Mock::ErrorAfter(5, "B cannot connect"), "B", "A"),
        spec(Mock::TerminateSync(0), "C", "B"),
    ])
    .await
    .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::Service(ServiceError::fail("B cannot connect"))
    );
}

#[tokio::test(start_paused = true)]
async fn failure_in_phase_two_fails_the_run() {
    let err = run(vec![
        spec(Mock::ProvideAfter(5), "A", ""),
        spec(Mock::ProvideAfterThenError(5, "B teardown failed"), "B", "A"),
        spec(Mock::TerminateSync(0), "C", "B"),
    ])
    .await
    .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::Service(ServiceError::fail("B teardown failed"))
    );
}

#[tokio::test(start_paused = true)]
async fn sibling_failure_is_returned_fast() {
    let started = Instant::now();
    let err = run(vec![
        spec(Mock::ProvideAfter(1_000), "slow", ""),
        spec(Mock::ErrorAfter(5, "fast failure"), "fast", ""),
        spec(Mock::TerminateSync(0), "root", "slow fast"),
    ])
    .await
    .unwrap_err();

    assert_eq!(err, RuntimeError::Service(ServiceError::fail("fast failure")));
    assert!(started.elapsed() < Duration::from_millis(1_000));
}

#[tokio::test]
async fn root_cannot_hand_off() {
    let err = run(vec![
        spec(Mock::ProvideSync, "A", ""),
        spec(Mock::ProvideSync, "B", "A"),
    ])
    .await
    .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::Service(ServiceError::HandoffAtRoot { service: "B".into() })
    );
}

#[tokio::test]
async fn service_with_dependents_must_hand_off() {
    let err = run(vec![
        spec(Mock::TerminateSync(0), "A", ""),
        spec(Mock::TerminateSync(0), "B", "A"),
    ])
    .await
    .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::Service(ServiceError::MissingHandoff { service: "A".into() })
    );
}

#[tokio::test]
async fn panicking_service_fails_the_run() {
    let panics = ServiceFn::arc(|_r: Registry, _h: Handoff| async {
        if true {
            panic!("redis exploded");
        }
        Ok(Exit::SUCCESS)
    });
    let err = run(vec![
        spec(Mock::ProvideSync, "A", ""),
        ServiceSpec::new("B", panics).after(["A"]),
    ])
    .await
    .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::Service(ServiceError::Panicked {
            service: "B".into(),
            info: "redis exploded".into()
        })
    );
}

#[tokio::test]
async fn registry_is_the_union_of_all_ancestors() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_root = Arc::clone(&seen);
    let root = ServiceFn::arc(move |registry: Registry, _h: Handoff| {
        let seen = Arc::clone(&seen_in_root);
        async move {
            *seen.lock().unwrap() = registry.keys();
            let config = registry.get::<&str>("config").map(|c| *c);
            Ok(Exit::new(i32::from(config != Some("config"))))
        }
    });

    let code = run(vec![
        spec(Mock::ProvideSync, "config", ""),
        spec(Mock::ProvideSync, "redis", "config"),
        spec(Mock::ProvideSync, "mongo", "config"),
        spec(Mock::ProvideSync, "http", "redis mongo"),
        ServiceSpec::new("signals", root).after(["http"]),
    ])
    .await
    .unwrap();

    assert_eq!(code, Exit::SUCCESS);
    let mut keys = seen.lock().unwrap().clone();
    keys.sort();
    assert_eq!(keys, ["config", "http", "mongo", "redis"]);
}

#[tokio::test]
async fn custom_reducer_replaces_bitwise_or() {
    let specs = |log: &Arc<Mutex<Vec<String>>>| {
        vec![
            recorded(log, "A1", 5, ""),
            recorded(log, "A2", 3, ""),
            recorded(log, "B", 0, "A1 A2"),
        ]
    };
    let log = Arc::new(Mutex::new(Vec::new()));

    let code = run(specs(&log)).await.unwrap();
    assert_eq!(code, Exit::new(7));

    let code = Bootstrap::builder(Config::default())
        .with_reducer(|a: Exit, b: Exit| Exit::new(a.code().max(b.code())))
        .build()
        .run(specs(&log))
        .await
        .unwrap();
    assert_eq!(code, Exit::new(5));
}

#[tokio::test]
async fn subscribers_see_every_event_before_run_returns() {
    let collect = Arc::new(Collect::default());
    let boot = Bootstrap::builder(Config::default())
        .with_subscribers(vec![collect.clone() as Arc<dyn Subscribe>])
        .build();

    let code = boot
        .run(vec![
            spec(Mock::ProvideSync, "A", ""),
            spec(Mock::TerminateSync(7), "B", "A"),
        ])
        .await
        .unwrap();
    assert_eq!(code, Exit::new(7));

    let events = collect.events.lock().unwrap();
    let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
    assert_eq!(kinds.first(), Some(&EventKind::GraphBuilt));
    assert_eq!(kinds.last(), Some(&EventKind::RunCompleted));
    assert_eq!(
        kinds.iter().filter(|k| **k == EventKind::ServiceStarting).count(),
        2
    );
    assert_eq!(events.last().and_then(|e| e.code), Some(7));

    let seqs: Vec<u64> = events.iter().map(|e| e.seq).collect();
    assert!(seqs.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn log_fn_receives_failure_lines() {
    let lines = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = Arc::clone(&lines);
    let logger = LogFn::new(move |line: &str| sink.lock().unwrap().push(line.to_string()));

    let boot = Bootstrap::builder(Config::default())
        .with_subscribers(vec![Arc::new(logger) as Arc<dyn Subscribe>])
        .build();
    let _ = boot
        .run(vec![
            spec(Mock::ProvideSync, "A", ""),
            spec(Mock::ErrorAfter(0, "boom"), "B", "A"),
        ])
        .await
        .unwrap_err();

    let lines = lines.lock().unwrap();
    assert!(lines.iter().any(|l| l.starts_with("[failed] service=B")), "{lines:?}");
    assert!(lines.last().is_some_and(|l| l.starts_with("[run-failed]")), "{lines:?}");
}
