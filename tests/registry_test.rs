//! Concurrency tests for the agent registry.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use agentgate::agent::{AgentRegistry, Metadata, SharedAgent};
use agentgate::config::AgentConfig;
use common::{Reply, StubAgent};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_access_constructs_once() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = constructed.clone();
    let registry = AgentRegistry::new(AgentConfig::default()).register("slow", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        // Widen the race window while the per-type lock is held.
        std::thread::sleep(Duration::from_millis(20));
        Ok(StubAgent::shared(Reply::Failure("x".into()), &["slow"]))
    });

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move { registry.get_or_create("slow").await.unwrap() })
        })
        .collect();

    let mut agents: Vec<SharedAgent> = Vec::new();
    for handle in handles {
        agents.push(handle.await.unwrap());
    }

    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    assert!(agents.iter().all(|a| Arc::ptr_eq(a, &agents[0])));
    assert_eq!(registry.cached_len().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_different_types_construct_independently() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let registry = common::stub_registry(
        Reply::Success("hello".into(), Metadata::new()),
        Reply::Success("summary".into(), Metadata::new()),
        constructed.clone(),
    );

    let (chat, search) = tokio::join!(
        registry.get_or_create("chat"),
        registry.get_or_create("search")
    );
    let (chat, search) = (chat.unwrap(), search.unwrap());

    assert!(!Arc::ptr_eq(&chat, &search));
    assert_eq!(chat.capabilities(), vec!["chat"]);
    assert_eq!(constructed.load(Ordering::SeqCst), 2);
}
