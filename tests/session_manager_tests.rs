mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ScriptedBackend, shared};
use lionwell::services::chat_session::SessionSettings;
use lionwell::services::session_manager::SessionManager;
use tokio::time::sleep;

fn manager(ttl: Duration) -> (SessionManager, Arc<ScriptedBackend>) {
    let backend = shared(ScriptedBackend::gated(vec![]));
    let mgr = SessionManager::new(backend.clone(), SessionSettings::default(), ttl);
    (mgr, backend)
}

#[tokio::test]
async fn basic_session_flow() {
    let (mgr, _) = manager(Duration::from_secs(60));
    let session = mgr.create_session().await;
    assert!(!session.id().is_empty());

    let found = mgr.get(session.id()).await.unwrap();
    assert!(Arc::ptr_eq(&found, &session));
    assert_eq!(mgr.list_session_ids().await, vec![session.id().to_string()]);

    assert!(mgr.remove_session(session.id()).await);
    assert!(mgr.get(session.id()).await.is_none());
}

#[tokio::test]
async fn sessions_are_independent() {
    let (mgr, backend) = manager(Duration::from_secs(60));
    backend.release(1);
    let a = mgr.create_session().await;
    let b = mgr.create_session().await;
    assert_ne!(a.id(), b.id());

    a.send_message("only in a").await.unwrap();
    assert_eq!(a.messages().len(), 3);
    assert_eq!(b.messages().len(), 1);
}

#[tokio::test]
async fn test_session_expiration() {
    let (mgr, _) = manager(Duration::from_millis(10));
    let sid = mgr.create_session().await.id().to_string();

    // Wait for expiration
    sleep(Duration::from_millis(20)).await;

    let removed_count = mgr.purge_expired().await;
    assert_eq!(removed_count, 1, "Should have removed 1 expired session");
    assert!(
        !mgr.remove_session(&sid).await,
        "Session should already be gone"
    );
}

#[tokio::test]
async fn busy_sessions_survive_purge() {
    let (mgr, backend) = manager(Duration::from_millis(10));
    let session = mgr.create_session().await;

    let task = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.send_message("slow").await }
    });
    let mut rx = session.subscribe();
    rx.wait_for(|s| s.is_request_in_flight).await.unwrap();

    sleep(Duration::from_millis(20)).await;
    assert_eq!(mgr.purge_expired().await, 0);

    backend.release(1);
    task.await.unwrap().unwrap();
    sleep(Duration::from_millis(20)).await;
    assert_eq!(mgr.purge_expired().await, 1);
}
