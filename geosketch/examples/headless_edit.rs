//! Drives an editing session against an in-memory store without a UI.
//!
//! Run with `cargo run --example headless_edit`.

use std::sync::Arc;

use geosketch::control::RawPointerEvent;
use geosketch::feature::SourceId;
use geosketch::geosketch_types::{latlon, GeometryKind, ScreenPoint};
use geosketch::store::EditableLayer;
use geosketch::tests::{CountingMessenger, FixedMap, MemoryStore, RecordingFeedback};
use geosketch::{EditSession, ToolAction};

#[tokio::main]
async fn main() {
    env_logger::init();

    let store = Arc::new(MemoryStore::default());
    let messenger = Arc::new(CountingMessenger::default());
    let feedback = Arc::new(RecordingFeedback::default());

    let mut session = EditSession::builder()
        .with_map(Arc::new(FixedMap::new(latlon!(45.0, 11.0), 100.0)))
        .with_store(store.clone())
        .with_messenger(messenger)
        .with_feedback(feedback.clone())
        .build()
        .expect("all collaborators provided");

    session.set_editable_layer(Some(EditableLayer::new(
        SourceId::from("demo.sqlite"),
        "tracks",
        GeometryKind::Line,
    )));

    session.start_create().expect("layer is set");
    session.action(ToolAction::ToggleTapToAdd);

    for (x, y) in [(300.0, 300.0), (310.0, 290.0), (320.0, 300.0)] {
        session.handle_event(RawPointerEvent::PointerDown(ScreenPoint::new(x, y)));
        session.handle_event(RawPointerEvent::PointerUp(ScreenPoint::new(x, y)));
    }
    println!("commit ready: {}", session.commit_ready());

    session.action(ToolAction::Commit);
    while session.is_busy() {
        tokio::task::yield_now().await;
    }
    session.poll();

    println!("state after commit: {:?}", session.state());
    println!("features in store: {}", store.count("tracks"));
    for toast in feedback.toasts() {
        println!("toast: {toast}");
    }
}
