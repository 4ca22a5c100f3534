//! Geosketch is an interactive vector-geometry editing engine for map
//! applications: the state machine that lets a user construct, select,
//! cut/extend and commit point, line and polygon features on top of a live
//! map view, with GPS-stream vertex insertion and persistence to a spatial
//! store.
//!
//! The engine draws nothing and stores nothing itself. The host application
//! provides four collaborators:
//!
//! * a [`MapView`](map::MapView) that translates between screen pixels and
//!   geographic coordinates,
//! * a [`SpatialStore`](store::SpatialStore) that queries and persists
//!   features,
//! * a [`Messenger`](messenger::Messenger) through which the engine requests
//!   redraws and map refreshes,
//! * a [`Feedback`](messenger::Feedback) surface for warnings and toasts.
//!
//! Everything runs through an [`EditSession`]:
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use geosketch::{EditSession, EditorState};
//! # use geosketch::store::EditableLayer;
//! # fn collaborators() -> (Arc<dyn geosketch::map::MapView>, Arc<dyn geosketch::store::SpatialStore>, Arc<dyn geosketch::messenger::Messenger>) { unimplemented!() }
//! # let (map, store, messenger) = collaborators();
//! # let layer: EditableLayer = unimplemented!();
//! let mut session = EditSession::builder()
//!     .with_map(map)
//!     .with_store(store)
//!     .with_messenger(messenger)
//!     .build()?;
//!
//! session.set_editable_layer(Some(layer));
//! session.start_create()?;
//! // feed pointer events, palette actions and GPS updates...
//! // ...and poll completed background work once per frame:
//! session.poll();
//! assert_eq!(session.state(), EditorState::Creating);
//! # Ok::<(), geosketch::EditError>(())
//! ```
//!
//! The session owns the active editable layer and the active tool group,
//! replacing the global edit-manager singleton of its ancestors. Tool groups
//! interpret pointer events ([`control`]), accumulate candidate geometry
//! ([`builder`]), run spatial queries and commits on a background task
//! ([`store`]), and derive a styled overlay ([`render`]) as a pure function
//! of their state every frame.

pub(crate) mod async_runtime;
pub mod builder;
pub mod control;
pub mod error;
pub mod feature;
pub mod geometry;
pub mod map;
pub mod messenger;
pub mod render;
pub mod session;
pub mod store;
mod tasks;
pub mod tools;

#[cfg(any(test, feature = "_tests"))]
pub mod tests;

pub use error::{EditError, StoreError};
pub use geosketch_types;
pub use render::Color;
pub use session::{EditOptions, EditSession, EditSessionBuilder};
pub use tools::{CutExtendOp, EditorState, ToolAction};
