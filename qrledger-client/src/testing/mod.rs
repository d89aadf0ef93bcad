//! In-process fakes for the client's seams, shared by unit and
//! integration tests.

mod decoder;
mod network;
mod registry;
mod surface;
pub mod time;

pub use decoder::{DecoderHandle, ScriptedDecoder};
pub use network::StubNetwork;
pub use registry::InMemoryRegistry;
pub use surface::{RecordingNotifier, RecordingSurface};
pub use time::VirtualTimeProvider;
