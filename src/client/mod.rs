//! Client core: per-mode state, token estimate, validation and the submit
//! flow against the relay.

pub mod estimator;
pub mod orchestrator;
pub mod state;
pub mod transport;
pub mod validate;

pub use estimator::{estimate, TokenEstimate};
pub use orchestrator::{ClientError, Phase, TaskOrchestrator};
pub use state::{ModeState, TaskMode, TopicVariant, CHAT_WELCOME};
pub use transport::{HttpRelayTransport, RelayResponse, RelayTransport, TransportError};
pub use validate::ValidationError;
