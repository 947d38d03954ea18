pub mod config;
pub mod credential;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod protocol;
pub mod router;
pub mod session;
pub mod tools;
pub mod transcript;
pub mod transport;

pub use config::Config;
pub use credential::{Credential, CredentialFetcher, HttpCredentialFetcher, StaticCredentialFetcher};
pub use dispatcher::FunctionCallDispatcher;
pub use error::{DispatchError, MalformedEventError, SessionError};
pub use http::{create_router, AppState};
pub use protocol::{
    ClientEvent, FunctionCallRequest, FunctionCallResult, ServerEvent, ToolDescriptor,
    VoiceDetection,
};
pub use router::ControlRouter;
pub use session::{SessionConfig, SessionController, SessionState};
pub use tools::{ToolDefinition, ToolHandler, ToolRegistry};
pub use transcript::{Speaker, TranscriptEntry, TranscriptLog};
pub use transport::{
    HttpNegotiator, LoopbackFactory, LoopbackTransport, MediaTransport, Negotiator, RemotePeer,
    TransportFactory, TransportSession,
};
