pub mod classifier;
pub mod clock;
pub mod config;
pub mod conversation;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use classifier::{
    Classifier, ClassifierResult, ClassifyError, FlowerCheckClient, CONNECTION_ERROR_REPLY,
    FALLBACK_REPLY,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use conversation::Conversation;
pub use session::{ChatSession, PendingRequest, RequestState};
pub use state::{Message, Role, GREETING};
