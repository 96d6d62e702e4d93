pub mod listener;
pub mod manager;
pub mod session;

pub use listener::{SessionEvent, SessionListener};
pub use manager::SessionManager;
pub use session::{ResultReply, SearchSession, SessionState};
