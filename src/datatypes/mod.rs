mod buffer_status;
mod command;
pub mod reply;
mod session_status;
mod status;

pub use buffer_status::{BufferStatus, SBDSX_PREFIX};
pub use command::{AtCommand, CR, CommandSpec};
pub use session_status::{SBDIX_PREFIX, SessionStatus};
pub use status::{MoOutcome, MoStatus, MtStatus, classify_mo, describe_mo};
