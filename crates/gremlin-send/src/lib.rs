mod errors;
pub use errors::SendError;

mod sender;
pub use sender::{HttpSender, SendRequest, SendResult, forward_url};
