pub mod email_sender;
pub mod push_sender;

#[cfg(test)]
mod test_server;

pub use email_sender::{EmailSender, EmailTransport, HttpEmailTransport, OutboundEmail};
pub use push_sender::{PushPayload, PushSender, PushTransport, WebPushTransport};
