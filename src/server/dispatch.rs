use log::{error, info};
use zbus::{
    message::{Header, Type as MessageType},
    names::{InterfaceName, MemberName},
    Message,
};

use super::{
    bus::{MessageHandler, Outcome},
    host::Host,
};
use crate::interface::{
    signature_mismatch, COMMIT_METHOD, INTERFACE_NAME, INTROSPECTABLE_INTERFACE,
    INTROSPECTION_XML, INTROSPECT_METHOD, UNKNOWN_METHOD_ERROR,
};

/// Answers calls addressed to the commit object.  Holds nothing between calls
/// besides the host it commits into.
#[derive(Debug)]
pub struct Dispatcher<H> {
    host: H,
}

impl<H: Host> Dispatcher<H> {
    pub fn new(host: H) -> Self { Self { host } }

    fn introspect(hdr: &Header<'_>) -> zbus::Result<Message> {
        Message::method_return(hdr)?.build(&(INTROSPECTION_XML,))
    }

    fn commit(&self, msg: &Message, hdr: &Header<'_>) -> zbus::Result<Message> {
        let body = msg.body();
        // A body typed `s` can still fail to decode, e.g. a string holding NUL
        let text = match body.deserialize::<(String,)>() {
            Ok((text,)) => text,
            Err(e) => {
                let sig = body.signature().to_string_no_parens();
                info!("Rejecting {COMMIT_METHOD} call with signature ({sig}): {e}");

                return Message::error(hdr, UNKNOWN_METHOD_ERROR)?
                    .build(&(signature_mismatch(&sig),));
            },
        };

        if let Some(session) = self.host.current_session() {
            self.host.commit_string(&session, &text);
            info!("Commit string: {text}");
        } else {
            info!("No input context is focused, cannot commit string");
        }

        Message::method_return(hdr)?.build(&())
    }
}

impl<H: Host> MessageHandler for Dispatcher<H> {
    fn handle_message(&self, msg: &Message) -> Outcome {
        if msg.message_type() != MessageType::MethodCall {
            return Outcome::Unhandled;
        }

        let hdr = msg.header();
        let reply = match (
            hdr.interface().map(InterfaceName::as_str),
            hdr.member().map(MemberName::as_str),
        ) {
            (Some(INTROSPECTABLE_INTERFACE), Some(INTROSPECT_METHOD)) => Self::introspect(&hdr),
            (Some(INTERFACE_NAME), Some(COMMIT_METHOD)) => self.commit(msg, &hdr),
            _ => return Outcome::Unhandled,
        };

        match reply {
            Ok(r) => Outcome::Reply(r),
            Err(e) => {
                error!("Error building reply message: {e}");
                Outcome::Dropped
            },
        }
    }
}
