use std::{
    collections::HashMap,
    fmt,
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use futures_util::StreamExt;
use log::{debug, error, trace, warn};
use zbus::{
    message::{Flags, Type as MessageType},
    zvariant::{ObjectPath, OwnedObjectPath},
    Connection, Message, MessageStream,
};

use crate::interface::{UNKNOWN_METHOD_ERROR, UNKNOWN_OBJECT_ERROR};

/// The result of offering one incoming message to a [`MessageHandler`]
#[derive(Debug, strum::Display)]
pub enum Outcome {
    /// The message was handled and this reply should be sent for it
    #[strum(to_string = "replied")]
    Reply(Message),
    /// The message was handled, but no reply could be built for it
    #[strum(to_string = "dropped")]
    Dropped,
    /// The handler has no opinion on this message
    #[strum(to_string = "unhandled")]
    Unhandled,
}

/// Receives every method call addressed to the object path it is registered
/// at
pub trait MessageHandler: Send + Sync {
    fn handle_message(&self, msg: &Message) -> Outcome;
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("{0:?} is not a valid object path")]
    InvalidPath(String),
    #[error("Object path {0} already has a handler registered")]
    PathTaken(OwnedObjectPath),
}

/// Binds message handlers to object paths on a connection
pub trait ObjectRegistry {
    /// Bind `handler` to `path`.  Fails without side effects if `path` is
    /// already bound.
    fn register_object_path(
        &self,
        path: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<(), RegisterError>;

    /// Release `path`, returning whether anything was bound to it
    fn unregister_object_path(&self, path: &str) -> bool;
}

type ObjectTable = HashMap<String, Arc<dyn MessageHandler>>;

/// A shared D-Bus connection with a table of object-path handlers
#[derive(Clone)]
pub struct Bus {
    conn: Connection,
    objects: Arc<Mutex<ObjectTable>>,
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paths = self
            .objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect::<Vec<_>>();

        f.debug_struct("Bus")
            .field("conn", &self.conn)
            .field("objects", &paths)
            .finish()
    }
}

impl Bus {
    /// Wrap `conn`, returning the handle and a future that routes incoming
    /// method calls until the connection closes.  The router must be polled
    /// for any handler to see traffic.
    pub fn new(conn: Connection) -> (Self, impl Future<Output = ()>) {
        let objects = Arc::new(Mutex::new(ObjectTable::new()));
        let msgs = MessageStream::from(conn.clone());

        let this = Self { conn, objects };
        let router = this.clone().route(msgs);

        (this, router)
    }

    #[inline]
    pub fn connection(&self) -> &Connection { &self.conn }

    fn handler_for(&self, path: &ObjectPath<'_>) -> Option<Arc<dyn MessageHandler>> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path.as_str())
            .map(Arc::clone)
    }

    async fn route(self, mut msgs: MessageStream) {
        while let Some(msg) = msgs.next().await {
            let msg = match msg {
                Ok(m) => m,
                Err(e) => {
                    warn!("Error reading incoming message: {e}");
                    continue;
                },
            };

            if msg.message_type() != MessageType::MethodCall {
                continue;
            }

            self.dispatch(&msg).await;
        }

        debug!("Message stream closed, router exiting");
    }

    async fn dispatch(&self, msg: &Message) {
        let hdr = msg.header();
        let Some(path) = hdr.path() else { return };
        let no_reply = hdr.primary().flags().contains(Flags::NoReplyExpected);

        let reply = if let Some(handler) = self.handler_for(path) {
            let outcome = handler.handle_message(msg);
            trace!(
                "Call {:?}.{:?} on {path}: {outcome}",
                hdr.interface().map(|i| i.as_str()),
                hdr.member().map(|m| m.as_str()),
            );

            if no_reply {
                return;
            }

            match outcome {
                Outcome::Reply(reply) => Ok(reply),
                Outcome::Dropped => return,
                Outcome::Unhandled => Self::unknown_method(msg),
            }
        } else {
            trace!("Call to unbound path {path}");

            if no_reply {
                return;
            }

            Self::unknown_object(msg)
        };

        let reply = match reply {
            Ok(r) => r,
            Err(e) => {
                error!("Error building fallback reply for call to {path}: {e}");
                return;
            },
        };

        if let Err(e) = self.conn.send(&reply).await {
            warn!("Error sending reply to {path}: {e}");
        }
    }

    fn unknown_method(msg: &Message) -> zbus::Result<Message> {
        let hdr = msg.header();
        let text = format!(
            "No such method {:?} on interface {:?} at object path {}",
            hdr.member().map_or("", |m| m.as_str()),
            hdr.interface().map_or("", |i| i.as_str()),
            hdr.path().map_or("", |p| p.as_str()),
        );

        Message::error(&hdr, UNKNOWN_METHOD_ERROR)?.build(&(text,))
    }

    fn unknown_object(msg: &Message) -> zbus::Result<Message> {
        let hdr = msg.header();
        let text = format!(
            "No such object path {}",
            hdr.path().map_or("", |p| p.as_str()),
        );

        Message::error(&hdr, UNKNOWN_OBJECT_ERROR)?.build(&(text,))
    }
}

impl ObjectRegistry for Bus {
    fn register_object_path(
        &self,
        path: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<(), RegisterError> {
        let path = OwnedObjectPath::try_from(path)
            .map_err(|_| RegisterError::InvalidPath(path.to_owned()))?;
        let mut objects = self.objects.lock().unwrap_or_else(PoisonError::into_inner);

        if objects.contains_key(path.as_str()) {
            return Err(RegisterError::PathTaken(path));
        }

        debug!("Registered handler at {path}");
        objects.insert(path.to_string(), handler);

        Ok(())
    }

    fn unregister_object_path(&self, path: &str) -> bool {
        let Ok(path) = ObjectPath::try_from(path) else {
            return false;
        };

        let removed = self
            .objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path.as_str())
            .is_some();

        if removed {
            debug!("Unregistered handler at {path}");
        }

        removed
    }
}
