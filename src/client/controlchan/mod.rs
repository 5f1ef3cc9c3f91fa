//! Contains code pertaining to the FTP *control* channel

pub(crate) mod command;
pub(crate) use command::{Command, UserCommand};

pub(crate) mod line_parser;

pub(crate) mod error;
pub(crate) use error::{ControlChanError, ControlChanErrorKind};

pub(crate) mod codecs;
pub(crate) use codecs::ControlCodec;

mod reply;
pub use reply::Reply;
pub(crate) use reply::ReplyCode;

mod classify;
pub use classify::{Directive, classify};

pub(crate) mod listener;
pub(crate) use listener::ResponseListener;

pub(crate) mod dispatcher;
pub(crate) use dispatcher::CommandDispatcher;
