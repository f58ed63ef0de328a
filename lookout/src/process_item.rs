use std::any::Any;
use std::fmt::Debug;

use flume::Receiver;
use flume::Sender;

use crate::ExitReason;
use crate::Message;
use crate::Pid;
use crate::Reference;
use crate::SystemMessage;

/// The sending half of a process's mailbox.
pub(crate) type ProcessSend = Sender<ProcessItem>;
/// The receiving half of a process's mailbox.
pub(crate) type ProcessReceive = Receiver<ProcessItem>;

/// An item in a process's mailbox.
pub(crate) enum ProcessItem {
    /// Sent from a process on the same node.
    UserLocalMessage(Box<dyn Any + Send>),
    /// Sent from the runtime.
    SystemMessage(SystemMessage),
    /// Sent when a monitored process goes down, only surfaced if the monitor is still active.
    MonitorProcessDown(Pid, Reference, ExitReason),
}

impl From<SystemMessage> for ProcessItem {
    fn from(value: SystemMessage) -> Self {
        Self::SystemMessage(value)
    }
}

impl<T> From<Message<T>> for ProcessItem
where
    T: Send + 'static,
{
    fn from(value: Message<T>) -> Self {
        match value {
            Message::User(user) => Self::UserLocalMessage(Box::new(user)),
            Message::System(system) => Self::SystemMessage(system),
        }
    }
}

impl Debug for ProcessItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserLocalMessage(_) => write!(f, "UserLocalMessage(..)"),
            Self::SystemMessage(system) => write!(f, "SystemMessage({:?})", system),
            Self::MonitorProcessDown(pid, reference, exit_reason) => write!(
                f,
                "MonitorProcessDown({:?}, {:?}, {:?})",
                pid, reference, exit_reason
            ),
        }
    }
}
