mod catch_unwind;
mod cluster;
mod demonitor_options;
mod exit_reason;
mod local_node;
mod message;
mod monitor;
mod monitor_error;
mod monitor_service;
mod node;
mod node_options;
mod node_pattern;
mod pid;
mod process;
mod process_item;
mod process_monitor;
mod process_registration;
mod process_registry;
mod reference;
mod registry;
mod remote_ref;
mod service_inbox;
mod timeout;
mod transport;

pub mod frame;

pub use cluster::*;
pub use demonitor_options::*;
pub use exit_reason::*;
pub use local_node::*;
pub use message::*;
pub use monitor_error::*;
pub use node::*;
pub use node_options::*;
pub use node_pattern::*;
pub use pid::*;
pub use process::*;
pub use process_monitor::*;
pub use reference::*;
pub use registry::*;
pub use remote_ref::*;
pub use service_inbox::*;
pub use timeout::*;
pub use transport::*;

pub(crate) use catch_unwind::*;
pub(crate) use monitor::*;
pub(crate) use monitor_service::*;
pub(crate) use process_item::*;
pub(crate) use process_registration::*;
pub(crate) use process_registry::*;
