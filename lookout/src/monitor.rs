use std::collections::BTreeMap;

use dashmap::DashMap;

use crate::frame::Demonitor;

use crate::ExitReason;
use crate::NodeRuntime;
use crate::Pid;
use crate::ProcessItem;
use crate::Reference;
use crate::ServiceMessage;
use crate::PROCESS;

/// The native monitors of a node, keyed by the monitored process id.
#[derive(Default)]
pub struct MonitorTable {
    monitors: DashMap<u64, BTreeMap<Reference, Pid>>,
}

impl MonitorTable {
    /// Creates a monitor on the local process `target` for `watcher`.
    pub fn create(&self, target: u64, reference: Reference, watcher: Pid) {
        self.monitors
            .entry(target)
            .or_default()
            .insert(reference, watcher);
    }

    /// Destroys a monitor, returns `false` if it already fired or was never created.
    pub fn destroy(&self, target: u64, reference: &Reference) -> bool {
        let removed = match self.monitors.get_mut(&target) {
            Some(mut references) => references.remove(reference).is_some(),
            None => return false,
        };

        self.monitors
            .remove_if(&target, |_, references| references.is_empty());

        removed
    }

    /// Takes every monitor installed on `target`.
    pub fn take(&self, target: u64) -> BTreeMap<Reference, Pid> {
        self.monitors
            .remove(&target)
            .map(|(_, references)| references)
            .unwrap_or_default()
    }

    /// Returns the number of monitored processes.
    pub fn len(&self) -> usize {
        self.monitors.len()
    }
}

impl NodeRuntime {
    /// Installs a native monitor from the current process on the local process `target`.
    ///
    /// If `target` is not alive the monitor fires right away with `noproc`.
    pub(crate) fn monitor_install(&self, target: &Pid) -> Reference {
        let reference = Reference::new(self.node().clone());
        let watcher = PROCESS.with(|process| {
            process
                .monitors
                .borrow_mut()
                .insert(reference.clone(), target.clone());

            process.pid.clone()
        });

        self.monitors
            .create(target.id(), reference.clone(), watcher.clone());

        // The target may have exited before the monitor was in the table.
        if !self.processes.alive(target.id()) && self.monitors.destroy(target.id(), &reference) {
            self.deliver(
                &watcher,
                ProcessItem::MonitorProcessDown(target.clone(), reference.clone(), ExitReason::noproc()),
            );
        }

        reference
    }

    /// Cancels a native monitor held by the current process, flushing a pending notification.
    ///
    /// Returns `false` if the monitor already fired or was cancelled before.
    pub(crate) fn monitor_cancel(&self, reference: &Reference) -> bool {
        let Some(target) =
            PROCESS.with(|process| process.monitors.borrow_mut().remove(reference))
        else {
            return false;
        };

        self.monitors.destroy(target.id(), reference)
    }

    /// Notifies the watchers of `process` that it went down for the given reason.
    pub(crate) fn monitor_process_down(&self, process: &Pid, exit_reason: ExitReason) {
        for (reference, watcher) in self.monitors.take(process.id()) {
            #[cfg(feature = "tracing")]
            tracing::trace!(process = ?process, watcher = ?watcher, reference = ?reference, "Native monitor fired");

            self.deliver(
                &watcher,
                ProcessItem::MonitorProcessDown(process.clone(), reference, exit_reason.clone()),
            );
        }
    }

    /// Releases the monitors still held by an exited process.
    pub(crate) fn monitor_release(&self, monitors: BTreeMap<Reference, Pid>) {
        for (reference, target) in monitors {
            if reference.node() == self.node() {
                self.monitors.destroy(target.id(), &reference);
                continue;
            }

            match self.service() {
                Some(service) => {
                    service.send(ServiceMessage::Release(reference, target));
                }
                None => {
                    self.transport
                        .forward(reference.node(), Demonitor::new((&reference).into()).into());
                }
            }
        }
    }
}
