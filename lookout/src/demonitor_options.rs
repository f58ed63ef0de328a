use bitflags::bitflags;

bitflags! {
    /// Options for [Process::demonitor_with](crate::Process::demonitor_with).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DemonitorOptions : u32 {
        /// Report whether or not the monitor was still active when it was cancelled.
        const INFO = 1 << 0;
    }
}
