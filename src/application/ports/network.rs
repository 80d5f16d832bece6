use tokio::sync::watch;

/// Observer over the platform connectivity signal. One shared instance per
/// process is sufficient; there is a single physical link.
pub trait NetworkMonitor: Send + Sync {
    fn is_online(&self) -> bool;

    /// Subscribe to connectivity transitions. The channel yields the new
    /// state; a transition is published exactly once per edge.
    fn subscribe(&self) -> watch::Receiver<bool>;
}
