use crate::application::ports::NetworkMonitor;
use tokio::sync::watch;
use tracing::info;

/// Connectivity state fed by the embedding application (platform reachability
/// callbacks, heartbeat probes). Publishes one message per edge.
pub struct ConnectivityMonitor {
    tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (tx, _) = watch::channel(initially_online);
        Self { tx }
    }

    /// Report the current link state. Repeated reports of the same state are
    /// absorbed; subscribers only see transitions.
    pub fn set_online(&self, online: bool) {
        let changed = self.tx.send_if_modified(|state| {
            if *state == online {
                return false;
            }
            *state = online;
            true
        });
        if changed {
            info!(
                "connectivity changed: {}",
                if online { "online" } else { "offline" }
            );
        }
    }
}

impl NetworkMonitor for ConnectivityMonitor {
    fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_reports_do_not_publish_an_edge() {
        let monitor = ConnectivityMonitor::new(true);
        let mut rx = monitor.subscribe();

        monitor.set_online(true);
        assert!(!rx.has_changed().unwrap());

        monitor.set_online(false);
        assert!(rx.has_changed().unwrap());
        rx.changed().await.unwrap();
        assert!(!*rx.borrow());
        assert!(!monitor.is_online());
    }
}
