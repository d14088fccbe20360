use sysinfo::Networks;

/// Cumulative traffic counters summed across all interfaces.
///
/// Mirrors the "total bytes since boot" contract of the platform counter APIs:
/// callers diff successive readings to derive a rate.
pub struct TrafficProbe {
    networks: Networks,
}

impl TrafficProbe {
    /// `None` when the platform exposes no traffic counters at all; callers then
    /// report a permanent zero rate.
    pub fn probe() -> Option<Self> {
        let networks = Networks::new_with_refreshed_list();
        if networks.iter().next().is_none() {
            return None;
        }
        Some(Self { networks })
    }

    /// Refresh and return the cumulative (rx, tx) byte totals.
    pub fn totals(&mut self) -> (u64, u64) {
        self.networks.refresh(true);
        let mut rx = 0u64;
        let mut tx = 0u64;
        for data in self.networks.values() {
            rx = rx.saturating_add(data.total_received());
            tx = tx.saturating_add(data.total_transmitted());
        }
        (rx, tx)
    }
}
