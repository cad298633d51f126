//! On-demand system metrics for the status surface.

use serde::Serialize;
use sysinfo::{Components, System};

/// Point-in-time host metrics. Optional fields are `None` where the
/// platform does not expose the sensor.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    /// Global CPU usage percentage.
    pub cpu_usage: f32,
    /// Used memory as a percentage of total, when total is known.
    pub memory_used: Option<f32>,
    /// Seconds since host boot.
    pub uptime: u64,
    /// First reported component temperature in Celsius, when available.
    pub cpu_temp: Option<f32>,
}

/// Collects [`SystemStatus`] snapshots.
///
/// CPU usage is computed between refreshes, so the collector is primed at
/// construction and each snapshot reflects activity since the previous one.
pub struct SystemMonitor {
    system: System,
}

impl SystemMonitor {
    /// Create a primed collector.
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        system.refresh_memory();
        Self { system }
    }

    /// Take a snapshot of current metrics.
    #[allow(clippy::cast_precision_loss)]
    pub fn status(&mut self) -> SystemStatus {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        let total = self.system.total_memory();
        let memory_used = if total == 0 {
            None
        } else {
            Some(self.system.used_memory() as f32 / total as f32 * 100.0)
        };
        let cpu_temp = Components::new_with_refreshed_list()
            .iter()
            .map(sysinfo::Component::temperature)
            .find(|temp| temp.is_finite());

        SystemStatus {
            cpu_usage: self.system.global_cpu_info().cpu_usage(),
            memory_used,
            uptime: System::uptime(),
            cpu_temp,
        }
    }
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new()
    }
}
