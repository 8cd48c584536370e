//! Dashboard counters and their background refresh.

use std::time::Duration;

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::service::GateService;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorStats {
    /// Checked in since local midnight.
    pub today: usize,
    /// Still on the premises.
    pub active: usize,
    /// Not yet pushed to a remote system.
    pub pending_sync: usize,
}

/// Midnight of the day containing `now`, in `now`'s own zone.
pub fn start_of_local_day<Tz: TimeZone>(now: DateTime<Tz>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match now.timezone().from_local_datetime(&midnight).earliest() {
        Some(start) => start.with_timezone(&Utc),
        // no midnight that day (DST jump); count from the same wall-clock distance
        None => now.with_timezone(&Utc) - (now.naive_local() - midnight),
    }
}

/// Re-reads [`VisitorStats`] on a fixed period and publishes the latest value.
///
/// The refresh task is aborted by [`StatsPoller::stop`] or on drop.
pub struct StatsPoller {
    rx: watch::Receiver<VisitorStats>,
    handle: JoinHandle<()>,
}

impl StatsPoller {
    /// Start polling; the first refresh happens immediately.
    pub fn spawn(service: GateService, period: Duration) -> Self {
        let (tx, rx) = watch::channel(VisitorStats::default());

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                match service.stats().await {
                    Ok(stats) => {
                        debug!(?stats, "Visitor stats refreshed");
                        if tx.send(stats).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, "Visitor stats refresh failed"),
                }
            }
        });

        Self { rx, handle }
    }

    /// Most recently published value.
    pub fn latest(&self) -> VisitorStats {
        *self.rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<VisitorStats> {
        self.rx.clone()
    }

    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for StatsPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use gatepass_store::Database;
    use tokio::time::timeout;

    use crate::checkin::CheckInForm;
    use gatepass_shared::photo::Photo;
    use gatepass_shared::VisitorType;

    #[test]
    fn test_start_of_local_day() {
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        // 2023-11-15 03:43:20 in IST
        let now = DateTime::from_timestamp_millis(1_700_000_000_000)
            .unwrap()
            .with_timezone(&ist);

        let start = start_of_local_day(now);
        assert_eq!(start.to_rfc3339(), "2023-11-14T18:30:00+00:00");
        assert_eq!(start_of_local_day(start.with_timezone(&ist)), start);
    }

    #[tokio::test]
    async fn test_poller_publishes_and_stops() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("gatepass.db")).unwrap();
        let service = GateService::new(db);

        let mut form = CheckInForm::new(VisitorType::Parent);
        form.name = "Jane Doe".into();
        form.set_mobile("9876501234");
        form.student_name = "Sam".into();
        form.student_class = "KG".into();
        form.student_section = "A".into();
        form.host_name = "Admissions".into();
        service
            .check_in(&form, Photo::from_jpeg(&[1, 2]), "1")
            .await
            .unwrap();

        let poller = StatsPoller::spawn(service.clone(), Duration::from_millis(20));
        let mut rx = poller.subscribe();
        timeout(Duration::from_secs(5), rx.wait_for(|s| s.active == 1))
            .await
            .unwrap()
            .unwrap();

        let stats = poller.latest();
        assert_eq!(stats.today, 1);
        assert_eq!(stats.pending_sync, 1);
        assert!(poller.is_running());

        drop(poller);
        let closed = timeout(Duration::from_secs(5), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok());
    }
}
