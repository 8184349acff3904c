//! Network actor - samples connectivity on a timer and on change notifications

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;

use crate::messages::{NetworkCommand, NetworkUpdate, SampleSource};
use crate::network::client::LatencyProbe;
use crate::network::connectivity::ConnectivitySource;
use crate::network::stats::{NetworkStats, StatsSample};

/// Network actor owning the single stats cell.
///
/// Three triggers feed it: the interval timer (first tick fires at once),
/// connectivity change notifications and `Resample` commands. Every write
/// goes through `NetworkStats::merge`, after which a snapshot is published.
pub struct NetworkActor {
    stats: NetworkStats,
    interval: Duration,
    source: Arc<dyn ConnectivitySource>,
    probe: Arc<dyn LatencyProbe>,
    update_tx: mpsc::UnboundedSender<NetworkUpdate>,
    probes: JoinSet<Option<(u32, DateTime<Utc>)>>,
}

impl NetworkActor {
    pub fn new(
        interval: Duration,
        source: Arc<dyn ConnectivitySource>,
        probe: Arc<dyn LatencyProbe>,
        update_tx: mpsc::UnboundedSender<NetworkUpdate>,
    ) -> Self {
        NetworkActor {
            stats: NetworkStats::default(),
            interval: interval.max(Duration::from_millis(1)),
            source,
            probe,
            update_tx,
            probes: JoinSet::new(),
        }
    }

    /// Run the sampling loop until shutdown.
    ///
    /// The timer, the change registration and in-flight probes are all
    /// released when this returns, whichever way the loop ends.
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut changes = self.source.changes();

        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Network sampler started");

        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Resample) => {
                            tracing::debug!("Resample requested");
                            self.sample();
                        }
                        Some(NetworkCommand::Shutdown) | None => break,
                    }
                }

                _ = ticker.tick() => self.sample(),

                change = next_change(&mut changes) => {
                    match change {
                        Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                            tracing::debug!("Connectivity changed");
                            self.read_connectivity();
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            changes = None;
                        }
                    }
                }

                Some(joined) = self.probes.join_next() => {
                    match joined {
                        Ok(Some((rtt_ms, observed_at))) => {
                            self.apply(StatsSample::rtt(rtt_ms, observed_at), SampleSource::Probe);
                        }
                        // Failed probe: leave the stat stale until the next tick
                        Ok(None) => {}
                        Err(e) => tracing::warn!(error = %e, "Probe task failed"),
                    }
                }
            }

            if self.update_tx.is_closed() {
                tracing::debug!("Update receiver gone");
                break;
            }
        }

        drop(changes);
        self.probes.shutdown().await;
        tracing::info!("Network sampler stopped");
    }

    /// One sampling tick: passive read plus a new probe in flight.
    /// Probes from earlier ticks are not awaited.
    fn sample(&mut self) {
        self.read_connectivity();
        let probe = self.probe.probe();
        self.probes
            .spawn(async move { probe.await.map(|rtt| (rtt, Utc::now())) });
    }

    fn read_connectivity(&mut self) {
        if let Some(info) = self.source.current() {
            self.apply(info.to_sample(Utc::now()), SampleSource::Connectivity);
        }
    }

    fn apply(&mut self, sample: StatsSample, source: SampleSource) {
        self.stats.merge(sample);
        let _ = self.update_tx.send(NetworkUpdate {
            stats: self.stats.clone(),
            source,
        });
    }
}

async fn next_change(
    changes: &mut Option<broadcast::Receiver<()>>,
) -> Result<(), broadcast::error::RecvError> {
    match changes {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::connectivity::{ConnectionInfo, ManualConnectivity, NoConnectivityInfo};
    use crate::network::stats::Quality;
    use futures_util::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::task::JoinHandle;

    /// Probe replaying scripted (delay, result) pairs; repeats the last one
    struct ScriptedProbe {
        script: Vec<(Duration, Option<u32>)>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedProbe {
        fn fixed(rtt: Option<u32>) -> (Self, Arc<AtomicUsize>) {
            Self::script(vec![(Duration::ZERO, rtt)])
        }

        fn script(script: Vec<(Duration, Option<u32>)>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (ScriptedProbe { script, calls: calls.clone() }, calls)
        }
    }

    impl LatencyProbe for ScriptedProbe {
        fn probe(&self) -> BoxFuture<'static, Option<u32>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let (delay, rtt) = self.script[n.min(self.script.len() - 1)];
            Box::pin(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                rtt
            })
        }
    }

    fn broadband() -> ConnectionInfo {
        ConnectionInfo {
            downlink: Some(30.0),
            effective_type: Some("4g".into()),
            rtt: Some(100),
        }
    }

    fn start(
        interval_ms: u64,
        source: Arc<dyn ConnectivitySource>,
        probe: ScriptedProbe,
    ) -> (
        mpsc::UnboundedSender<NetworkCommand>,
        mpsc::UnboundedReceiver<NetworkUpdate>,
        JoinHandle<()>,
    ) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let actor = NetworkActor::new(
            Duration::from_millis(interval_ms),
            source,
            Arc::new(probe),
            update_tx,
        );
        let handle = tokio::spawn(actor.run(cmd_rx));
        (cmd_tx, update_rx, handle)
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_sample_is_immediate() {
        let source = Arc::new(ManualConnectivity::new(broadband()));
        let (probe, calls) = ScriptedProbe::fixed(Some(40));
        let (cmd_tx, mut updates, handle) = start(15_000, source, probe);

        let first = updates.recv().await.unwrap();
        assert_eq!(first.source, SampleSource::Connectivity);
        assert_eq!(first.stats.rtt_ms, Some(100));
        assert_eq!(first.stats.quality(), Quality::Ok);

        // Probe result overwrites the passive rtt: last write wins
        let second = updates.recv().await.unwrap();
        assert_eq!(second.source, SampleSource::Probe);
        assert_eq!(second.stats.rtt_ms, Some(40));
        assert_eq!(second.stats.downlink_mbps, Some(30.0));
        assert_eq!(second.stats.quality(), Quality::Good);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cmd_tx.send(NetworkCommand::Shutdown).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_resamples_on_interval() {
        let (probe, calls) = ScriptedProbe::fixed(Some(50));
        let (cmd_tx, _updates, handle) = start(1_000, Arc::new(NoConnectivityInfo), probe);

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        cmd_tx.send(NetworkCommand::Shutdown).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_notification_triggers_read() {
        let source = Arc::new(ManualConnectivity::new(broadband()));
        let (probe, calls) = ScriptedProbe::fixed(None);
        let (cmd_tx, mut updates, handle) = start(60_000, source.clone(), probe);

        let initial = updates.recv().await.unwrap();
        assert_eq!(initial.stats.downlink_mbps, Some(30.0));

        source.set(ConnectionInfo {
            downlink: Some(1.5),
            effective_type: Some("3g".into()),
            rtt: None,
        });
        let changed = updates.recv().await.unwrap();
        assert_eq!(changed.source, SampleSource::Connectivity);
        assert_eq!(changed.stats.downlink_mbps, Some(1.5));
        assert_eq!(changed.stats.effective_type.as_deref(), Some("3g"));
        // rtt absent from the change keeps the earlier value
        assert_eq!(changed.stats.rtt_ms, Some(100));
        assert_eq!(changed.stats.quality(), Quality::Poor);
        // Change handling does not start a probe
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cmd_tx.send(NetworkCommand::Shutdown).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_probe_publishes_nothing() {
        let (probe, calls) = ScriptedProbe::fixed(None);
        let (cmd_tx, mut updates, handle) = start(1_000, Arc::new(NoConnectivityInfo), probe);

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(updates.try_recv().is_err());

        cmd_tx.send(NetworkCommand::Shutdown).unwrap();
        handle.await.unwrap();
        assert!(updates.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_probes_last_write_wins() {
        let (probe, _calls) = ScriptedProbe::script(vec![
            (Duration::from_millis(2_500), Some(300)),
            (Duration::ZERO, Some(20)),
            (Duration::from_secs(3_600), Some(1)),
        ]);
        let (cmd_tx, mut updates, handle) = start(1_000, Arc::new(NoConnectivityInfo), probe);

        let fast = updates.recv().await.unwrap();
        assert_eq!(fast.stats.rtt_ms, Some(20));
        let slow = updates.recv().await.unwrap();
        assert_eq!(slow.stats.rtt_ms, Some(300));

        cmd_tx.send(NetworkCommand::Shutdown).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_resample_command() {
        let (probe, calls) = ScriptedProbe::fixed(Some(70));
        let (cmd_tx, mut updates, handle) = start(60_000, Arc::new(NoConnectivityInfo), probe);

        updates.recv().await.unwrap();
        cmd_tx.send(NetworkCommand::Resample).unwrap();
        updates.recv().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        cmd_tx.send(NetworkCommand::Shutdown).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_releases_everything() {
        let source = Arc::new(ManualConnectivity::new(broadband()));
        let (probe, calls) = ScriptedProbe::script(vec![(Duration::from_secs(5), Some(10))]);
        let (cmd_tx, mut updates, handle) = start(1_000, source.clone(), probe);

        updates.recv().await.unwrap();
        assert_eq!(source.listener_count(), 1);

        cmd_tx.send(NetworkCommand::Shutdown).unwrap();
        handle.await.unwrap();
        assert_eq!(source.listener_count(), 0);

        // The in-flight probe was aborted and no timer remains
        source.set(broadband());
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(updates.recv().await.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_command_sender_dropped() {
        let (probe, _calls) = ScriptedProbe::fixed(Some(10));
        let (cmd_tx, _updates, handle) = start(1_000, Arc::new(NoConnectivityInfo), probe);
        drop(cmd_tx);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_update_receiver_dropped() {
        let (probe, _calls) = ScriptedProbe::fixed(Some(10));
        let (_cmd_tx, updates, handle) = start(1_000, Arc::new(NoConnectivityInfo), probe);
        drop(updates);
        handle.await.unwrap();
    }
}
