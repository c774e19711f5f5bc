//! Bulk certificate generation: one batch at a time, progress reported as
//! a percentage, recipient statuses flipped atomically at completion.
//!
//! The controller is a small state machine (`Idle` → `Running` →
//! `Completed`). Per-recipient render failures do not abort the batch;
//! they are collected into the report and only the successful ids are
//! marked generated.

use tokio::sync::watch;

use crate::error::CertError;
use crate::model::Recipient;
use crate::store::RecipientStore;

/// Batch lifecycle state. `Running` carries the last reported percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkState {
    Idle,
    Running { progress: u8 },
    Completed,
}

/// One recipient that failed to render during a batch.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFailure {
    pub recipient_id: String,
    pub message: String,
}

/// Outcome of a completed batch.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReport {
    /// Ids rendered and marked generated, so a retry can target the rest.
    pub generated: Vec<String>,
    pub failed: Vec<BulkFailure>,
}

/// Drives one batch at a time and publishes progress to subscribers.
pub struct BulkController {
    state: BulkState,
    progress_tx: watch::Sender<u8>,
}

impl BulkController {
    pub fn new() -> (Self, watch::Receiver<u8>) {
        let (progress_tx, progress_rx) = watch::channel(0);
        (
            Self {
                state: BulkState::Idle,
                progress_tx,
            },
            progress_rx,
        )
    }

    pub fn state(&self) -> BulkState {
        self.state
    }

    pub fn subscribe(&self) -> watch::Receiver<u8> {
        self.progress_tx.subscribe()
    }

    /// Run one batch.
    ///
    /// The target set is the explicit `selection`, falling back to the
    /// caller's `filtered` view when the selection is empty. An empty final
    /// target set, or a batch already in flight, is rejected before any
    /// state changes. `render_one` is called per recipient; failures are
    /// recorded and skipped. At 100% every successful id flips to
    /// `Generated` in one store call and the state becomes `Completed`.
    pub async fn run<F, Fut>(
        &mut self,
        selection: &[String],
        filtered: &[String],
        store: &mut RecipientStore,
        mut render_one: F,
    ) -> Result<BulkReport, CertError>
    where
        F: FnMut(Recipient) -> Fut,
        Fut: std::future::Future<Output = Result<(), CertError>>,
    {
        if matches!(self.state, BulkState::Running { .. }) {
            return Err(CertError::Bulk("a batch is already running".into()));
        }

        let targets: &[String] = if selection.is_empty() { filtered } else { selection };
        if targets.is_empty() {
            return Err(CertError::Bulk("no recipients selected".into()));
        }

        // Snapshot up front so the render loop sees a consistent batch even
        // though the store is handed back between items.
        let mut batch: Vec<Result<Recipient, BulkFailure>> = Vec::with_capacity(targets.len());
        for id in targets {
            match store.get(id) {
                Some(r) => batch.push(Ok(r.clone())),
                None => batch.push(Err(BulkFailure {
                    recipient_id: id.clone(),
                    message: "unknown recipient".into(),
                })),
            }
        }

        self.state = BulkState::Running { progress: 0 };
        self.progress_tx.send_replace(0);

        let total = batch.len();
        let mut generated = Vec::new();
        let mut failed = Vec::new();

        for (i, item) in batch.into_iter().enumerate() {
            match item {
                Ok(recipient) => {
                    let id = recipient.id.clone();
                    match render_one(recipient).await {
                        Ok(()) => generated.push(id),
                        Err(e) => failed.push(BulkFailure {
                            recipient_id: id,
                            message: e.to_string(),
                        }),
                    }
                }
                Err(failure) => failed.push(failure),
            }
            let progress = progress_after(i, total);
            self.state = BulkState::Running { progress };
            self.progress_tx.send_replace(progress);
        }

        store.mark_generated(&generated);
        self.state = BulkState::Completed;

        Ok(BulkReport { generated, failed })
    }

    #[cfg(test)]
    fn force_running(&mut self, progress: u8) {
        self.state = BulkState::Running { progress };
    }
}

/// Percentage after finishing item `i` of `n` (0-based), rounded.
fn progress_after(i: usize, n: usize) -> u8 {
    (((i + 1) as f32 / n as f32) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CertificateStatus;
    use pretty_assertions::assert_eq;

    fn recipient(id: &str) -> Recipient {
        Recipient {
            id: id.into(),
            name: format!("获奖人{id}"),
            phone: "13800000001".into(),
            award_title: "中国民族民间舞".into(),
            award_rank: "金奖".into(),
            date: "2024-05-20".into(),
            cert_number: format!("DANCE-2024-{id}"),
            org_id: "1".into(),
            template_code: "HONOR_CERT_BLUE_FRAME".into(),
            overrides: Default::default(),
            status: CertificateStatus::Pending,
            enabled: true,
        }
    }

    #[test]
    fn progress_reaches_exactly_one_hundred() {
        assert_eq!(progress_after(0, 3), 33);
        assert_eq!(progress_after(1, 3), 67);
        assert_eq!(progress_after(2, 3), 100);
        assert_eq!(progress_after(0, 1), 100);
    }

    #[tokio::test]
    async fn statuses_flip_only_at_completion() {
        let mut store =
            RecipientStore::seeded(vec![recipient("1"), recipient("2"), recipient("3")]);
        let (mut ctrl, rx) = BulkController::new();
        let ids: Vec<String> = vec!["1".into(), "2".into(), "3".into()];

        let report = ctrl
            .run(&ids, &[], &mut store, |_| async { Ok(()) })
            .await
            .unwrap();

        assert_eq!(report.generated, ids);
        assert!(report.failed.is_empty());
        assert_eq!(ctrl.state(), BulkState::Completed);
        assert_eq!(*rx.borrow(), 100);
        for id in &ids {
            assert_eq!(
                store.get(id).unwrap().status,
                CertificateStatus::Generated
            );
        }
    }

    #[tokio::test]
    async fn failures_are_attributed_and_skipped() {
        let mut store = RecipientStore::seeded(vec![recipient("1"), recipient("2")]);
        let (mut ctrl, _rx) = BulkController::new();
        let ids: Vec<String> = vec!["1".into(), "2".into()];

        let report = ctrl
            .run(&ids, &[], &mut store, |r| async move {
                if r.id == "2" {
                    Err(CertError::Render("font unavailable".into()))
                } else {
                    Ok(())
                }
            })
            .await
            .unwrap();

        assert_eq!(report.generated, ["1".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].recipient_id, "2");
        assert_eq!(store.get("1").unwrap().status, CertificateStatus::Generated);
        assert_eq!(store.get("2").unwrap().status, CertificateStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_ids_are_reported_not_fatal() {
        let mut store = RecipientStore::seeded(vec![recipient("1")]);
        let (mut ctrl, _rx) = BulkController::new();
        let ids: Vec<String> = vec!["1".into(), "ghost".into()];

        let report = ctrl
            .run(&ids, &[], &mut store, |_| async { Ok(()) })
            .await
            .unwrap();

        assert_eq!(report.generated, ["1".to_string()]);
        assert_eq!(report.failed[0].recipient_id, "ghost");
    }

    #[tokio::test]
    async fn empty_selection_falls_back_to_filtered_view() {
        let mut store = RecipientStore::seeded(vec![recipient("1"), recipient("2")]);
        let (mut ctrl, _rx) = BulkController::new();
        let filtered: Vec<String> = vec!["2".into()];

        let report = ctrl
            .run(&[], &filtered, &mut store, |_| async { Ok(()) })
            .await
            .unwrap();

        assert_eq!(report.generated, ["2".to_string()]);
        assert_eq!(store.get("2").unwrap().status, CertificateStatus::Generated);
        assert_eq!(store.get("1").unwrap().status, CertificateStatus::Pending);
    }

    #[tokio::test]
    async fn empty_target_set_is_rejected_before_running() {
        let mut store = RecipientStore::new();
        let (mut ctrl, _rx) = BulkController::new();
        let result = ctrl.run(&[], &[], &mut store, |_| async { Ok(()) }).await;
        assert!(matches!(result, Err(CertError::Bulk(_))));
        assert_eq!(ctrl.state(), BulkState::Idle);
    }

    #[tokio::test]
    async fn concurrent_batches_are_rejected() {
        let mut store = RecipientStore::seeded(vec![recipient("1")]);
        let (mut ctrl, _rx) = BulkController::new();
        ctrl.force_running(50);

        let result = ctrl
            .run(&["1".to_string()], &[], &mut store, |_| async { Ok(()) })
            .await;
        assert!(matches!(result, Err(CertError::Bulk(_))));
    }

    #[tokio::test]
    async fn progress_ticks_monotonically() {
        let mut store =
            RecipientStore::seeded(vec![recipient("1"), recipient("2"), recipient("3")]);
        let (mut ctrl, _rx) = BulkController::new();
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));

        let rx = ctrl.subscribe();
        let seen2 = seen.clone();
        let ids: Vec<String> = vec!["1".into(), "2".into(), "3".into()];
        ctrl.run(&ids, &[], &mut store, |_| {
            let rx = rx.clone();
            let seen = seen2.clone();
            async move {
                seen.lock().unwrap().push(*rx.borrow());
                Ok(())
            }
        })
        .await
        .unwrap();

        let ticks = seen.lock().unwrap().clone();
        assert!(ticks.windows(2).all(|w| w[0] <= w[1]));
    }
}
