use std::future::Future;

use tracing::warn;

/// Outcome of running one operation over several items in order.
#[derive(Debug)]
pub struct BatchReport<T, O, E> {
    pub completed: Vec<(T, O)>,
    pub failed: Option<(T, E)>,
    pub skipped: Vec<T>,
}

impl<T, O, E> BatchReport<T, O, E> {
    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }
}

/// Runs `op` over `items` one at a time. The first failure stops the batch;
/// items after it are returned untouched in `skipped`. Work already done is
/// never rolled back.
pub async fn run_batch<T, O, E, F, Fut>(items: Vec<T>, mut op: F) -> BatchReport<T, O, E>
where
    T: Clone,
    E: std::fmt::Display,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<O, E>>,
{
    let mut report = BatchReport {
        completed: Vec::new(),
        failed: None,
        skipped: Vec::new(),
    };

    let mut remaining = items.into_iter();
    for item in remaining.by_ref() {
        match op(item.clone()).await {
            Ok(output) => report.completed.push((item, output)),
            Err(err) => {
                warn!(error = %err, "batch stopped at first failure");
                report.failed = Some((item, err));
                break;
            }
        }
    }
    report.skipped = remaining.collect();
    report
}
