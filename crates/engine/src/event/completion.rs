use thiserror::Error;
use tokio::sync::oneshot;

/// Handed to an external collaborator; consumed by `complete`, so a
/// collaborator cannot resolve the same request twice.
#[derive(Debug)]
pub struct Completion<T> {
    sender: oneshot::Sender<T>,
}

#[derive(Debug)]
pub struct Pending<T> {
    receiver: oneshot::Receiver<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("collaborator dropped its completion without resolving it")]
pub struct Abandoned;

pub fn completion<T>() -> (Completion<T>, Pending<T>) {
    let (sender, receiver) = oneshot::channel();
    (Completion { sender }, Pending { receiver })
}

impl<T> Completion<T> {
    pub fn complete(self, value: T) {
        // The waiting side may already be gone when a cutscene was torn down.
        let _ = self.sender.send(value);
    }
}

impl Completion<()> {
    pub fn done(self) {
        self.complete(());
    }
}

impl<T> Pending<T> {
    pub async fn wait(self) -> Result<T, Abandoned> {
        self.receiver.await.map_err(|_| Abandoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn synchronous_completion_is_observed() {
        let (done, pending) = completion::<u32>();
        done.complete(7);
        assert_eq!(pending.wait().await, Ok(7));
    }

    #[tokio::test]
    async fn dropped_completion_reports_abandoned() {
        let (done, pending) = completion::<()>();
        drop(done);
        assert_eq!(pending.wait().await, Err(Abandoned));
    }

    #[tokio::test(start_paused = true)]
    async fn deferred_completion_resolves_after_collaborator_finishes() {
        let (done, pending) = completion::<()>();
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async move {
                tokio::task::spawn_local(async move {
                    tokio::time::sleep(Duration::from_millis(250)).await;
                    done.done();
                });
                let started = tokio::time::Instant::now();
                pending.wait().await.expect("resolved");
                assert!(started.elapsed() >= Duration::from_millis(250));
            })
            .await;
    }
}
