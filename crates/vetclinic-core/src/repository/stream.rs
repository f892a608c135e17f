//! Per-subscriber live query stream.

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;

use super::RepositoryError;
use crate::models::PatientRecord;

/// One emission of the live query: the full table, or the failure that ended it.
pub type PatientSnapshot = Result<Vec<PatientRecord>, RepositoryError>;

/// Live view of the patient table for one subscriber.
///
/// Dropping the stream unsubscribes.
pub struct PatientStream {
    initial: Option<PatientSnapshot>,
    receiver: Option<broadcast::Receiver<PatientSnapshot>>,
}

impl PatientStream {
    /// Stream that yields `initial` first, then whatever `receiver` delivers.
    pub fn new(initial: PatientSnapshot, receiver: broadcast::Receiver<PatientSnapshot>) -> Self {
        Self {
            initial: Some(initial),
            receiver: Some(receiver),
        }
    }

    /// Stream that yields exactly the given items and then ends.
    ///
    /// Useful for fakes that do not sit on a real table.
    pub fn from_snapshots(snapshots: Vec<PatientSnapshot>) -> Self {
        let (tx, rx) = broadcast::channel(snapshots.len().max(1));
        for snapshot in snapshots {
            let _ = tx.send(snapshot);
        }
        Self {
            initial: None,
            receiver: Some(rx),
        }
    }

    /// Wait for the next snapshot. `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<PatientSnapshot> {
        if let Some(initial) = self.initial.take() {
            if initial.is_err() {
                self.receiver = None;
            }
            return Some(initial);
        }

        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(snapshot) => {
                    if snapshot.is_err() {
                        self.receiver = None;
                    }
                    return Some(snapshot);
                }
                // Each snapshot replaces the previous one, so skipping is lossless.
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "patient stream lagged, jumping to newest snapshot");
                }
                Err(RecvError::Closed) => {
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    /// Check if the stream can still yield items.
    pub fn is_open(&self) -> bool {
        self.initial.is_some() || self.receiver.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientType;

    fn patients(names: &[&str]) -> Vec<PatientRecord> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| PatientRecord {
                id: i as i64 + 1,
                ..PatientRecord::new(name.to_string(), PatientType::Cat)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_initial_then_updates() {
        let (tx, rx) = broadcast::channel(4);
        let mut stream = PatientStream::new(Ok(patients(&["a"])), rx);

        tx.send(Ok(patients(&["a", "b"]))).unwrap();

        assert_eq!(stream.next().await.unwrap().unwrap().len(), 1);
        assert_eq!(stream.next().await.unwrap().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ends_after_error() {
        let (tx, rx) = broadcast::channel(4);
        let mut stream = PatientStream::new(Ok(vec![]), rx);

        tx.send(Err(RepositoryError::Storage("disk gone".into())))
            .unwrap();
        tx.send(Ok(patients(&["a"]))).unwrap();

        assert!(stream.next().await.unwrap().is_ok());
        assert!(stream.next().await.unwrap().is_err());
        assert!(!stream.is_open());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_failed_initial_ends_stream() {
        let (_tx, rx) = broadcast::channel(4);
        let mut stream = PatientStream::new(Err(RepositoryError::Decode("bad".into())), rx);

        assert!(stream.next().await.unwrap().is_err());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_lagging_subscriber_gets_newest() {
        let (tx, rx) = broadcast::channel(2);
        let mut stream = PatientStream::new(Ok(vec![]), rx);

        for n in 1..=5 {
            let names: Vec<String> = (0..n).map(|i| i.to_string()).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            tx.send(Ok(patients(&refs))).unwrap();
        }

        assert_eq!(stream.next().await.unwrap().unwrap().len(), 0);
        // Capacity 2: only the last two snapshots survive.
        assert_eq!(stream.next().await.unwrap().unwrap().len(), 4);
        assert_eq!(stream.next().await.unwrap().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_closed_sender_ends_stream() {
        let (tx, rx) = broadcast::channel(1);
        let mut stream = PatientStream::new(Ok(vec![]), rx);
        drop(tx);

        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_from_snapshots() {
        let mut stream = PatientStream::from_snapshots(vec![
            Ok(patients(&["a"])),
            Ok(patients(&["a", "b"])),
        ]);

        assert_eq!(stream.next().await.unwrap().unwrap().len(), 1);
        assert_eq!(stream.next().await.unwrap().unwrap().len(), 2);
        assert!(stream.next().await.is_none());
    }
}
