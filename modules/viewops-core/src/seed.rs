//! One-off seeding of operational notes with their embeddings.

use tracing::{error, info};
use uuid::Uuid;

use viewops_common::NewNote;

use crate::traits::{OperationalStore, TextEmbedder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedNote {
    pub batch_id: Uuid,
    pub content: String,
}

impl SeedNote {
    pub fn new(batch_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            batch_id,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub failed: usize,
}

impl SeedReport {
    /// True when there was work to do and none of it succeeded.
    pub fn all_failed(&self) -> bool {
        self.inserted == 0 && self.failed > 0
    }
}

/// Demo notes for batches 662, 663 and 664.
pub fn sample_notes() -> Vec<SeedNote> {
    vec![
        SeedNote::new(
            Uuid::from_u128(0x1a4f09f6_125d_48ee_a5a2_d1e13f035d5c),
            "Quality control flagged a potential bacterial contamination issue during the boning process for this batch.",
        ),
        SeedNote::new(
            Uuid::from_u128(0x2b5f09f6_125d_48ee_a5a2_d1e13f035d5d),
            "The overall yield was slightly lower than expected due to higher than average fat content on the carcasses.",
        ),
        SeedNote::new(
            Uuid::from_u128(0x3c6f09f6_125d_48ee_a5a2_d1e13f035d5e),
            "Vet report indicates several animals had minor liver fluke, but all were cleared for processing.",
        ),
    ]
}

/// Embed and insert each note in order. A failure on one note is logged and
/// the run moves on to the next.
pub async fn seed_notes(
    embedder: &dyn TextEmbedder,
    store: &dyn OperationalStore,
    notes: &[SeedNote],
) -> SeedReport {
    let mut report = SeedReport::default();

    for note in notes {
        info!(batch_id = %note.batch_id, "Seeding note");

        let embedding = match embedder.embed(&note.content).await {
            Ok(v) => v,
            Err(e) => {
                error!(batch_id = %note.batch_id, error = %e, "Failed to embed note, skipping");
                report.failed += 1;
                continue;
            }
        };

        let new_note = NewNote {
            batch_id: note.batch_id,
            content: note.content.clone(),
            embedding,
        };

        match store.insert_note(&new_note).await {
            Ok(id) => {
                info!(batch_id = %note.batch_id, note_id = %id, "Note inserted");
                report.inserted += 1;
            }
            Err(e) => {
                error!(batch_id = %note.batch_id, error = %e, "Failed to insert note, skipping");
                report.failed += 1;
            }
        }
    }

    info!(inserted = report.inserted, failed = report.failed, "Seeding done");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockEmbedder, MockStore, StoreCall};

    #[test]
    fn sample_notes_target_known_batches() {
        let notes = sample_notes();
        assert_eq!(notes.len(), 3);
        assert_eq!(
            notes[0].batch_id.to_string(),
            "1a4f09f6-125d-48ee-a5a2-d1e13f035d5c"
        );
        assert!(notes[0].content.contains("contamination"));
        assert!(notes[1].content.contains("fat content"));
        assert!(notes[2].content.contains("liver fluke"));
    }

    #[tokio::test]
    async fn seeds_every_note() {
        let embedder = MockEmbedder::new(16);
        let store = MockStore::new();
        let notes = sample_notes();

        let report = seed_notes(&embedder, &store, &notes).await;

        assert_eq!(report, SeedReport { inserted: 3, failed: 0 });
        let calls = store.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[0],
            StoreCall::InsertNote {
                batch_id: notes[0].batch_id,
                content: notes[0].content.clone(),
                dimensions: 16,
            }
        );
    }

    #[tokio::test]
    async fn insert_failure_does_not_abort_run() {
        let notes = sample_notes();
        let embedder = MockEmbedder::new(16);
        let store = MockStore::new().failing_insert_for(notes[1].batch_id);

        let report = seed_notes(&embedder, &store, &notes).await;

        assert_eq!(report, SeedReport { inserted: 2, failed: 1 });
        assert_eq!(store.calls().len(), 3);
        assert!(!report.all_failed());
    }

    #[tokio::test]
    async fn embedding_failure_skips_insert_for_that_note() {
        let notes = sample_notes();
        let embedder = MockEmbedder::new(16).failing_on(&notes[0].content);
        let store = MockStore::new();

        let report = seed_notes(&embedder, &store, &notes).await;

        assert_eq!(report, SeedReport { inserted: 2, failed: 1 });
        assert_eq!(embedder.texts().len(), 3);
        assert!(store.calls().iter().all(|call| !matches!(
            call,
            StoreCall::InsertNote { batch_id, .. } if *batch_id == notes[0].batch_id
        )));
    }

    #[tokio::test]
    async fn all_failed_when_store_down() {
        let report = seed_notes(
            &MockEmbedder::new(4),
            &MockStore::new().failing(),
            &sample_notes(),
        )
        .await;
        assert!(report.all_failed());
    }

    #[test]
    fn empty_run_is_not_a_failure() {
        assert!(!SeedReport::default().all_failed());
    }
}
