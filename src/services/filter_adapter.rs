//! Optional Filter Adapter
//!
//! Wraps the classification stage: runs the classifier on a round's candidate
//! hits and turns its accepted partition into the round's new queries.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::models::FilterConfig;
use crate::domain::ports::{ClassifyRequest, SequenceClassifier};
use crate::infrastructure::fasta;

pub struct FilterAdapter {
    classifier: Arc<dyn SequenceClassifier>,
    refs: PathBuf,
    roi_start: u32,
    roi_end: u32,
    key_positions: Vec<u32>,
    accepted_partition: String,
}

impl FilterAdapter {
    /// Build the adapter from the filter configuration.
    ///
    /// Fails when no reference sequences are configured.
    pub fn from_config(classifier: Arc<dyn SequenceClassifier>, config: &FilterConfig) -> Result<Self> {
        let refs = config
            .refs
            .clone()
            .context("Filtering requires a reference sequence file")?;

        Ok(Self {
            classifier,
            refs,
            roi_start: config.roi_start,
            roi_end: config.roi_end,
            key_positions: config.key_positions.clone(),
            accepted_partition: config.accepted_partition.clone(),
        })
    }

    /// Classify `queries` into `outdir` and return the accepted partition.
    ///
    /// Returns `None` when the accepted partition was not written or holds
    /// no sequences. A classifier failure is an error.
    #[instrument(skip(self), fields(classifier = self.classifier.name()))]
    pub async fn accepted_sequences(&self, queries: &Path, outdir: &Path) -> Result<Option<PathBuf>> {
        let request = ClassifyRequest {
            queries,
            refs: &self.refs,
            outdir,
            roi_start: self.roi_start,
            roi_end: self.roi_end,
            key_positions: &self.key_positions,
        };
        self.classifier
            .classify(&request)
            .await
            .with_context(|| format!("Failed to classify {}", queries.display()))?;

        let accepted = self.classifier.partition_file(outdir, &self.accepted_partition);
        if !accepted.exists() {
            info!(partition = %self.accepted_partition, "no sequences in the accepted partition");
            return Ok(None);
        }

        let count = fasta::count_sequences(&accepted)?;
        if count == 0 {
            info!(partition = %self.accepted_partition, "accepted partition is empty");
            return Ok(None);
        }

        info!(partition = %self.accepted_partition, accepted = count, "filter accepted sequences");
        Ok(Some(accepted))
    }
}
