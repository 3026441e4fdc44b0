// SPDX-License-Identifier: Apache-2.0

use admit_atlas_model::{artifact_layout, ArtifactLayout};

use crate::IngestOptions;

#[derive(Debug, Clone)]
pub struct IngestJob {
    pub options: IngestOptions,
    pub layout: ArtifactLayout,
}

impl IngestJob {
    #[must_use]
    pub fn from_options(options: &IngestOptions) -> Self {
        Self {
            options: options.clone(),
            layout: artifact_layout(&options.output_root),
        }
    }
}
