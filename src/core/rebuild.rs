//! Turn tokenized contents back into text.

use tracing::debug;

use crate::domain::{NodeId, RebuiltContent, Version};
use crate::error::Result;

use super::relation::RelationEngine;

impl RelationEngine {
    /// Rebuild each record as (label, type, tokens joined by a space)
    pub async fn rebuild(
        &self,
        version: Version,
        contents: &[NodeId],
    ) -> Result<Vec<RebuiltContent>> {
        let mut rebuilt = Vec::with_capacity(contents.len());

        for content in contents {
            let record = self.read_content(version, *content).await?;
            let names = self
                .vocabulary()
                .token_names(version, &record.tokens)
                .await?;

            rebuilt.push(RebuiltContent {
                label: record.label,
                content_type: record.content_type,
                content: names.join(" "),
            });
        }

        debug!(count = rebuilt.len(), %version, "Rebuilt tokenized contents");
        Ok(rebuilt)
    }
}
