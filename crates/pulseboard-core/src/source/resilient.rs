//! Primary-then-fallback composition.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::filter::FilterSet;
use crate::models::{AggregateEntry, AggregateKind};

use super::AggregateSource;

/// Tries `primary`; on any error logs it and answers from `fallback`.
///
/// Only an error from the fallback itself reaches the caller.
pub struct ResilientSource {
    primary: Arc<dyn AggregateSource>,
    fallback: Arc<dyn AggregateSource>,
    name: String,
}

impl ResilientSource {
    pub fn new(primary: Arc<dyn AggregateSource>, fallback: Arc<dyn AggregateSource>) -> Self {
        let name = format!("{}+{}", primary.name(), fallback.name());
        Self {
            primary,
            fallback,
            name,
        }
    }

    pub fn primary(&self) -> &Arc<dyn AggregateSource> {
        &self.primary
    }

    pub fn fallback(&self) -> &Arc<dyn AggregateSource> {
        &self.fallback
    }
}

#[async_trait]
impl AggregateSource for ResilientSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(
        &self,
        kind: AggregateKind,
        filters: &FilterSet,
    ) -> Result<Vec<AggregateEntry>> {
        match self.primary.fetch(kind, filters).await {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(
                    source = self.primary.name(),
                    fallback = self.fallback.name(),
                    endpoint = kind.endpoint(),
                    error = %format!("{:#}", e),
                    "primary source failed, serving fallback data"
                );
                self.fallback.fetch(kind, filters).await
            }
        }
    }
}
