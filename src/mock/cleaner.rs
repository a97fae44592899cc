//! Recording platform cleaner.

use async_trait::async_trait;
use runlane_options::CommandData;

use super::{Call, CallJournal};
use crate::platform::{CleanError, Platform, PlatformCleaner};

/// Records clean requests without touching the filesystem.
#[derive(Debug, Clone)]
pub struct RecordingCleaner {
    journal: CallJournal,
}

impl RecordingCleaner {
    pub fn new(journal: CallJournal) -> Self {
        Self { journal }
    }
}

#[async_trait]
impl PlatformCleaner for RecordingCleaner {
    async fn clean_platforms(
        &self,
        platforms: &[Platform],
        _command: &CommandData,
    ) -> Result<(), CleanError> {
        let names = platforms.iter().map(|p| p.name.clone()).collect();
        self.journal.record(Call::Clean(names));
        Ok(())
    }
}
