// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Plays every drum event of the map once and reports which ones sound.

use std::{fmt, time::Duration};

use tracing::{info, warn};

use crate::{engine::DrumEngine, mapping::DrumEvent};

/// The outcome of a kit check.
#[derive(Clone, Debug, Default)]
pub struct CheckReport {
    working: Vec<DrumEvent>,
    broken: Vec<DrumEvent>,
}

impl CheckReport {
    /// Events that played.
    pub fn working(&self) -> &[DrumEvent] {
        &self.working
    }

    /// Events that didn't play.
    pub fn broken(&self) -> &[DrumEvent] {
        &self.broken
    }

    pub fn total(&self) -> usize {
        self.working.len() + self.broken.len()
    }

    /// True if every event played.
    pub fn is_success(&self) -> bool {
        self.broken.is_empty()
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} drum sounds working",
            self.working.len(),
            self.total()
        )?;
        for event in &self.broken {
            write!(f, "\n  FAILED: {}", event)?;
        }
        Ok(())
    }
}

/// Plays every drum event in table order, pausing `interval` between hits.
pub async fn check_kit(engine: &DrumEngine, velocity: i32, interval: Duration) -> CheckReport {
    let mut report = CheckReport::default();

    for (index, event) in engine.mapping().events().iter().enumerate() {
        if index > 0 && !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }

        match engine.try_play_by_note_id(event.note, velocity, 0.0) {
            Ok(_) => {
                info!(
                    note = event.note,
                    sample = event.sample,
                    label = event.label,
                    "SUCCESS"
                );
                report.working.push(*event);
            }
            Err(e) => {
                warn!(
                    note = event.note,
                    sample = event.sample,
                    label = event.label,
                    err = %e,
                    "FAILED"
                );
                report.broken.push(*event);
            }
        }
    }

    info!(
        working = report.working.len(),
        total = report.total(),
        "Kit check finished."
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{CRASH, HIHAT_ACCENT, HIHAT_ACCENT_LEGACY};
    use crate::testutil::{ready_engine, TestKit};

    #[tokio::test]
    async fn test_full_kit() {
        let test_kit = TestKit::full();
        let (engine, platform) = ready_engine(&test_kit).await;

        let report = check_kit(&engine, 100, Duration::ZERO).await;
        assert!(report.is_success());
        assert_eq!(report.total(), 26);
        assert_eq!(report.working().len(), 26);
        assert_eq!(platform.context().unwrap().scheduled().len(), 26);
        assert_eq!(report.to_string(), "26/26 drum sounds working");
    }

    #[tokio::test]
    async fn test_broken_samples() {
        let test_kit = TestKit::new(&["hihat_accent"], &["crash"]);
        let (engine, _) = ready_engine(&test_kit).await;

        let report = check_kit(&engine, 127, Duration::from_millis(1)).await;
        assert!(!report.is_success());
        assert_eq!(report.working().len(), 23);

        let broken: Vec<u8> = report.broken().iter().map(|event| event.note).collect();
        assert_eq!(broken.len(), 3);
        assert!(broken.contains(&HIHAT_ACCENT));
        assert!(broken.contains(&HIHAT_ACCENT_LEGACY));
        assert!(broken.contains(&CRASH));
        assert!(report.to_string().starts_with("23/26 drum sounds working\n  FAILED: "));
    }

    #[tokio::test]
    async fn test_uninitialized_engine() {
        let test_kit = TestKit::full();
        let (engine, _) = crate::testutil::mock_engine("mock", test_kit.kit());

        let report = check_kit(&engine, 127, Duration::ZERO).await;
        assert_eq!(report.working().len(), 0);
        assert_eq!(report.broken().len(), 26);
    }
}
