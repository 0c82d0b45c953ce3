//! Urgency tiers derived from remaining time

use serde::{Deserialize, Serialize};

/// Status tier of a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Ok,
    Warning,
    Critical,
    Expired,
}

/// Display data attached to a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierStyle {
    pub tier: Tier,
    pub label: &'static str,
    /// Class applied to the driver card and timer display (empty for none)
    pub card_class: &'static str,
    /// Class applied to the status line
    pub status_class: &'static str,
}

/// Label shown instead of the tier label while a timer is paused
pub const PAUSED_LABEL: &str = "Paused";

const TIER_STYLES: [TierStyle; 4] = [
    TierStyle {
        tier: Tier::Ok,
        label: "On time",
        card_class: "",
        status_class: "ok",
    },
    TierStyle {
        tier: Tier::Warning,
        label: "Limited time",
        card_class: "warning",
        status_class: "warning",
    },
    TierStyle {
        tier: Tier::Critical,
        label: "Critical time!",
        card_class: "critical",
        status_class: "critical",
    },
    TierStyle {
        tier: Tier::Expired,
        label: "TIME EXPIRED",
        card_class: "critical",
        status_class: "critical",
    },
];

impl Tier {
    /// Every tier, least urgent first
    pub const ALL: [Tier; 4] = [Tier::Ok, Tier::Warning, Tier::Critical, Tier::Expired];

    /// Classify remaining time against warning and critical thresholds (minutes).
    ///
    /// Thresholds are not required to be ordered; the critical check always
    /// runs before the warning check.
    pub fn classify(remaining_seconds: u64, warning_minutes: u64, critical_minutes: u64) -> Self {
        let critical_seconds = critical_minutes.saturating_mul(60);
        let warning_seconds = warning_minutes.saturating_mul(60);

        if remaining_seconds == 0 {
            Tier::Expired
        } else if remaining_seconds <= critical_seconds {
            Tier::Critical
        } else if remaining_seconds <= warning_seconds {
            Tier::Warning
        } else {
            Tier::Ok
        }
    }

    pub fn style(self) -> &'static TierStyle {
        // TIER_STYLES is laid out in declaration order
        &TIER_STYLES[self as usize]
    }
}
