use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::rate::MebibytesPerSecondBound;

/// Streaming and compaction throughput settings.
///
/// Rates are written in their canonical text form (`"24MiB/s"`). The
/// `*_megabits_per_sec` keys are the legacy integer spellings of the two
/// streaming knobs; they are translated at resolution time and a file that
/// sets both spellings of the same knob is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThrottleConfig {
    #[serde(default)]
    pub stream_throughput_outbound: Option<MebibytesPerSecondBound>,
    #[serde(default)]
    pub inter_dc_stream_throughput_outbound: Option<MebibytesPerSecondBound>,
    #[serde(default)]
    pub entire_sstable_stream_throughput_outbound: Option<MebibytesPerSecondBound>,
    #[serde(default)]
    pub compaction_throughput: Option<MebibytesPerSecondBound>,
    #[serde(default)]
    pub stream_throughput_outbound_megabits_per_sec: Option<i64>,
    #[serde(default)]
    pub inter_dc_stream_throughput_outbound_megabits_per_sec: Option<i64>,
}

impl ThrottleConfig {
    /// Load from a specific file (TOML or JSON based on extension).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let data = fs::read_to_string(path_ref)
            .with_context(|| format!("unable to read throttle config {}", path_ref.display()))?;
        let cfg: Self = if is_json(path_ref) {
            serde_json::from_str(&data)
                .with_context(|| format!("invalid JSON throttle config {}", path_ref.display()))?
        } else {
            toml::from_str(&data)
                .with_context(|| format!("invalid TOML throttle config {}", path_ref.display()))?
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject files that set both spellings of the same knob.
    pub fn validate(&self) -> Result<()> {
        if self.stream_throughput_outbound.is_some()
            && self.stream_throughput_outbound_megabits_per_sec.is_some()
        {
            bail!(
                "stream_throughput_outbound and stream_throughput_outbound_megabits_per_sec \
                 are mutually exclusive"
            );
        }
        if self.inter_dc_stream_throughput_outbound.is_some()
            && self.inter_dc_stream_throughput_outbound_megabits_per_sec.is_some()
        {
            bail!(
                "inter_dc_stream_throughput_outbound and \
                 inter_dc_stream_throughput_outbound_megabits_per_sec are mutually exclusive"
            );
        }
        Ok(())
    }

    /// Effective outbound streaming throughput. Zero means unthrottled.
    pub fn stream_throughput(&self) -> Result<MebibytesPerSecondBound> {
        resolve_streaming(
            self.stream_throughput_outbound,
            self.stream_throughput_outbound_megabits_per_sec,
            "stream_throughput_outbound",
        )
    }

    /// Effective cross-datacenter streaming throughput. Zero means unthrottled.
    pub fn inter_dc_stream_throughput(&self) -> Result<MebibytesPerSecondBound> {
        resolve_streaming(
            self.inter_dc_stream_throughput_outbound,
            self.inter_dc_stream_throughput_outbound_megabits_per_sec,
            "inter_dc_stream_throughput_outbound",
        )
    }

    pub fn entire_sstable_stream_throughput(&self) -> MebibytesPerSecondBound {
        self.entire_sstable_stream_throughput_outbound
            .unwrap_or_else(MebibytesPerSecondBound::unthrottled)
    }

    pub fn compaction_throughput(&self) -> MebibytesPerSecondBound {
        self.compaction_throughput
            .unwrap_or_else(MebibytesPerSecondBound::unthrottled)
    }
}

fn resolve_streaming(
    current: Option<MebibytesPerSecondBound>,
    legacy_megabits: Option<i64>,
    key: &str,
) -> Result<MebibytesPerSecondBound> {
    if let Some(rate) = current {
        return Ok(rate);
    }
    if let Some(megabits) = legacy_megabits {
        let rate = MebibytesPerSecondBound::from_megabits_per_second(megabits)
            .with_context(|| format!("invalid legacy value for {key}_megabits_per_sec"))?;
        warn!(
            key,
            megabits,
            rate = %rate,
            "translating legacy megabits_per_sec setting; prefer the rate spelling"
        );
        return Ok(rate);
    }
    Ok(MebibytesPerSecondBound::unthrottled())
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}
