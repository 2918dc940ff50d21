//! Adaptive layout fitting: escalate through density tiers until the rendered
//! document fits on one page or the densest tier is reached.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::render::{DocumentRenderer, RenderError, RenderedDocument};

/// Ordered density tiers. Escalation only moves toward `Dense`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleTier {
    Standard,
    Compact,
    Dense,
}

impl StyleTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleTier::Standard => "standard",
            StyleTier::Compact => "compact",
            StyleTier::Dense => "dense",
        }
    }

    /// The next denser tier, or `None` at the end of the ladder.
    pub fn denser(&self) -> Option<Self> {
        match self {
            StyleTier::Standard => Some(StyleTier::Compact),
            StyleTier::Compact => Some(StyleTier::Dense),
            StyleTier::Dense => None,
        }
    }
}

impl fmt::Display for StyleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(StyleTier::Standard),
            "compact" => Ok(StyleTier::Compact),
            "dense" => Ok(StyleTier::Dense),
            other => Err(format!("unknown style tier: {other}")),
        }
    }
}

/// Result of the fitting loop. Exhausting the tier ladder with a multi-page
/// document is still a success; the caller gets the densest render.
#[derive(Debug)]
pub struct FitOutcome {
    pub document: RenderedDocument,
    pub tier: StyleTier,
    pub renders: u32,
}

/// Renders the markup, escalating the tier while the document spans more than
/// one page and a denser tier remains.
pub async fn fit_to_page(
    renderer: &dyn DocumentRenderer,
    markup: &str,
    start: StyleTier,
) -> Result<FitOutcome, RenderError> {
    let mut tier = start;
    let mut document = renderer.render(markup, tier).await?;
    let mut renders = 1;

    while document.page_count > 1 {
        let Some(next) = tier.denser() else { break };
        warn!(
            pages = document.page_count,
            from = %tier,
            to = %next,
            "document did not fit on one page, escalating tier"
        );
        tier = next;
        document = renderer.render(markup, tier).await?;
        renders += 1;
    }

    Ok(FitOutcome {
        document,
        tier,
        renders,
    })
}
