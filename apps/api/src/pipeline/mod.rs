use std::fmt;
use std::str::FromStr;

pub mod anonymous_id;
pub mod handlers;
pub mod service;

pub use anonymous_id::AnonymousIds;
pub use service::ApplicationPipeline;

/// Which gate topology admits applications.
///
/// `DualTest` is the default: eligibility and company rounds must both pass,
/// and application status is only ever moved by test outcomes and the
/// shortlist action. `SingleGate` is the older flow kept as a configuration
/// option: apply needs only the eligibility pass, and recruiters may set
/// status by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineVariant {
    DualTest,
    SingleGate,
}

impl PipelineVariant {
    pub fn requires_company_round(&self) -> bool {
        matches!(self, PipelineVariant::DualTest)
    }

    pub fn allows_manual_status(&self) -> bool {
        matches!(self, PipelineVariant::SingleGate)
    }
}

impl FromStr for PipelineVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dual_test" => Ok(PipelineVariant::DualTest),
            "single_gate" => Ok(PipelineVariant::SingleGate),
            other => Err(format!(
                "unknown pipeline variant '{other}' (expected dual_test or single_gate)"
            )),
        }
    }
}

impl fmt::Display for PipelineVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PipelineVariant::DualTest => "dual_test",
            PipelineVariant::SingleGate => "single_gate",
        })
    }
}
