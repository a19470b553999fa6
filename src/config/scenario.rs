//! Default comparison scenario

use crate::calc::{VmSelection, WorkloadProfile};
use crate::compare::{ComparisonRequest, SearchDomain, VolumeRange};
use crate::currency::Normalization;
use crate::pricing::Provider;
use serde::{Deserialize, Serialize};

/// Workload, sweep and VM list used when the CLI is not given them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub serverless_provider: Provider,
    pub workload: WorkloadProfile,
    pub sweep: VolumeRange,
    pub vms: Vec<VmSelection>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            serverless_provider: Provider::Aws,
            workload: WorkloadProfile::default(),
            sweep: VolumeRange::default(),
            vms: vec![VmSelection::new(Provider::Aws, "t3.small")],
        }
    }
}

impl ScenarioConfig {
    pub fn to_request(&self, normalization: Normalization, search: SearchDomain) -> ComparisonRequest {
        ComparisonRequest::new(self.workload, self.serverless_provider, self.vms.clone())
            .with_range(self.sweep)
            .with_normalization(normalization)
            .with_search(search)
    }
}
