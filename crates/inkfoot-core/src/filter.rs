//! The shared report filter.
//!
//! Every aggregation view in [`crate::calc`] applies exactly this predicate —
//! no view composes its own. Absent or empty values are omitted from the
//! conjunction entirely (an empty string is never "match empty string").

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{calc::EmissionRecord, entity::ClientId};

/// A conjunction of zero or more conditions over projects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportFilter {
  /// Tenant scope. Set by client-facing views, absent in internal/global
  /// ones.
  pub client:       Option<ClientId>,
  /// Inclusive lower bound on the project date.
  pub start_date:   Option<NaiveDate>,
  /// Inclusive upper bound on the project date.
  pub end_date:     Option<NaiveDate>,
  /// Exact project name.
  pub project_name: Option<String>,
  /// Exact state name, reached through the project's store.
  pub state:        Option<String>,
  /// Exact store name.
  pub store:        Option<String>,
}

impl ReportFilter {
  /// Scope to a single client with no further conditions.
  pub fn for_client(client: ClientId) -> Self {
    Self {
      client: Some(client),
      ..Self::default()
    }
  }

  /// Whether `record` satisfies every active condition.
  pub fn matches(&self, record: &EmissionRecord) -> bool {
    if let Some(client) = self.client
      && record.client_id != client
    {
      return false;
    }
    if let Some(start) = self.start_date
      && record.project_date < start
    {
      return false;
    }
    if let Some(end) = self.end_date
      && record.project_date > end
    {
      return false;
    }
    if let Some(name) = active(&self.project_name)
      && record.project_name != name
    {
      return false;
    }
    if let Some(state) = active(&self.state)
      && record.state_name != state
    {
      return false;
    }
    if let Some(store) = active(&self.store)
      && record.store_name != store
    {
      return false;
    }
    true
  }
}

/// Empty strings behave exactly like absent filters.
fn active(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|v| !v.is_empty())
}
