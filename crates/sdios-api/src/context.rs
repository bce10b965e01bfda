//! Ids that scope a request to one user / SDI / machine.

use std::collections::HashMap;

/// Immutable request scope.
///
/// The ids are merged into a request's URL args as defaults, so a legacy
/// `clouds/{pk}/{sdi_id}/...` template and a current `sdis/{sdi_id}/...`
/// one both render from the same context. Explicit args always win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    user_pk: Option<String>,
    sdi_id: Option<String>,
    machine_id: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_pk(mut self, pk: impl ToString) -> Self {
        self.user_pk = Some(pk.to_string());
        self
    }

    pub fn with_sdi(mut self, sdi_id: impl ToString) -> Self {
        self.sdi_id = Some(sdi_id.to_string());
        self
    }

    pub fn with_machine(mut self, machine_id: impl ToString) -> Self {
        self.machine_id = Some(machine_id.to_string());
        self
    }

    pub fn user_pk(&self) -> Option<&str> {
        self.user_pk.as_deref()
    }

    pub fn sdi_id(&self) -> Option<&str> {
        self.sdi_id.as_deref()
    }

    pub fn machine_id(&self) -> Option<&str> {
        self.machine_id.as_deref()
    }

    /// Placeholder name -> value for every id that is set.
    pub fn url_args(&self) -> HashMap<String, String> {
        [
            ("pk", &self.user_pk),
            ("sdi_id", &self.sdi_id),
            ("machine_id", &self.machine_id),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| (name.to_string(), v.clone())))
        .collect()
    }

    /// Fill the args that `args` does not already carry.
    pub fn merge_into(&self, args: &mut HashMap<String, String>) {
        for (name, value) in self.url_args() {
            args.entry(name).or_insert(value);
        }
    }
}
