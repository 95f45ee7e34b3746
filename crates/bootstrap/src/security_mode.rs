//! Agreement check between credential and profile security modes.
//!
//! Every profile server entry must declare the same security mode as the
//! credential does for that entry's role. The scan always covers the whole
//! entry list and is independent of entry order.

use crate::credentials::{BootstrapCredentialRecord, CredentialBundle, ServerRole};

/// Per-role outcome of a security mode check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityModeCheck {
    /// Every bootstrap-server entry agrees with the credential
    pub bootstrap_ok: bool,
    /// Every management-server entry agrees with the credential
    pub management_ok: bool,
}

impl SecurityModeCheck {
    pub fn is_valid(&self) -> bool {
        self.bootstrap_ok && self.management_ok
    }
}

/// Compare the profile entries of `record` against its credentials.
pub fn check_record(record: &BootstrapCredentialRecord) -> SecurityModeCheck {
    let bootstrap_mode = record.credential(ServerRole::Bootstrap).security_mode;
    let management_mode = record.credential(ServerRole::Management).security_mode;

    let mut check = SecurityModeCheck {
        bootstrap_ok: true,
        management_ok: true,
    };
    for entry in &record.servers {
        match entry.role() {
            ServerRole::Bootstrap => {
                if entry.security_mode != bootstrap_mode {
                    check.bootstrap_ok = false;
                }
            }
            ServerRole::Management => {
                if entry.security_mode != management_mode {
                    check.management_ok = false;
                }
            }
        }
    }
    check
}

/// `true` iff the bundle carries a credential record whose profile entries
/// agree with it for both roles.
pub fn validate(bundle: &CredentialBundle) -> bool {
    bundle
        .bootstrap_credential
        .as_ref()
        .map(|record| check_record(record).is_valid())
        .unwrap_or(false)
}
