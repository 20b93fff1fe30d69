//! Masks security-sensitive catalog values so diffing and plan printing
//! never compares or displays real secrets.
//!
//! Applied as the last step of [`crate::catalog::Catalog::load_with_file_dependencies`],
//! right before the catalog is handed to the diff engine.

use crate::catalog::Catalog;
use crate::catalog::foreign_server::MASKED_OPTION_VALUE;
use crate::catalog::subscription::MASKED_CONNINFO;

/// Keys whose values are always masked, even when the FDW/server in
/// question wouldn't obviously carry a credential. Masking the whole
/// option set for servers/mappings (rather than an allowlisted subset of
/// keys) is deliberate: a missed key is a leaked secret, a masked
/// non-secret is just a slightly less informative diff.
pub fn apply(catalog: &mut Catalog) {
    for server in &mut catalog.foreign_servers {
        for (_, value) in server.options.iter_mut() {
            *value = MASKED_OPTION_VALUE.to_string();
        }
    }

    for mapping in &mut catalog.user_mappings {
        for (_, value) in mapping.options.iter_mut() {
            *value = MASKED_OPTION_VALUE.to_string();
        }
    }

    for subscription in &mut catalog.subscriptions {
        subscription.conninfo = MASKED_CONNINFO.to_string();
    }
}
