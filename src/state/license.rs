/// License auto-completion
///
/// Known licenses pre-fill the three legal permission fields. This is only a
/// default: the user can change the fields afterwards and nothing re-checks
/// them against the license.
use super::data::Permission;
use super::data::Permission::{No, NotClear, Yes};

/// (allow_commercial, allow_modifications, require_attribution)
pub type LegalDefaults = (Permission, Permission, Permission);

const AUTOCOMPLETION: [(&str, LegalDefaults); 10] = [
    ("CC0", (Yes, Yes, No)),
    ("CC BY", (Yes, Yes, Yes)),
    ("CC BY-SA", (Yes, Yes, Yes)),
    ("CC BY-NC", (No, Yes, Yes)),
    ("CC BY-NC-SA", (No, Yes, Yes)),
    ("MIT", (Yes, Yes, Yes)),
    ("GPL", (Yes, Yes, Yes)),
    ("LGPL", (Yes, Yes, Yes)),
    ("Public domain (as stated)", (Yes, Yes, No)),
    ("Proprietary", (NotClear, NotClear, NotClear)),
];

/// Legal defaults for `license`, if it is a known one
pub fn legal_defaults(license: &str) -> Option<LegalDefaults> {
    AUTOCOMPLETION
        .iter()
        .find(|(name, _)| *name == license)
        .map(|(_, defaults)| *defaults)
}
