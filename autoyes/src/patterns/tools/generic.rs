//! Generic, tool-agnostic prompts.
//!
//! Always loaded first. Destructive verbs (overwrite, replace, delete,
//! remove, upgrade, update, merge, restart, reboot, install) are left out on
//! purpose; users add them with a custom pattern when they want them.

use crate::patterns::CategoryDefinition;

/// Create the generic category definition.
pub fn category() -> CategoryDefinition {
    CategoryDefinition::new("generic")
        .with_description("universal interactive prompt patterns")
        // [y/n] family
        .with_pattern(r"\[y/n\]")
        .with_pattern(r"\[Y/n\]")
        .with_pattern(r"\[y/N\]")
        .with_pattern(r"\[Y/N\]")
        .with_pattern(r"\(y/n\)")
        .with_pattern(r"\(Y/n\)")
        .with_pattern(r"\(y/N\)")
        .with_pattern(r"\(Y/N\)")
        // [yes/no] family
        .with_reply(r"\[yes/no\]", "yes")
        .with_reply(r"\(yes/no\)", "yes")
        .with_reply(r"\[Yes/No\]", "yes")
        // conda-style default markers
        .with_pattern(r"\(\[y\]/n\)")
        .with_pattern(r"\(y/\[n\]\)")
        // npm "Ok to proceed? (y)"
        .with_pattern(r"\?\s*\(y\)\s*$")
        .with_pattern(r"\?\s*y/n\s*:?\s*$")
        .with_pattern(r"\[Y\]es\s*/\s*\[N\]o")
        .with_pattern(r"\[Y\]es\s*/\s*\[n\]o")
        // ssh host-key fingerprint confirmation
        .with_reply(r"continue connecting\s*\(yes/no(?:/\[fingerprint\])?\)", "yes")
        .with_pattern(r"Do you want to continue\s*\?")
        .with_pattern(r"Do you wish to proceed\s*\?")
        .with_pattern(r"Are you sure\s*\?")
        .with_pattern(r"Continue\s*\?")
        .with_pattern(r"Proceed\s*\?")
        .with_pattern(r"Confirm\s*\?")
        .with_pattern(r"[Ww]ould you like to\b.*\?")
        .with_pattern(r"Do you (?:agree|accept)\b.*\?")
        .with_pattern(r"[Aa]llow\b.*\?")
        .with_pattern(r"[Aa]pprove\b.*\?")
        .with_pattern(r"[Aa]ccept\b.*\?")
        .with_pattern(r"[Dd]ownload\b.*\?")
        .with_pattern(r"[Ee]nable\b.*\?")
        .with_pattern(r"[Cc]reate\b.*\?")
        // license / agreement
        .with_pattern(r"[Aa]ccept\s+(?:the\s+)?license\b")
        .with_pattern(r"[Aa]gree\s+to\s+(?:the\s+)?terms\b")
        // yum / dnf
        .with_pattern(r"Is this ok\s*\[")
        .with_pattern(r"\b[Nn]eed\s+to\b.*\?")
        .with_pattern(r"\b[Rr]equire[ds]?\b.*\?")
        .with_pattern(r"\b[Nn]ecessary\b.*\?")
        .with_reply(r"[Tt]ype\s+'?(?:yes|YES)'?\s+to\s+(?:continue|confirm|proceed)", "yes")
        .with_reply(r"[Ee]nter\s+'?(?:yes|YES)'?\s+to\s+(?:continue|confirm|proceed)", "yes")
        // terraform
        .with_reply(r"[Oo]nly\s+'?yes'?\s+will be accepted", "yes")
        // press enter / any key
        .with_reply(r"[Pp]ress\s+(?:[Ee]nter|[Rr]eturn)\s+to\s+continue", "")
        .with_reply(r"[Pp]ress\s+any\s+key\s+to\s+continue", "")
        .with_reply(r"\?\s*\(default:\s*[Yy](?:es)?\)", "")
        .with_reply(r"\?\s*\[default[=:]\s*[Yy](?:es)?\]", "")
}
