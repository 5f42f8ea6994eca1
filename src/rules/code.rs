//! Code detection: raw input that looks like a program is run in the sandbox.

use crate::{Intent, Rule};
use tracing::warn;

/// Keywords are matched case-sensitively against the raw text.
pub fn rule_code() -> Rule {
    rule! {
        name: "code",
        intent: Intent::Code,
        pattern: raw_phrases!["print", "for ", "while ", "def ", "import "],
        prod: |utt, _m, scope| {
            let body = match scope.runner.run(utt.raw()) {
                Ok(result) => result.render(),
                Err(err) => {
                    warn!(target: "parley::sandbox", error = %err, "program runner failed");
                    format!("error executing: {err}")
                }
            };
            Some(format!("Program output:\n{body}"))
        },
    }
}
