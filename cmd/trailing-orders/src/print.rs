use std::{env, fmt::Display};

use crate::submit::Outcome;

const TERMS: &[&str] = &["Apple_Terminal", "vscode"];

#[derive(Clone)]
pub struct Print {
    pub quiet: bool,
}

impl Print {
    pub fn new(quiet: bool) -> Print {
        Print { quiet }
    }

    // Some terminals like vscode's and macOS' default terminal will not render
    // the subsequent space if the emoji codepoints size is 2; in this case,
    // we need an additional space.
    pub fn compute_emoji<T: Display + Sized>(&self, emoji: T) -> String {
        if let Ok(term_program) = env::var("TERM_PROGRAM") {
            if TERMS.contains(&term_program.as_str()) && emoji.to_string().chars().count() == 2 {
                return format!("{emoji} ");
            }
        }

        emoji.to_string()
    }

    pub fn log_outcome(&self, outcome: &Outcome) {
        match outcome {
            Outcome::Success { hash, .. } => self.checkln(format!("Transaction {hash} succeeded")),
            Outcome::Failed { hash, .. } => self.errorln(format!("Transaction {hash} failed")),
            Outcome::Pending { hash } => self.warnln(format!(
                "Transaction {hash} is still pending; check on it later with its hash"
            )),
        }
    }
}

macro_rules! create_print_functions {
    ($nameln:ident, $icon:expr) => {
        impl Print {
            pub fn $nameln<T: Display + Sized>(&self, message: T) {
                if !self.quiet {
                    eprintln!("{} {}", self.compute_emoji($icon), message);
                }
            }
        }
    };
}

create_print_functions!(checkln, "✅");
create_print_functions!(errorln, "❌");
create_print_functions!(globeln, "🌎");
create_print_functions!(searchln, "🔎");
create_print_functions!(warnln, "⚠️");
