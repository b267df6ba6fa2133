use std::str::FromStr;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::console::{unknown_syntax, Console, CLASS_DOESNT_EXIST};
use crate::model::Kind;
use crate::storage::StorageError;

// `Type.update("<id>", "<attr>", "<value>")`, with a bare-digit variant for
// the last argument.
static SINGLE_UPDATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\w+)\.update\("([^"]+)", "([^"]+)", (?:"([^"]*)"|(\d+))\)$"#).expect("Pattern is valid")
});

// `Type.update("<id>", {<dictionary>})`.
static DICT_UPDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(\w+)\.update\("([^"]+)", (\{.*\})\)$"#).expect("Pattern is valid"));

// Generic `Type.method(arguments)` fallback.
static DOTTED_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)\.(\w+)\((.*)\)$").expect("Pattern is valid"));

impl Console {
    /// Handles every line whose first word is not a primary command: the
    /// dotted `Type.method(args)` forms, or an unknown-syntax report.
    pub(super) fn default(&mut self, line: &str, out: &mut Vec<String>) -> Result<(), StorageError> {
        if let Some(captures) = SINGLE_UPDATE.captures(line) {
            let value = captures
                .get(4)
                .or_else(|| captures.get(5))
                .map_or("", |found| found.as_str());
            // Re-quoted on re-invocation, so a bare-digit value is stored
            // as a string.
            let command = format!("{} {} {} \"{value}\"", &captures[1], &captures[2], &captures[3]);
            debug!("rewriting {line:?} as update {command:?}");
            self.do_update(&command, out)?;
        } else if let Some(captures) = DICT_UPDATE.captures(line) {
            let command = format!("{} {} {}", &captures[1], &captures[2], &captures[3]);
            debug!("rewriting {line:?} as update {command:?}");
            self.do_update(&command, out)?;
        } else if line.contains(".create()") {
            // The zero-argument dotted creation form has always been
            // rejected, unlike bare `create <type>`.
            out.push(unknown_syntax(line));
        } else if let Some(captures) = DOTTED_CALL.captures(line) {
            self.dispatch(&captures[1], &captures[2], &captures[3], line, out)?;
        } else {
            out.push(unknown_syntax(line));
        }

        Ok(())
    }

    fn dispatch(
        &mut self,
        class_name: &str,
        method: &str,
        arguments: &str,
        line: &str,
        out: &mut Vec<String>,
    ) -> Result<(), StorageError> {
        if Kind::from_str(class_name).is_err() {
            out.push(CLASS_DOESNT_EXIST.to_owned());
            return Ok(());
        }

        let joined = arguments.replace('"', "").split(',').collect::<Vec<_>>().join(" ");

        match method {
            "show" => self.do_show(&format!("{class_name} {joined}"), out),
            "destroy" => self.do_destroy(&format!("{class_name} {joined}"), out)?,
            "count" => self.do_count(class_name, out),
            "all" | "create" | "update" => {
                self.onecmd(&format!("{method} {class_name} {joined}"), out)?;
            }
            _ => out.push(unknown_syntax(line)),
        }

        Ok(())
    }
}
