use std::error::Error;
use std::io::{BufRead, Write};
use std::str::FromStr;

use log::debug;
use serde_json::Value;

use crate::model::entity::Entity;
use crate::model::Kind;
use crate::storage::{FileStorage, StorageError};
use crate::value::{parse_literal, strip_quotes};

mod dotted;

pub const PROMPT: &str = "(hbnb) ";

const CLASS_NAME_MISSING: &str = "** class name missing **";
const CLASS_DOESNT_EXIST: &str = "** class doesn't exist **";
const INSTANCE_ID_MISSING: &str = "** instance id missing **";
const NO_INSTANCE_FOUND: &str = "** no instance found **";
const ATTRIBUTE_MISSING: &str = "** attribute name or value missing **";
const NOT_A_DICTIONARY: &str = "** value is not a dictionary **";
const UNKNOWN_ERROR: &str = "** Unknown error **";
const COUNT_USAGE: &str = "** class name missing or too many args **";

fn unknown_syntax(line: &str) -> String {
    format!("*** Unknown syntax: {line} ***")
}

/// The read-eval-print loop. Owns the storage; every command runs to
/// completion before the next line is read. Errors print a message and the
/// loop continues; only save/reload I/O failures escape.
pub struct Console {
    storage: FileStorage,
    quiet: bool,
}

impl Console {
    pub const fn new(storage: FileStorage, quiet: bool) -> Self {
        Self { storage, quiet }
    }

    /// Reads one command per line until `quit` or end of input. The prompt
    /// is written before every read, piped input included, unless quiet.
    pub fn cmdloop(&mut self, mut input: impl BufRead, mut output: impl Write) -> Result<(), Box<dyn Error>> {
        let mut line = String::new();

        loop {
            if !self.quiet {
                write!(output, "{PROMPT}")?;
                output.flush()?;
            }

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                break;
            }

            let mut out = Vec::new();
            let result = self.onecmd(line.trim(), &mut out);
            for printed in &out {
                writeln!(output, "{printed}")?;
            }

            if result? {
                break;
            }
        }

        Ok(())
    }

    /// Dispatches one input line, pushing printable output onto `out`.
    /// Returns true when the loop should stop.
    pub fn onecmd(&mut self, line: &str, out: &mut Vec<String>) -> Result<bool, StorageError> {
        if line.is_empty() {
            return Ok(false);
        }

        let (command, arg) = split_command(line);
        debug!("dispatching {command:?} with {arg:?}");

        match command {
            "quit" => return Ok(true),
            "EOF" => {
                out.push(String::new());
                return Ok(true);
            }
            "create" => self.do_create(arg, out)?,
            "show" => self.do_show(arg, out),
            "destroy" => self.do_destroy(arg, out)?,
            "all" => self.do_all(arg, out),
            "update" => self.do_update(arg, out)?,
            "count" => self.do_count(arg, out),
            "help" => do_help(arg, out),
            _ => self.default(line, out)?,
        }

        Ok(false)
    }

    fn do_create(&mut self, arg: &str, out: &mut Vec<String>) -> Result<(), StorageError> {
        let args: Vec<&str> = arg.split_whitespace().collect();
        let Some(first) = args.first() else {
            out.push(CLASS_NAME_MISSING.to_owned());
            return Ok(());
        };
        if first.contains('.') {
            out.push(unknown_syntax(arg));
            return Ok(());
        }
        let Ok(kind) = Kind::from_str(first) else {
            out.push(CLASS_DOESNT_EXIST.to_owned());
            return Ok(());
        };

        let entity = Entity::new(kind);
        let id = entity.id().to_owned();
        self.storage.add(entity);
        self.storage.save()?;
        out.push(id);

        Ok(())
    }

    fn do_show(&self, arg: &str, out: &mut Vec<String>) {
        let args: Vec<&str> = arg.split_whitespace().collect();
        let Some(first) = args.first() else {
            out.push(CLASS_NAME_MISSING.to_owned());
            return;
        };
        if Kind::from_str(first).is_err() {
            out.push(CLASS_DOESNT_EXIST.to_owned());
            return;
        }
        let Some(id) = args.get(1) else {
            out.push(INSTANCE_ID_MISSING.to_owned());
            return;
        };

        match self.storage.all().get(&format!("{first}.{id}")) {
            Some(entity) => out.push(entity.to_string()),
            None => out.push(NO_INSTANCE_FOUND.to_owned()),
        }
    }

    fn do_destroy(&mut self, arg: &str, out: &mut Vec<String>) -> Result<(), StorageError> {
        let args: Vec<&str> = arg.split_whitespace().collect();
        let Some(first) = args.first() else {
            out.push(CLASS_NAME_MISSING.to_owned());
            return Ok(());
        };
        if Kind::from_str(first).is_err() {
            out.push(CLASS_DOESNT_EXIST.to_owned());
            return Ok(());
        }
        let Some(id) = args.get(1) else {
            out.push(INSTANCE_ID_MISSING.to_owned());
            return Ok(());
        };

        if self.storage.all_mut().remove(&format!("{first}.{id}")).is_some() {
            self.storage.save()?;
        } else {
            out.push(NO_INSTANCE_FOUND.to_owned());
        }

        Ok(())
    }

    fn do_all(&self, arg: &str, out: &mut Vec<String>) {
        let args: Vec<&str> = arg.split_whitespace().collect();

        match args.first() {
            None => {
                let listed: Vec<String> = self.storage.all().values().map(ToString::to_string).collect();
                out.push(render_list(&listed));
            }
            Some(first) => match Kind::from_str(first) {
                Ok(kind) => {
                    let listed: Vec<String> = self
                        .storage
                        .all()
                        .values()
                        .filter(|entity| entity.kind() == kind)
                        .map(ToString::to_string)
                        .collect();
                    out.push(render_list(&listed));
                }
                Err(()) => out.push(CLASS_DOESNT_EXIST.to_owned()),
            },
        }
    }

    fn do_count(&self, arg: &str, out: &mut Vec<String>) {
        let args: Vec<&str> = arg.split_whitespace().collect();
        if args.len() != 1 {
            out.push(COUNT_USAGE.to_owned());
            return;
        }

        match Kind::from_str(args[0]) {
            Ok(kind) => {
                let prefix = format!("{kind}.");
                let count = self.storage.all().keys().filter(|key| key.starts_with(&prefix)).count();
                out.push(count.to_string());
            }
            Err(()) => out.push(CLASS_DOESNT_EXIST.to_owned()),
        }
    }

    fn do_update(&mut self, arg: &str, out: &mut Vec<String>) -> Result<(), StorageError> {
        let args: Vec<&str> = arg.splitn(3, ' ').collect();
        if args.is_empty() || args[0].is_empty() {
            out.push(CLASS_NAME_MISSING.to_owned());
            return Ok(());
        }
        if Kind::from_str(args[0]).is_err() {
            out.push(CLASS_DOESNT_EXIST.to_owned());
            return Ok(());
        }
        if args.len() < 2 || args[1].is_empty() {
            out.push(INSTANCE_ID_MISSING.to_owned());
            return Ok(());
        }
        let key = format!("{}.{}", args[0], args[1]);
        if !self.storage.all().contains_key(&key) {
            out.push(NO_INSTANCE_FOUND.to_owned());
            return Ok(());
        }

        if args.len() == 3 && args[2].starts_with('{') && args[2].ends_with('}') {
            match parse_literal(args[2]) {
                Ok(Value::Object(pairs)) => {
                    for (name, value) in pairs {
                        self.apply_update(&key, &name, value)?;
                    }
                }
                Ok(_) => out.push(NOT_A_DICTIONARY.to_owned()),
                Err(error) => out.push(error.to_string()),
            }
        } else if args.len() == 3 {
            let attr_args: Vec<&str> = args[2].splitn(2, ' ').collect();
            if attr_args.len() < 2 {
                out.push(ATTRIBUTE_MISSING.to_owned());
                return Ok(());
            }

            let (name, value_text) = (attr_args[0], attr_args[1]);
            let value =
                parse_literal(value_text).unwrap_or_else(|_| Value::String(strip_quotes(value_text).to_owned()));
            self.apply_update(&key, name, value)?;
        } else {
            out.push(UNKNOWN_ERROR.to_owned());
        }

        Ok(())
    }

    // One whole-store save per assignment, matching the original tool's
    // observable behavior during dictionary updates.
    fn apply_update(&mut self, key: &str, name: &str, value: Value) -> Result<(), StorageError> {
        if let Some(entity) = self.storage.all_mut().get_mut(key) {
            entity.set_attr(name, value);
            entity.touch();
            self.storage.save()?;
        }

        Ok(())
    }
}

/// Bracketed list of representations, each in single quotes, the format
/// interactive users of this tool have always seen.
fn render_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| format!("'{item}'")).collect();

    format!("[{}]", quoted.join(", "))
}

/// First identifier run of the line, and the rest as the argument string.
fn split_command(line: &str) -> (&str, &str) {
    let end = line
        .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .unwrap_or(line.len());

    (&line[..end], line[end..].trim())
}

fn do_help(arg: &str, out: &mut Vec<String>) {
    let topics = [
        ("EOF", "Exits the console on end of input."),
        ("all", "Shows all instances of a class, or of all classes. Usage: all [<class name>]"),
        ("count", "Counts instances of a class. Usage: count <class name>"),
        ("create", "Creates a new instance of a class. Usage: create <class name>"),
        ("destroy", "Deletes an instance. Usage: destroy <class name> <id>"),
        ("help", "Shows this list, or the usage of one command. Usage: help [<command>]"),
        ("quit", "Exits the console. Usage: quit"),
        ("show", "Shows an instance. Usage: show <class name> <id>"),
        (
            "update",
            "Updates an instance attribute, or several via a dictionary. \
             Usage: update <class name> <id> <attribute name> \"<attribute value>\"",
        ),
    ];

    if arg.is_empty() {
        out.push("Documented commands (type help <topic>):".to_owned());
        out.push("========================================".to_owned());
        let names: Vec<&str> = topics.iter().map(|(name, _)| *name).collect();
        out.push(names.join("  "));
        return;
    }

    match topics.iter().find(|(name, _)| *name == arg) {
        Some((_, usage)) => out.push((*usage).to_owned()),
        None => out.push(format!("*** No help on {arg}")),
    }
}
