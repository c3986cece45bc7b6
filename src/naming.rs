//! Placeholder resolution and results file naming.
//!
//! Templates are plain strings with `{Display Name}` tokens that resolve
//! against a [`ParameterStore`], plus optional Python-style format specs:
//!
//! - `{Pump Power}` - substitutes the parameter's default rendering
//! - `{Pump Power:.2f}` - forwards `.2f` to the numeric formatter
//! - `{{` / `}}` - literal braces
//!
//! Lookups are strict: a display name with no registered parameter fails
//! resolution outright, and nothing is substituted partially. Rendering is
//! decided by the parameter's kind (see
//! [`ParameterValue`](crate::parameter::ParameterValue)): booleans become
//! `True`/`False`, numerics honor their format spec, and a numeric spec on a
//! non-numeric value is an error rather than a coercion.
//!
//! File naming builds on the same resolution: configured prefix/suffix
//! templates may reference parameters as well as the `{date}` and `{time}`
//! aliases, and allocated paths avoid collisions with an incrementing index.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::config::{NamingSettings, Settings};
use crate::error::{AppResult, ResultsError};
use crate::parameter::ParameterValue;
use crate::registry::ParameterStore;

/// Alias usable in filename templates for the current date.
pub const DATE_PLACEHOLDER: &str = "date";

/// Alias usable in filename templates for the current time.
pub const TIME_PLACEHOLDER: &str = "time";

/// Collect the display names referenced by a template, in first-appearance
/// order, without duplicates.
///
/// A token is the text between an unescaped `{` and the next `}`; the name
/// is everything before the first `:` inside it, matched verbatim (spaces
/// and punctuation included, no trimming). An unterminated token yields no
/// name here and is reported by resolution instead.
pub fn placeholder_names(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut chars = template.char_indices().peekable();

    while let Some((_, ch)) = chars.next() {
        match ch {
            '{' => {
                // Escape sequence {{
                if let Some((_, '{')) = chars.peek() {
                    chars.next();
                    continue;
                }

                let mut token = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    token.push(c);
                }
                if !closed {
                    break;
                }

                let name = token
                    .split_once(':')
                    .map_or(token.as_str(), |(name, _)| name);
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
            '}' => {
                // Escape sequence }}
                if let Some((_, '}')) = chars.peek() {
                    chars.next();
                }
            }
            _ => {}
        }
    }

    names
}

/// Resolve every placeholder in `template` against `store`.
///
/// Pure and synchronous: values are read once per call, so a name referenced
/// twice yields the same text twice. The first unknown display name (in
/// template order) aborts resolution with
/// [`ResultsError::UnresolvedPlaceholder`] and no output is produced.
/// Templates without tokens come back unchanged.
pub fn resolve_placeholders(template: &str, store: &dyn ParameterStore) -> AppResult<String> {
    let mut vars = HashMap::new();
    for name in placeholder_names(template) {
        if name.is_empty() {
            return Err(ResultsError::InvalidTemplate(
                "empty placeholder name".to_string(),
            ));
        }
        let parameter = store
            .get(&name)
            .ok_or_else(|| ResultsError::UnresolvedPlaceholder(name.clone()))?;
        vars.insert(name, parameter.value()?.clone());
    }
    format_template(template, &vars)
}

/// Allocate a path for a new results file.
///
/// The configured prefix and suffix are resolved against `store` first,
/// with `{date}` and `{time}` available as extra aliases (a registered
/// parameter of the same display name wins). The file name is
/// `prefix + datestamp`, followed by `_N` for the first free index when
/// indexing is enabled, then the suffix and extension. The target directory
/// (including the dated subfolder, when configured) is created if missing.
///
/// The file itself is not created; the returned path simply did not exist
/// at the time of the call.
pub fn unique_filename(settings: &Settings, store: &dyn ParameterStore) -> AppResult<PathBuf> {
    let now = Local::now();
    let naming = &settings.naming;
    let prefix =
        resolve_filename_component(&settings.storage.filename_prefix, store, &now, naming)?;
    let suffix =
        resolve_filename_component(&settings.storage.filename_suffix, store, &now, naming)?;

    let mut directory = settings.storage.directory.clone();
    if settings.storage.dated_folder {
        directory.push(format_timestamp(&now, &naming.date_format)?);
    }
    if !directory.exists() {
        std::fs::create_dir_all(&directory)?;
    }

    let base = format!(
        "{}{}",
        prefix,
        format_timestamp(&now, &naming.datetime_format)?
    );
    let extension = &settings.storage.extension;

    let path = if settings.storage.use_index {
        let mut index = 1u32;
        loop {
            let candidate = directory.join(format!("{}_{}{}.{}", base, index, suffix, extension));
            if !candidate.exists() {
                break candidate;
            }
            index += 1;
        }
    } else {
        directory.join(format!("{}{}.{}", base, suffix, extension))
    };

    log::debug!("Allocated results path '{}'", path.display());
    Ok(path)
}

/// Resolve a filename prefix/suffix template, with the timestamp aliases
/// layered under the store.
fn resolve_filename_component(
    template: &str,
    store: &dyn ParameterStore,
    now: &DateTime<Local>,
    naming: &NamingSettings,
) -> AppResult<String> {
    let mut vars = HashMap::new();
    for name in placeholder_names(template) {
        if name.is_empty() {
            return Err(ResultsError::InvalidTemplate(
                "empty placeholder name".to_string(),
            ));
        }
        if let Some(parameter) = store.get(&name) {
            vars.insert(name, parameter.value()?.clone());
        } else if name == DATE_PLACEHOLDER {
            let stamp = format_timestamp(now, &naming.date_format)?;
            vars.insert(name, ParameterValue::String(stamp));
        } else if name == TIME_PLACEHOLDER {
            let stamp = format_timestamp(now, &naming.time_format)?;
            vars.insert(name, ParameterValue::String(stamp));
        } else {
            return Err(ResultsError::UnresolvedPlaceholder(name));
        }
    }
    format_template(template, &vars)
}

fn format_template(template: &str, vars: &HashMap<String, ParameterValue>) -> AppResult<String> {
    Ok(strfmt::strfmt(template, vars)?)
}

/// Render a chrono format string, catching invalid specifiers instead of
/// letting the formatting machinery panic downstream.
pub(crate) fn format_timestamp(now: &DateTime<Local>, format: &str) -> AppResult<String> {
    use std::fmt::Write;

    let mut rendered = String::new();
    write!(rendered, "{}", now.format(format)).map_err(|_| {
        ResultsError::Configuration(format!("invalid datetime format '{}'", format))
    })?;
    Ok(rendered)
}
