//! Request bodies for each entity level.
//!
//! A body starts as the serialized document entity (unset optional fields are
//! already absent), drops the fields that are reconciled separately, then has
//! references rewritten and feedback presets resolved. Create bodies are
//! completed with the service's defaults; update bodies carry only what the
//! document sets.

use serde::Serialize;
use serde_json::{Map, Value};

use agconf_core::feedback::PresetTable;
use agconf_core::types::COMMAND_FEEDBACK_DEFAULTS;
use agconf_core::{
    Command, FeedbackRef, Presets, ProjectConfig, StudentFilePattern, TestCase, TestSuite,
};

use crate::error::SyncError;
use crate::rewrite::References;

/// Whether a body is for a new object or an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    Create,
    Update,
}

/// The project's pass-through settings plus its name.
pub fn project_body(project: &ProjectConfig) -> Value {
    let mut body = project.settings.clone();
    body.insert("name".to_owned(), Value::String(project.name.clone()));
    Value::Object(body)
}

pub fn student_file_body(pattern: &StudentFilePattern, mode: BodyMode) -> Result<Value, SyncError> {
    let mut body = to_object(pattern)?;
    if mode == BodyMode::Create {
        fill_defaults(&mut body, StudentFilePattern::create_defaults());
    }
    Ok(Value::Object(body))
}

/// Suite fields without its test cases. Suite feedback has no create defaults.
pub fn suite_body(
    suite: &TestSuite,
    refs: &References<'_>,
    presets: &Presets,
    mode: BodyMode,
) -> Result<Value, SyncError> {
    let mut body = to_object(suite)?;
    body.remove("test_cases");
    for (field, reference) in suite.feedback_refs() {
        body.remove(field);
        if let Some(reference) = reference {
            let config = resolve_preset(&presets.suites, reference, &suite.name)?;
            body.insert(field.to_owned(), config);
        }
    }
    refs.rewrite_suite(&mut body, &suite.name)?;
    if mode == BodyMode::Create {
        fill_defaults(&mut body, TestSuite::create_defaults());
    }
    Ok(Value::Object(body))
}

/// A concrete test case is identified and configured by its name alone.
pub fn test_case_body(case: &TestCase) -> Value {
    let mut body = Map::new();
    body.insert("name".to_owned(), Value::String(case.name.clone()));
    Value::Object(body)
}

/// Body for a concrete (already expanded) command. `entity` labels errors.
pub fn command_body(
    cmd: &Command,
    refs: &References<'_>,
    presets: &Presets,
    mode: BodyMode,
    entity: &str,
) -> Result<Value, SyncError> {
    let mut body = to_object(cmd)?;
    body.remove("repeat");

    for ((field, reference), (_, default)) in cmd.feedback_refs().into_iter().zip(COMMAND_FEEDBACK_DEFAULTS) {
        body.remove(field);
        let reference = match (reference, mode, default) {
            (Some(reference), _, _) => reference.clone(),
            (None, BodyMode::Create, Some(preset)) => FeedbackRef::named(preset),
            (None, _, _) => continue,
        };
        let config = resolve_preset(&presets.commands, &reference, entity)?;
        body.insert(field.to_owned(), config);
    }

    refs.rewrite_command(&mut body, entity)?;
    if mode == BodyMode::Create {
        fill_defaults(&mut body, Command::create_defaults());
    }
    Ok(Value::Object(body))
}

fn resolve_preset<T>(
    table: &PresetTable<T>,
    reference: &FeedbackRef<T>,
    entity: &str,
) -> Result<Value, SyncError>
where
    T: Clone + Serialize,
{
    let config = table
        .resolve(reference)
        .map_err(|source| SyncError::UnknownPreset {
            entity: entity.to_owned(),
            source,
        })?;
    Ok(serde_json::to_value(config)?)
}

fn fill_defaults(body: &mut Map<String, Value>, defaults: Map<String, Value>) {
    for (key, value) in defaults {
        body.entry(key).or_insert(value);
    }
}

fn to_object<T: Serialize>(entity: &T) -> Result<Map<String, Value>, SyncError> {
    match serde_json::to_value(entity)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}
