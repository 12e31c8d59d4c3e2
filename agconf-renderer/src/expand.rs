//! Template expansion for repeated test cases and commands.
//!
//! A `repeat` list of N substitution maps turns one template entity into N
//! concrete entities. Each copy is a fresh clone of the template with every
//! placeholder key replaced (literal substring replacement, in map order) in
//! its templated text fields:
//!
//! - test case: `name`, then every command it carries;
//! - command: `name`, `cmd`, and the three instructor-file references when set.
//!
//! Keys listed in [`POINT_OVERRIDE_KEYS`] are not text placeholders; their
//! integer value overwrites the matching scoring field of the command.

use agconf_core::{Command, Substitution, TestCase, TestSuite};
use serde_json::Value;

use crate::error::RenderError;

/// `repeat` keys that set a command's scoring field instead of replacing text.
pub const POINT_OVERRIDE_KEYS: [&str; 6] = [
    "_points_for_correct_return_code",
    "_points_for_correct_stdout",
    "_points_for_correct_stderr",
    "_deduction_for_wrong_return_code",
    "_deduction_for_wrong_stdout",
    "_deduction_for_wrong_stderr",
];

pub fn is_point_override(key: &str) -> bool {
    POINT_OVERRIDE_KEYS.contains(&key)
}

/// An entity that can be cloned with a substitution map applied.
pub trait Repeatable: Clone {
    /// The entity's own `repeat` list.
    fn repeat(&self) -> &[Substitution];

    /// A new value equal to `self` with `sub` applied to every templated field.
    fn substituted(&self, sub: &Substitution) -> Result<Self, RenderError>;
}

/// Produce one concrete copy of `template` per substitution map.
///
/// An empty `substitutions` list yields a single unmodified copy.
pub fn expand<T: Repeatable>(
    template: &T,
    substitutions: &[Substitution],
) -> Result<Vec<T>, RenderError> {
    if substitutions.is_empty() {
        return Ok(vec![template.clone()]);
    }
    substitutions
        .iter()
        .map(|sub| template.substituted(sub))
        .collect()
}

/// Replace every placeholder of `sub` in `text`, skipping point overrides.
pub fn apply_substitutions(text: &str, sub: &Substitution) -> String {
    sub.iter()
        .filter(|(key, _)| !key.is_empty() && !is_point_override(key))
        .fold(text.to_owned(), |acc, (key, value)| {
            acc.replace(key.as_str(), &replacement_text(value))
        })
}

/// String form of a replacement value: strings verbatim, `null` as empty.
pub fn replacement_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl Repeatable for Command {
    fn repeat(&self) -> &[Substitution] {
        &self.repeat
    }

    fn substituted(&self, sub: &Substitution) -> Result<Self, RenderError> {
        let mut cmd = self.clone();
        cmd.name = apply_substitutions(&self.name, sub);
        cmd.cmd = apply_substitutions(&self.cmd, sub);
        for file in [
            &mut cmd.stdin_instructor_file,
            &mut cmd.expected_stdout_instructor_file,
            &mut cmd.expected_stderr_instructor_file,
        ] {
            if let Some(name) = file.as_mut() {
                *name = apply_substitutions(name, sub);
            }
        }

        for (key, value) in sub.iter().filter(|(key, _)| is_point_override(key)) {
            let points = value.as_i64().ok_or_else(|| RenderError::InvalidOverride {
                entity: self.name.clone(),
                key: key.clone(),
                value: value.clone(),
            })?;
            if let Some(field) = cmd.scoring_field_mut(&key[1..]) {
                *field = Some(points);
            }
        }
        Ok(cmd)
    }
}

impl Repeatable for TestCase {
    fn repeat(&self) -> &[Substitution] {
        &self.repeat
    }

    fn substituted(&self, sub: &Substitution) -> Result<Self, RenderError> {
        Ok(TestCase {
            name: apply_substitutions(&self.name, sub),
            repeat: self.repeat.clone(),
            commands: self
                .commands
                .iter()
                .map(|cmd| cmd.substituted(sub))
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Expand each command by its own `repeat` list. Results carry no `repeat`.
pub fn materialize_commands(commands: &[Command]) -> Result<Vec<Command>, RenderError> {
    let mut concrete = Vec::with_capacity(commands.len());
    for template in commands {
        for mut cmd in expand(template, template.repeat())? {
            cmd.repeat.clear();
            concrete.push(cmd);
        }
    }
    Ok(concrete)
}

/// Expand a test case by its own `repeat` list, then expand the commands of
/// every copy by theirs. Results carry no `repeat` at either level.
pub fn materialize_test_case(template: &TestCase) -> Result<Vec<TestCase>, RenderError> {
    expand(template, template.repeat())?
        .into_iter()
        .map(|mut case| {
            case.repeat.clear();
            case.commands = materialize_commands(&case.commands)?;
            Ok(case)
        })
        .collect()
}

/// Every concrete test case of `suite`, in document order.
pub fn materialize_suite(suite: &TestSuite) -> Result<Vec<TestCase>, RenderError> {
    let mut cases = Vec::with_capacity(suite.test_cases.len());
    for template in &suite.test_cases {
        cases.extend(materialize_test_case(template)?);
    }
    Ok(cases)
}
