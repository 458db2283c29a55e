//! Normalize a YAML plan into a record [`Table`].
//!
//! Emission order: for each job, for each build, for each test group (the
//! job's own groups first, then the build's), for each test name.

use crate::error::LoadError;
use crate::plan::{Build, Job, Plan, TestGroup};
use kernelboard_core::{Record, Table, UNKNOWN};
use serde_yaml_ng::Value;
use std::path::Path;

/// Name given to builds without a `build_name`.
pub const UNNAMED_BUILD: &str = "Unnamed Build";

/// Load a plan from YAML text.
///
/// # Errors
///
/// Returns [`LoadError::MalformedConfig`] when required structure is missing,
/// [`LoadError::InvalidValue`] naming the field when a section or leaf has
/// the wrong type, and
/// [`LoadError::Yaml`] for syntax errors.
pub fn load_str(yaml: &str) -> Result<Table, LoadError> {
    if yaml.trim().is_empty() {
        return Err(LoadError::missing("jobs", "document root"));
    }
    let root: Value = serde_yaml_ng::from_str(yaml)?;
    match &root {
        Value::Mapping(map) if map.contains_key("jobs") => {}
        Value::Mapping(_) | Value::Null => return Err(LoadError::missing("jobs", "document root")),
        _ => {
            return Err(LoadError::invalid(
                "document root",
                "expected a mapping with a 'jobs' key",
            ))
        }
    }
    check_shape(&root)?;
    let plan: Plan = serde_yaml_ng::from_value(root)?;
    load_plan(&plan)
}

/// Check every list section before typed conversion, so a wrong shape names
/// its field instead of surfacing as a bare YAML error.
fn check_shape(root: &Value) -> Result<(), LoadError> {
    let Some(jobs) = list(root.get("jobs"), "jobs")? else {
        return Ok(());
    };
    for (j, job) in jobs.iter().enumerate() {
        let context = format!("jobs[{j}]");
        mapping(job, &context)?;
        check_groups(job.get("tests"), &format!("{context}.tests"))?;
        let builds = list(job.get("builds"), &format!("{context}.builds"))?;
        for (b, build) in builds.unwrap_or_default().iter().enumerate() {
            let build_ctx = format!("{context}.builds[{b}]");
            mapping(build, &build_ctx)?;
            check_groups(build.get("tests"), &format!("{build_ctx}.tests"))?;
        }
    }
    Ok(())
}

fn check_groups(value: Option<&Value>, field: &str) -> Result<(), LoadError> {
    let groups = list(value, field)?.unwrap_or_default();
    for (g, group) in groups.iter().enumerate() {
        mapping(group, &format!("{field}[{g}]"))?;
    }
    Ok(())
}

fn list<'a>(value: Option<&'a Value>, field: &str) -> Result<Option<&'a [Value]>, LoadError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Sequence(seq)) => Ok(Some(seq.as_slice())),
        Some(other) => Err(LoadError::invalid(
            field,
            format!("expected a list, found {}", kind(other)),
        )),
    }
}

fn mapping(value: &Value, field: &str) -> Result<(), LoadError> {
    match value {
        Value::Mapping(_) => Ok(()),
        other => Err(LoadError::invalid(
            field,
            format!("expected a mapping, found {}", kind(other)),
        )),
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Load a plan file.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read, otherwise as [`load_str`].
pub fn load_file(path: &Path) -> Result<Table, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = load_str(&content)?;
    log::info!("loaded {} records from {}", table.len(), path.display());
    Ok(table)
}

/// Normalize an already parsed plan.
///
/// # Errors
///
/// See [`load_str`].
pub fn load_plan(plan: &Plan) -> Result<Table, LoadError> {
    let jobs = plan
        .jobs
        .as_ref()
        .ok_or_else(|| LoadError::missing("jobs", "document root"))?;

    let mut records = Vec::new();
    for (j, job) in jobs.iter().enumerate() {
        let before = records.len();
        emit_job(job, j, &mut records)?;
        log::debug!("jobs[{j}] emitted {} records", records.len() - before);
    }
    Ok(Table::new(records))
}

fn emit_job(job: &Job, j: usize, out: &mut Vec<Record>) -> Result<(), LoadError> {
    let context = format!("jobs[{j}]");
    let job_name = job
        .name
        .as_ref()
        .map(|v| scalar(v, &format!("{context}.name")))
        .transpose()?
        .ok_or_else(|| LoadError::missing("name", context.clone()))?;

    let builds = job.builds.as_deref().unwrap_or_default();
    if builds.is_empty() {
        log::warn!("job '{job_name}' has no builds; it contributes no records");
    }
    let job_groups = job.tests.as_deref().unwrap_or_default();

    for (b, build) in builds.iter().enumerate() {
        let build_ctx = format!("{context}.builds[{b}]");
        let fields = BuildFields::from_build(build, &build_ctx)?;
        let build_groups = build.tests.as_deref().unwrap_or_default();

        let groups = job_groups
            .iter()
            .enumerate()
            .map(|(g, group)| (format!("{context}.tests[{g}]"), group))
            .chain(
                build_groups
                    .iter()
                    .enumerate()
                    .map(|(g, group)| (format!("{build_ctx}.tests[{g}]"), group)),
            );

        for (group_ctx, group) in groups {
            let device = device_name(group, &group_ctx)?;
            for test_name in test_names(group, &group_ctx)? {
                out.push(
                    Record::new(job_name.clone(), fields.build_name.clone(), test_name)
                        .architecture(fields.architecture.clone())
                        .toolchain(fields.toolchain.clone())
                        .device(device.clone()),
                );
            }
        }
    }
    Ok(())
}

struct BuildFields {
    build_name: String,
    architecture: String,
    toolchain: String,
}

impl BuildFields {
    fn from_build(build: &Build, context: &str) -> Result<Self, LoadError> {
        Ok(Self {
            build_name: optional(build.build_name.as_ref(), &format!("{context}.build_name"))?
                .unwrap_or_else(|| UNNAMED_BUILD.to_string()),
            architecture: optional(build.target_arch.as_ref(), &format!("{context}.target_arch"))?
                .unwrap_or_else(|| UNKNOWN.to_string()),
            toolchain: optional(build.toolchain.as_ref(), &format!("{context}.toolchain"))?
                .unwrap_or_else(|| UNKNOWN.to_string()),
        })
    }
}

fn device_name(group: &TestGroup, context: &str) -> Result<String, LoadError> {
    let field = format!("{context}.device");
    let name = match &group.device {
        None | Some(Value::Null) => None,
        Some(Value::Mapping(map)) => match map.get("name") {
            None => None,
            Some(v) => optional(Some(v), &format!("{field}.name"))?,
        },
        Some(v) => optional(Some(v), &field)?,
    };
    Ok(name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string()))
}

fn test_names(group: &TestGroup, context: &str) -> Result<Vec<String>, LoadError> {
    let field = format!("{context}.tests");
    match &group.tests {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(seq)) => seq
            .iter()
            .enumerate()
            .map(|(i, v)| scalar(v, &format!("{field}[{i}]")))
            .collect(),
        Some(v) => Ok(vec![scalar(v, &field)?]),
    }
}

fn optional(value: Option<&Value>, field: &str) -> Result<Option<String>, LoadError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => scalar(v, field).map(Some),
    }
}

/// Render a scalar YAML value as text; anything else is an error.
fn scalar(value: &Value, field: &str) -> Result<String, LoadError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Err(LoadError::invalid(field, "expected a value, found null")),
        Value::Sequence(_) => Err(LoadError::invalid(field, "expected a scalar, found a list")),
        Value::Mapping(_) => Err(LoadError::invalid(
            field,
            "expected a scalar, found a mapping",
        )),
        Value::Tagged(tagged) => scalar(&tagged.value, field),
    }
}
