//! The reconciler: walks the document top-down and converges remote state.
//!
//! ## Order
//!
//! 1. Look up the course (never created).
//! 2. Project.
//! 3. Instructor files (multipart upload of local contents).
//! 4. Student file patterns.
//! 5. Sandbox images, only if some suite names one.
//! 6. Each suite, then each of its concrete test cases, then each case's
//!    concrete commands.
//!
//! Every entity is matched by its identity key within its parent. A match is
//! updated with the fields the document sets; a miss is created with service
//! defaults filling the rest, and the response is recorded so children and
//! later siblings can find it. The first failed write aborts the run. A
//! suite or command whose references cannot be resolved is skipped along
//! with its descendants and reported.

use std::fmt;
use std::path::Path;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde_json::Value;

use agconf_client::{ApiClient, Method, Upload};
use agconf_core::{AgConfig, CourseSelection, Presets, ProjectConfig, TestSuite};
use agconf_renderer::materialize_suite;

use crate::body::{self, BodyMode};
use crate::error::{io_err, SyncError};
use crate::index::{pk_of, ResourceIndex};
use crate::rewrite::References;

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

/// Levels of the project tree the reconciler writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Project,
    InstructorFile,
    StudentFile,
    TestSuite,
    TestCase,
    Command,
}

impl EntityKind {
    /// URL that updates the existing object `pk`.
    pub fn update_url(&self, pk: i64) -> String {
        match self {
            EntityKind::Project => format!("/api/projects/{pk}/"),
            EntityKind::InstructorFile => format!("/api/instructor_files/{pk}/content/"),
            EntityKind::StudentFile => format!("/api/expected_student_files/{pk}/"),
            EntityKind::TestSuite => format!("/api/ag_test_suites/{pk}/"),
            EntityKind::TestCase => format!("/api/ag_test_cases/{pk}/"),
            EntityKind::Command => format!("/api/ag_test_commands/{pk}/"),
        }
    }

    /// Instructor file contents are replaced with `PUT`; everything else is patched.
    pub fn update_method(&self) -> Method {
        match self {
            EntityKind::InstructorFile => Method::Put,
            _ => Method::Patch,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Project => "project",
            EntityKind::InstructorFile => "instructor file",
            EntityKind::StudentFile => "student file",
            EntityKind::TestSuite => "test suite",
            EntityKind::TestCase => "test case",
            EntityKind::Command => "command",
        };
        f.write_str(label)
    }
}

/// What happened to one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Created,
    Updated,
    /// Dry run: the entity would have been created.
    WouldCreate,
    /// Dry run: the entity would have been updated.
    WouldUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub kind: EntityKind,
    /// Identity key qualified by its ancestors, e.g. `Suite 1 / Test 2 / run`.
    pub name: String,
    pub action: Action,
    pub pk: i64,
}

/// An entity that was not reconciled, along with its descendants.
#[derive(Debug)]
pub struct Skipped {
    pub kind: EntityKind,
    pub name: String,
    pub error: SyncError,
}

/// Every outcome of a run, in the order the writes happened.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<Outcome>,
    pub skipped: Vec<Skipped>,
}

impl RunReport {
    pub fn count(&self, action: Action) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }

    /// True when nothing was skipped.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

enum Payload {
    Json(Value),
    File(Upload),
}

pub struct Reconciler<'a> {
    client: &'a dyn ApiClient,
    presets: &'a Presets,
    /// Directory instructor file paths are relative to.
    base_dir: &'a Path,
    dry_run: bool,
    report: RunReport,
}

impl<'a> Reconciler<'a> {
    /// `dry_run` only changes how outcomes are labelled; pass a
    /// [`DryRunClient`](crate::dry_run::DryRunClient) to suppress writes.
    pub fn new(
        client: &'a dyn ApiClient,
        presets: &'a Presets,
        base_dir: &'a Path,
        dry_run: bool,
    ) -> Self {
        Self {
            client,
            presets,
            base_dir,
            dry_run,
            report: RunReport::default(),
        }
    }

    pub fn reconcile(mut self, document: &AgConfig) -> Result<RunReport, SyncError> {
        let project = &document.project;
        let course_pk = self.find_course(&project.course)?;

        let projects_url = format!("/api/courses/{course_pk}/projects/");
        let mut projects = ResourceIndex::fetch(self.client, &projects_url, "project", "name")?;
        let remote_project = self.upsert(
            EntityKind::Project,
            project.name.clone(),
            &mut projects,
            &project.name,
            &projects_url,
            |_| Ok(Payload::Json(body::project_body(project))),
        )?;
        let project_pk = require_pk(&remote_project, &projects_url)?;

        let instructor_files = self.reconcile_instructor_files(project, project_pk)?;
        let student_files = self.reconcile_student_files(project, project_pk)?;
        let sandbox_images = if project
            .test_suites
            .iter()
            .any(|suite| suite.sandbox_docker_image.is_some())
        {
            Some(self.fetch_sandbox_images(course_pk)?)
        } else {
            None
        };

        let refs = References {
            instructor_files: &instructor_files,
            student_files: &student_files,
            sandbox_images: sandbox_images.as_ref(),
        };
        self.reconcile_suites(project, project_pk, &refs)?;
        Ok(self.report)
    }

    fn find_course(&self, course: &CourseSelection) -> Result<i64, SyncError> {
        let url = course_url(course);
        let remote = self
            .client
            .get(&url)
            .map_err(|source| SyncError::RemoteFetch {
                url: url.clone(),
                source,
            })?;
        let pk = require_pk(&remote, &url)?;
        tracing::info!(course = %course.name, semester = %course.semester, year = course.year, pk, "found course");
        Ok(pk)
    }

    fn reconcile_instructor_files(
        &mut self,
        project: &ProjectConfig,
        project_pk: i64,
    ) -> Result<ResourceIndex, SyncError> {
        let url = format!("/api/projects/{project_pk}/instructor_files/");
        let mut index = ResourceIndex::fetch(self.client, &url, "instructor file", "name")?;
        for file in &project.instructor_files {
            let name = file.name();
            let path = file.resolve_path(self.base_dir);
            let contents = std::fs::read(&path).map_err(|e| io_err(&path, e))?;
            let upload = Upload {
                file_name: name.clone(),
                contents,
            };
            self.upsert(
                EntityKind::InstructorFile,
                name.clone(),
                &mut index,
                &name,
                &url,
                |_| Ok(Payload::File(upload)),
            )?;
        }
        Ok(index)
    }

    fn reconcile_student_files(
        &mut self,
        project: &ProjectConfig,
        project_pk: i64,
    ) -> Result<ResourceIndex, SyncError> {
        let url = format!("/api/projects/{project_pk}/expected_student_files/");
        let mut index = ResourceIndex::fetch(self.client, &url, "student file pattern", "pattern")?;
        for pattern in &project.student_files {
            self.upsert(
                EntityKind::StudentFile,
                pattern.pattern.clone(),
                &mut index,
                &pattern.pattern,
                &url,
                |mode| body::student_file_body(pattern, mode).map(Payload::Json),
            )?;
        }
        Ok(index)
    }

    /// Course images take precedence over global ones with the same display name.
    fn fetch_sandbox_images(&self, course_pk: i64) -> Result<ResourceIndex, SyncError> {
        let mut items = Vec::new();
        for url in [
            format!("/api/courses/{course_pk}/sandbox_docker_images/"),
            "/api/sandbox_docker_images/".to_owned(),
        ] {
            let page = self
                .client
                .get_all(&url)
                .map_err(|source| SyncError::RemoteFetch { url, source })?;
            items.extend(page);
        }
        Ok(ResourceIndex::from_items(
            "sandbox image",
            "display_name",
            items,
        ))
    }

    fn reconcile_suites(
        &mut self,
        project: &ProjectConfig,
        project_pk: i64,
        refs: &References<'_>,
    ) -> Result<(), SyncError> {
        let url = format!("/api/projects/{project_pk}/ag_test_suites/");
        let mut suites = ResourceIndex::fetch(self.client, &url, "test suite", "name")?;
        let presets = self.presets;
        for suite in &project.test_suites {
            let result = self.upsert(
                EntityKind::TestSuite,
                suite.name.clone(),
                &mut suites,
                &suite.name,
                &url,
                |mode| body::suite_body(suite, refs, presets, mode).map(Payload::Json),
            );
            let remote_suite = match result {
                Ok(remote) => remote,
                Err(error @ SyncError::UnresolvedReference { .. }) => {
                    self.skip(EntityKind::TestSuite, suite.name.clone(), error);
                    continue;
                }
                Err(error) => return Err(error),
            };
            let suite_pk = require_pk(&remote_suite, &url)?;
            self.reconcile_test_cases(suite, suite_pk, &remote_suite, refs)?;
        }
        Ok(())
    }

    fn reconcile_test_cases(
        &mut self,
        suite: &TestSuite,
        suite_pk: i64,
        remote_suite: &Value,
        refs: &References<'_>,
    ) -> Result<(), SyncError> {
        let cases_url = format!("/api/ag_test_suites/{suite_pk}/ag_test_cases/");
        let mut cases =
            ResourceIndex::from_embedded(remote_suite, "ag_test_cases", "test case", "name");
        let presets = self.presets;

        for case in materialize_suite(suite)? {
            let case_label = format!("{} / {}", suite.name, case.name);
            let remote_case = self.upsert(
                EntityKind::TestCase,
                case_label.clone(),
                &mut cases,
                &case.name,
                &cases_url,
                |_| Ok(Payload::Json(body::test_case_body(&case))),
            )?;
            let case_pk = require_pk(&remote_case, &cases_url)?;
            let commands_url = format!("/api/ag_test_cases/{case_pk}/ag_test_commands/");
            let mut commands =
                ResourceIndex::from_embedded(&remote_case, "ag_test_commands", "command", "name");

            for cmd in &case.commands {
                let label = format!("{case_label} / {}", cmd.name);
                let result = self.upsert(
                    EntityKind::Command,
                    label.clone(),
                    &mut commands,
                    &cmd.name,
                    &commands_url,
                    |mode| body::command_body(cmd, refs, presets, mode, &label).map(Payload::Json),
                );
                match result {
                    Ok(_) => {}
                    Err(error @ SyncError::UnresolvedReference { .. }) => {
                        self.skip(EntityKind::Command, label, error);
                    }
                    Err(error) => return Err(error),
                }
            }
        }
        Ok(())
    }

    /// Update the entry under `key` if `index` has one, otherwise create it at
    /// `create_url`. Returns the indexed object: the fetched one on update,
    /// the server's response on create.
    fn upsert(
        &mut self,
        kind: EntityKind,
        label: String,
        index: &mut ResourceIndex,
        key: &str,
        create_url: &str,
        payload: impl FnOnce(BodyMode) -> Result<Payload, SyncError>,
    ) -> Result<Value, SyncError> {
        if let Some(existing) = index.get(key).cloned() {
            let pk = require_pk(&existing, create_url)?;
            let url = kind.update_url(pk);
            let payload = payload(BodyMode::Update)?;
            self.write(kind.update_method(), &url, &payload)?;
            let action = if self.dry_run { Action::WouldUpdate } else { Action::Updated };
            self.record(kind, label, action, pk);
            return Ok(existing);
        }

        let payload = payload(BodyMode::Create)?;
        let created = self.write(Method::Post, create_url, &payload)?;
        let pk = require_pk(&created, create_url)?;
        index.insert(key, created.clone());
        let action = if self.dry_run { Action::WouldCreate } else { Action::Created };
        self.record(kind, label, action, pk);
        Ok(created)
    }

    fn write(&self, method: Method, url: &str, payload: &Payload) -> Result<Value, SyncError> {
        let result = match payload {
            Payload::Json(body) => self.client.send(method, url, body),
            Payload::File(upload) => self.client.upload(method, url, upload),
        };
        result.map_err(|source| SyncError::RemoteWrite {
            method,
            url: url.to_owned(),
            source,
        })
    }

    fn record(&mut self, kind: EntityKind, name: String, action: Action, pk: i64) {
        match action {
            Action::Created => tracing::info!(%kind, %name, pk, "created"),
            Action::Updated => tracing::info!(%kind, %name, pk, "updated"),
            Action::WouldCreate => tracing::info!(%kind, %name, "[dry-run] would create"),
            Action::WouldUpdate => tracing::info!(%kind, %name, pk, "[dry-run] would update"),
        }
        self.report.outcomes.push(Outcome {
            kind,
            name,
            action,
            pk,
        });
    }

    fn skip(&mut self, kind: EntityKind, name: String, error: SyncError) {
        tracing::warn!(%kind, %name, %error, "skipped");
        self.report.skipped.push(Skipped { kind, name, error });
    }
}

/// `/api/course/{name}/{term}/{year}/` with each segment percent-encoded.
fn course_url(course: &CourseSelection) -> String {
    let segment = |text: &str| utf8_percent_encode(text, NON_ALPHANUMERIC).to_string();
    format!(
        "/api/course/{}/{}/{}/",
        segment(&course.name),
        segment(&course.semester.to_string()),
        course.year
    )
}

fn require_pk(item: &Value, url: &str) -> Result<i64, SyncError> {
    pk_of(item).ok_or_else(|| SyncError::MissingPk {
        url: url.to_owned(),
    })
}
