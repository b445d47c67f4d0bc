//! CLI command implementations

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::fs;
use std::future::Future;
use std::sync::Arc;

use crate::api::models::{
    AttendanceEntry, AttendanceQuery, AttendanceSheet, BatchPayload, DateRange, Id,
    InstitutePayload, NewStudent, OpenRange, StudentStatus, StudentUpdate, SubjectPayload,
};
use crate::api::ApiClient;
use crate::auth::{
    AccessGate, ConsoleNavigator, Credentials, Gate, Identity, PasswordChange, Registration,
    Role, SessionStore, View,
};
use crate::cli::{
    confirm, info, pending, print_identity, print_value, prompt_password, success, warn,
    AttendanceAction, BatchesAction, InstitutesAction, LookupKind, OutputFormat,
    PasswordAction, RegisterAction, StudentsAction, SubjectsAction,
};
use crate::config::{self, Config};

/// Everything a command needs: configuration, the session-aware client and the gate
pub struct Console {
    pub config: Config,
    pub client: ApiClient,
    pub gate: AccessGate,
}

impl Console {
    /// Load configuration and restore the stored session
    pub fn open() -> Result<Self> {
        let config = config::load_config_or_default()?;
        let session = SessionStore::open_file(config.session.resolved_path())?;
        Self::with_session(config, session)
    }

    pub fn with_session(config: Config, session: SessionStore) -> Result<Self> {
        let client = ApiClient::from_config(&config, session.clone(), Arc::new(ConsoleNavigator))?;
        let gate = AccessGate::with_login_route(session, config.console.login_route.clone());
        Ok(Self {
            config,
            client,
            gate,
        })
    }

    /// Run `render` behind the access gate
    pub async fn protected<F, Fut>(&self, view: View, render: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        match self.gate.enter(view, |_| render()) {
            Gate::Render(fut) => fut.await,
            Gate::Redirect(route) => {
                warn(&format!(
                    "{} requires a session, redirecting to {}",
                    view.route(),
                    route
                ));
                Err(crate::Error::NotAuthenticated.into())
            }
        }
    }

    /// Fetch through the client with a spinner and print the payload
    async fn show<Fut>(&self, format: OutputFormat, message: &str, fut: Fut) -> Result<()>
    where
        Fut: Future<Output = crate::Result<Value>>,
    {
        let value = pending(message, fut).await?;
        print_value(&value, format)
    }
}

/// Initialize a new attendify.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = std::path::Path::new(config::loader::CONFIG_FILENAME);

    if config_path.exists() {
        warn("attendify.toml already exists");
        return Ok(());
    }

    fs::write(config_path, config::loader::default_config_content())?;

    success("Created attendify.toml");
    info("Set api.base_url and run 'attendify login --email <email>' to sign in");

    Ok(())
}

/// Sign in and store the session
pub async fn login(email: &str, password: Option<String>, manager: bool) -> Result<()> {
    let console = Console::open()?;
    let password = match password {
        Some(p) => p,
        None => prompt_password("Password")?,
    };
    let role = if manager {
        Role::Manager
    } else {
        Role::InstituteAdmin
    };

    let credentials = Credentials {
        email: email.to_string(),
        password,
    };

    let session = pending("Signing in...", console.client.login(role, &credentials)).await?;
    let role = session.identity.role.unwrap_or(role);
    let name = session
        .identity
        .name
        .clone()
        .unwrap_or_else(|| email.to_string());

    success(&format!("Signed in as {} ({})", name, role));
    info(&format!("Landing on {}", role.landing_route()));
    Ok(())
}

/// Forget the stored session
pub async fn logout() -> Result<()> {
    let console = Console::open()?;
    if !console.client.session().is_present() {
        info("No session stored");
    }
    console.client.logout()?;
    success("Signed out");
    Ok(())
}

/// Show the stored identity
pub async fn whoami() -> Result<()> {
    let console = Console::open()?;
    console
        .protected(View::Settings, || async {
            if let Some(identity) = console.client.session().identity() {
                print_identity(&identity);
            }
            Ok(())
        })
        .await
}

/// Check the stored token against the backend and show the current identity
pub async fn verify(format: OutputFormat) -> Result<()> {
    let console = Console::open()?;
    console
        .protected(View::Settings, || async {
            pending("Verifying session...", console.client.accounts().verify()).await?;
            success("Session is valid");
            console
                .show(format, "Loading profile...", console.client.accounts().me())
                .await
        })
        .await
}

/// Counts of students and batches plus today's attendance statistics
pub async fn dashboard(format: OutputFormat) -> Result<()> {
    let console = Console::open()?;
    console
        .protected(View::Dashboard, || async {
            let today = chrono::Local::now().date_naive();
            let summary =
                pending("Loading dashboard...", dashboard_summary(&console.client, today)).await?;
            print_value(&summary, format)
        })
        .await
}

/// Fetch the dashboard figures concurrently; the first failure wins
pub async fn dashboard_summary(client: &ApiClient, today: NaiveDate) -> crate::Result<Value> {
    let (students, inactive, batches, stats) = tokio::try_join!(
        client.students().list(),
        client.students().inactive(),
        client.batches().list(),
        client.attendance().stats_by_date(today),
    )?;

    Ok(json!({
        "date": today.to_string(),
        "students": count(&students),
        "inactive_students": count(&inactive),
        "batches": count(&batches),
        "attendance": stats,
    }))
}

fn count(value: &Value) -> usize {
    value.as_array().map(Vec::len).unwrap_or(0)
}

/// Institute and manager registration
pub async fn register(action: RegisterAction, format: OutputFormat) -> Result<()> {
    let console = Console::open()?;

    match action {
        RegisterAction::Institute {
            name,
            email,
            mobile,
        } => {
            let registration = Registration {
                name,
                email,
                password: prompt_password("Password")?,
                mobile,
                institute_id: None,
            };
            console
                .show(
                    format,
                    "Registering institute...",
                    console.client.accounts().register_institute(&registration),
                )
                .await?;
            success("Institute registered");
            Ok(())
        }
        RegisterAction::Manager {
            name,
            email,
            mobile,
            institute,
        } => {
            console
                .protected(View::Settings, || async {
                    let identity = console.client.session().identity();
                    let institute_id = manager_institute(identity.as_ref(), institute)?;
                    let registration = Registration {
                        name,
                        email,
                        password: prompt_password("Manager password")?,
                        mobile,
                        institute_id,
                    };
                    console
                        .show(
                            format,
                            "Registering manager...",
                            console.client.accounts().register_manager(&registration),
                        )
                        .await?;
                    success("Manager registered");
                    Ok(())
                })
                .await
        }
    }
}

/// Institute a new manager is registered under.
///
/// Only institute sessions may register managers; the institute defaults to
/// the signed-in one.
fn manager_institute(identity: Option<&Identity>, explicit: Option<String>) -> Result<Option<Id>> {
    let Some(identity) = identity else {
        return Err(crate::Error::NotAuthenticated.into());
    };
    if !identity.is_admin() {
        bail!("Only institute accounts can register managers");
    }
    Ok(explicit
        .map(Id::from)
        .or_else(|| identity.institute_id.clone()))
}

/// Password rotation and recovery
pub async fn password(action: PasswordAction) -> Result<()> {
    let console = Console::open()?;

    match action {
        PasswordAction::Change { institute } => {
            console
                .protected(View::Settings, || async {
                    let change = PasswordChange {
                        current_password: prompt_password("Current password")?,
                        new_password: prompt_password("New password")?,
                    };
                    let accounts = console.client.accounts();
                    let institutes = console.client.institutes();
                    if institute {
                        pending("Updating password...", institutes.change_password(&change))
                            .await?;
                    } else {
                        pending("Updating password...", accounts.change_password(&change)).await?;
                    }
                    success("Password changed");
                    Ok(())
                })
                .await
        }
        PasswordAction::Forgot { email } => {
            pending(
                "Requesting reset...",
                console.client.accounts().forgot_password(&email),
            )
            .await?;
            success(&format!("Reset instructions sent to {}", email));
            Ok(())
        }
        PasswordAction::Reset { token } => {
            let new_password = prompt_password("New password")?;
            pending(
                "Resetting password...",
                console.client.accounts().reset_password(&token, &new_password),
            )
            .await?;
            success("Password reset, sign in with the new password");
            Ok(())
        }
    }
}

/// Student management
pub async fn students(action: StudentsAction, format: OutputFormat) -> Result<()> {
    let console = Console::open()?;
    let students = console.client.students();

    match action {
        StudentsAction::List {
            inactive,
            stream,
            batch,
        } => {
            let view = if inactive {
                View::InactiveStudents
            } else {
                View::Students
            };
            console
                .protected(view, || async {
                    let fut = async {
                        match (inactive, stream, batch) {
                            (true, _, _) => students.inactive().await,
                            (_, Some(stream), _) => students.by_stream(&stream).await,
                            (_, _, Some(batch)) => students.by_batch(&Id::from(batch)).await,
                            _ => students.list().await,
                        }
                    };
                    console.show(format, "Loading students...", fut).await
                })
                .await
        }
        StudentsAction::Get { id } => {
            console
                .protected(View::ViewStudent, || async {
                    console
                        .show(format, "Loading student...", students.get(&Id::from(id)))
                        .await
                })
                .await
        }
        StudentsAction::Roll { roll_no } => {
            console
                .protected(View::SearchStudent, || async {
                    console
                        .show(format, "Loading student...", students.by_roll_no(&roll_no))
                        .await
                })
                .await
        }
        StudentsAction::Search { query } => {
            console
                .protected(View::SearchStudent, || async {
                    console
                        .show(format, "Searching...", students.search(&query))
                        .await
                })
                .await
        }
        StudentsAction::Add {
            name,
            roll_no,
            mobile,
            alt_mobile,
            email,
            dob,
            batch,
            class_level,
            board,
            stream,
            inactive,
        } => {
            console
                .protected(View::AddStudent, || async {
                    let student = NewStudent {
                        mobile,
                        alt_mobile,
                        email,
                        dob,
                        password: None,
                        batch_id: batch.map(Id::from),
                        class_level_id: class_level.map(Id::from),
                        board_id: board.map(Id::from),
                        stream_id: stream.map(Id::from),
                        status: if inactive {
                            StudentStatus::Inactive
                        } else {
                            StudentStatus::Active
                        },
                        ..NewStudent::new(name, roll_no)
                    };
                    console
                        .show(format, "Adding student...", students.create(&student))
                        .await?;
                    success("Student added");
                    Ok(())
                })
                .await
        }
        StudentsAction::Update {
            id,
            name,
            mobile,
            email,
            address,
            class_level,
            stream,
            batch,
        } => {
            console
                .protected(View::UpdateStudent, || async {
                    let mut update = StudentUpdate {
                        name,
                        mobile,
                        email,
                        address,
                        batch_id: batch.map(Id::from),
                        ..Default::default()
                    };
                    if let Some(level) = class_level {
                        update = update.with_class_level(level);
                    }
                    if let Some(stream) = stream {
                        update = update.with_stream(stream);
                    }
                    if update.is_empty() {
                        bail!("Nothing to update");
                    }
                    console
                        .show(
                            format,
                            "Updating student...",
                            students.update(&Id::from(id), &update),
                        )
                        .await?;
                    success("Student updated");
                    Ok(())
                })
                .await
        }
        StudentsAction::Delete { id, force } => {
            console
                .protected(View::DeleteStudent, || async {
                    if !force
                        && !confirm(&format!(
                            "Delete student '{}'? Their attendance history goes with them.",
                            id
                        ))
                    {
                        info("Cancelled");
                        return Ok(());
                    }
                    pending("Deleting student...", students.delete(&Id::from(id.as_str())))
                        .await?;
                    success(&format!("Deleted student {}", id));
                    Ok(())
                })
                .await
        }
        StudentsAction::Activate { id } => {
            console
                .protected(View::InactiveStudents, || async {
                    console
                        .show(
                            format,
                            "Activating student...",
                            students.activate(&Id::from(id)),
                        )
                        .await?;
                    success("Student is active");
                    Ok(())
                })
                .await
        }
        StudentsAction::Deactivate { id } => {
            console
                .protected(View::StudentProfile, || async {
                    console
                        .show(
                            format,
                            "Deactivating student...",
                            students.deactivate(&Id::from(id)),
                        )
                        .await?;
                    success("Student is inactive");
                    Ok(())
                })
                .await
        }
    }
}

/// Batch management
pub async fn batches(action: BatchesAction, format: OutputFormat) -> Result<()> {
    let console = Console::open()?;
    let batches = console.client.batches();

    console
        .protected(View::BatchManagement, || async {
            match action {
                BatchesAction::List { institute, manager } => {
                    let fut = async {
                        match (institute, manager) {
                            (Some(id), _) => batches.by_institute(&Id::from(id)).await,
                            (_, Some(id)) => batches.by_manager(&Id::from(id)).await,
                            _ => batches.list().await,
                        }
                    };
                    console.show(format, "Loading batches...", fut).await
                }
                BatchesAction::Get { id } => {
                    console
                        .show(format, "Loading batch...", batches.get(&Id::from(id)))
                        .await
                }
                BatchesAction::Create {
                    name,
                    description,
                    manager,
                } => {
                    let payload = BatchPayload {
                        name,
                        description,
                        manager_id: manager.map(Id::from),
                    };
                    console
                        .show(format, "Creating batch...", batches.create(&payload))
                        .await?;
                    success("Batch created");
                    Ok(())
                }
                BatchesAction::Update {
                    id,
                    name,
                    description,
                    manager,
                } => {
                    let payload = BatchPayload {
                        name,
                        description,
                        manager_id: manager.map(Id::from),
                    };
                    console
                        .show(
                            format,
                            "Updating batch...",
                            batches.update(&Id::from(id), &payload),
                        )
                        .await?;
                    success("Batch updated");
                    Ok(())
                }
                BatchesAction::Delete { id, force } => {
                    if !force && !confirm(&format!("Delete batch '{}'?", id)) {
                        info("Cancelled");
                        return Ok(());
                    }
                    pending("Deleting batch...", batches.delete(&Id::from(id.as_str()))).await?;
                    success(&format!("Deleted batch {}", id));
                    Ok(())
                }
                BatchesAction::Students { id } => {
                    console
                        .show(
                            format,
                            "Loading students...",
                            console.client.students().by_batch(&Id::from(id)),
                        )
                        .await
                }
            }
        })
        .await
}

/// Subject management
pub async fn subjects(action: SubjectsAction, format: OutputFormat) -> Result<()> {
    let console = Console::open()?;
    let subjects = console.client.subjects();

    console
        .protected(View::Subjects, || async {
            match action {
                SubjectsAction::List { batch } => {
                    let fut = async {
                        match batch {
                            Some(id) => subjects.by_batch(&Id::from(id)).await,
                            None => subjects.list().await,
                        }
                    };
                    console.show(format, "Loading subjects...", fut).await
                }
                SubjectsAction::Get { id } => {
                    console
                        .show(format, "Loading subject...", subjects.get(&Id::from(id)))
                        .await
                }
                SubjectsAction::Create {
                    name,
                    code,
                    description,
                } => {
                    let payload = SubjectPayload {
                        name,
                        code,
                        description,
                    };
                    console
                        .show(format, "Creating subject...", subjects.create(&payload))
                        .await?;
                    success("Subject created");
                    Ok(())
                }
                SubjectsAction::Update {
                    id,
                    name,
                    code,
                    description,
                } => {
                    let payload = SubjectPayload {
                        name,
                        code,
                        description,
                    };
                    console
                        .show(
                            format,
                            "Updating subject...",
                            subjects.update(&Id::from(id), &payload),
                        )
                        .await?;
                    success("Subject updated");
                    Ok(())
                }
                SubjectsAction::Delete { id, force } => {
                    if !force && !confirm(&format!("Delete subject '{}'?", id)) {
                        info("Cancelled");
                        return Ok(());
                    }
                    pending("Deleting subject...", subjects.delete(&Id::from(id.as_str())))
                        .await?;
                    success(&format!("Deleted subject {}", id));
                    Ok(())
                }
                SubjectsAction::Attach { batch, subject } => {
                    pending(
                        "Attaching subject...",
                        subjects.add_to_batch(&Id::from(batch.as_str()), &Id::from(subject.as_str())),
                    )
                    .await?;
                    success(&format!("Subject {} is taught in batch {}", subject, batch));
                    Ok(())
                }
                SubjectsAction::Detach { batch, subject } => {
                    pending(
                        "Detaching subject...",
                        subjects.remove_from_batch(
                            &Id::from(batch.as_str()),
                            &Id::from(subject.as_str()),
                        ),
                    )
                    .await?;
                    success(&format!("Subject {} removed from batch {}", subject, batch));
                    Ok(())
                }
            }
        })
        .await
}

/// Parse `STUDENT_ID=present|absent|late` marks
pub fn parse_marks(marks: &[String]) -> Result<Vec<AttendanceEntry>> {
    marks
        .iter()
        .map(|mark| {
            let (student, status) = mark
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("Expected STUDENT_ID=STATUS, got '{}'", mark))?;
            Ok(AttendanceEntry {
                student_id: Id::from(student.trim()),
                status: status.parse()?,
            })
        })
        .collect()
}

/// Attendance recording and reports
pub async fn attendance(action: AttendanceAction, format: OutputFormat) -> Result<()> {
    let console = Console::open()?;
    let attendance = console.client.attendance();
    let today = chrono::Local::now().date_naive();

    console
        .protected(View::Attendance, || async {
            match action {
                AttendanceAction::Mark {
                    batch,
                    subject,
                    date,
                    marks,
                } => {
                    let sheet = AttendanceSheet {
                        batch_id: Id::from(batch),
                        subject_id: Id::from(subject),
                        attendance_date: date.unwrap_or(today),
                        attendance_details: parse_marks(&marks)?,
                    };
                    console
                        .show(format, "Recording attendance...", attendance.mark(&sheet))
                        .await?;
                    success(&format!(
                        "Recorded {} marks for {}",
                        sheet.attendance_details.len(),
                        sheet.attendance_date
                    ));
                    Ok(())
                }
                AttendanceAction::Update {
                    id,
                    batch,
                    subject,
                    date,
                    marks,
                } => {
                    let sheet = AttendanceSheet {
                        batch_id: Id::from(batch),
                        subject_id: Id::from(subject),
                        attendance_date: date,
                        attendance_details: parse_marks(&marks)?,
                    };
                    console
                        .show(
                            format,
                            "Updating attendance...",
                            attendance.update(&Id::from(id), &sheet),
                        )
                        .await?;
                    success("Attendance updated");
                    Ok(())
                }
                AttendanceAction::Show {
                    date,
                    batch,
                    subject,
                } => {
                    let fut = async {
                        match (date, &batch, &subject) {
                            (None, None, None) => attendance.today().await,
                            _ => {
                                let query = AttendanceQuery {
                                    date: date.unwrap_or(today),
                                    batch_id: batch.clone().map(Id::from),
                                    subject_id: subject.clone().map(Id::from),
                                };
                                attendance.by_date(&query).await
                            }
                        }
                    };
                    console.show(format, "Loading attendance...", fut).await
                }
                AttendanceAction::Range { from, to } => {
                    let range = date_range(from, to)?;
                    console
                        .show(format, "Loading attendance...", attendance.by_range(&range))
                        .await
                }
                AttendanceAction::Student { id } => {
                    console
                        .show(
                            format,
                            "Loading attendance...",
                            attendance.for_student(&Id::from(id)),
                        )
                        .await
                }
                AttendanceAction::Stream { stream, date } => {
                    console
                        .show(
                            format,
                            "Loading attendance...",
                            attendance.by_stream(&stream, date.unwrap_or(today)),
                        )
                        .await
                }
                AttendanceAction::Stats {
                    date,
                    from,
                    to,
                    overall,
                } => {
                    let fut = async {
                        match stats_scope(date, from, to, overall, today)? {
                            StatsScope::Day(day) => attendance.stats_by_date(day).await,
                            StatsScope::Range(range) => attendance.stats_by_range(&range).await,
                            StatsScope::Overall(range) => attendance.overall_stats(&range).await,
                        }
                    };
                    console.show(format, "Loading statistics...", fut).await
                }
                AttendanceAction::Delete { id, force } => {
                    if !force && !confirm(&format!("Delete attendance sheet '{}'?", id)) {
                        info("Cancelled");
                        return Ok(());
                    }
                    pending(
                        "Deleting attendance...",
                        attendance.delete(&Id::from(id.as_str())),
                    )
                    .await?;
                    success(&format!("Deleted attendance sheet {}", id));
                    Ok(())
                }
            }
        })
        .await
}

/// Which statistics endpoint an `attendance stats` invocation targets
#[derive(Debug, PartialEq, Eq)]
enum StatsScope {
    Day(NaiveDate),
    Range(DateRange),
    Overall(OpenRange),
}

fn stats_scope(
    date: Option<NaiveDate>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    overall: bool,
    today: NaiveDate,
) -> crate::Result<StatsScope> {
    if let Some(day) = date {
        return Ok(StatsScope::Day(day));
    }
    if overall {
        return Ok(StatsScope::Overall(OpenRange {
            start_date: from,
            end_date: to,
        }));
    }
    match (from, to) {
        (None, None) => Ok(StatsScope::Day(today)),
        (Some(from), Some(to)) => date_range(from, to)
            .map(StatsScope::Range)
            .map_err(|e| crate::Error::Other(e.to_string())),
        _ => Err(crate::Error::Other(
            "--from and --to must be given together; add --overall for an open-ended range"
                .to_string(),
        )),
    }
}

fn date_range(from: NaiveDate, to: NaiveDate) -> Result<DateRange> {
    if to < from {
        bail!("--to ({}) is before --from ({})", to, from);
    }
    Ok(DateRange {
        start_date: from,
        end_date: to,
    })
}

/// Institute administration
pub async fn institutes(action: InstitutesAction, format: OutputFormat) -> Result<()> {
    let console = Console::open()?;
    let institutes = console.client.institutes();

    console
        .protected(View::Institutes, || async {
            match action {
                InstitutesAction::List => {
                    console
                        .show(format, "Loading institutes...", institutes.list())
                        .await
                }
                InstitutesAction::Get { id } => {
                    console
                        .show(format, "Loading institute...", institutes.get(&Id::from(id)))
                        .await
                }
                InstitutesAction::Profile => {
                    console
                        .show(format, "Loading profile...", institutes.profile())
                        .await
                }
                InstitutesAction::Update {
                    id,
                    name,
                    email,
                    mobile,
                    address,
                } => {
                    let payload = InstitutePayload {
                        name,
                        email,
                        mobile,
                        address,
                    };
                    console
                        .show(
                            format,
                            "Updating institute...",
                            institutes.update(&Id::from(id), &payload),
                        )
                        .await?;
                    success("Institute updated");
                    Ok(())
                }
                InstitutesAction::Delete { id, force } => {
                    if !force
                        && !confirm(&format!(
                            "Delete institute '{}'? Its batches and students go with it.",
                            id
                        ))
                    {
                        info("Cancelled");
                        return Ok(());
                    }
                    pending(
                        "Deleting institute...",
                        institutes.delete(&Id::from(id.as_str())),
                    )
                    .await?;
                    success(&format!("Deleted institute {}", id));
                    Ok(())
                }
            }
        })
        .await
}

/// Reference data
pub async fn lookups(kind: LookupKind, format: OutputFormat) -> Result<()> {
    let console = Console::open()?;
    let master = console.client.master_data();

    console
        .protected(View::AddStudent, || async {
            let fut = async {
                match kind {
                    LookupKind::ClassLevels => master.class_levels().await,
                    LookupKind::Boards => master.boards().await,
                    LookupKind::Streams => master.streams().await,
                }
            };
            console.show(format, "Loading...", fut).await
        })
        .await
}
