//! CLI interface for Attendify

pub mod commands;
mod output;
pub mod setup;

pub use output::*;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "attendify")]
#[command(author = "Attendify")]
#[command(version)]
#[command(about = "Attendance and student management console", long_about = None)]
pub struct Cli {
    /// Output format for backend data
    #[arg(short, long, global = true, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive setup wizard
    Setup,

    /// Write a default attendify.toml in the current directory
    Init,

    /// Sign in and store the session
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (prompted when omitted)
        #[arg(short, long, env = "ATTENDIFY_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Sign in as a manager instead of an institute
        #[arg(short, long)]
        manager: bool,
    },

    /// Forget the stored session
    Logout,

    /// Show the identity of the stored session
    Whoami,

    /// Ask the backend whether the stored session is still valid
    Verify,

    /// Summary of students, batches and today's attendance
    Dashboard,

    /// Register an institute, or a manager for the signed-in institute
    Register {
        #[command(subcommand)]
        action: RegisterAction,
    },

    /// Change, forget or reset a password
    Password {
        #[command(subcommand)]
        action: PasswordAction,
    },

    /// Manage students
    Students {
        #[command(subcommand)]
        action: StudentsAction,
    },

    /// Manage batches
    Batches {
        #[command(subcommand)]
        action: BatchesAction,
    },

    /// Manage subjects and their batch assignments
    Subjects {
        #[command(subcommand)]
        action: SubjectsAction,
    },

    /// Record and review attendance
    Attendance {
        #[command(subcommand)]
        action: AttendanceAction,
    },

    /// Institute administration
    Institutes {
        #[command(subcommand)]
        action: InstitutesAction,
    },

    /// Reference data
    Lookups {
        /// Which list to show
        kind: LookupKind,
    },
}

#[derive(Subcommand)]
pub enum RegisterAction {
    /// Create a new institute account
    Institute {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(long)]
        mobile: Option<String>,
    },

    /// Create a manager account
    Manager {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(long)]
        mobile: Option<String>,
        /// Institute the manager belongs to (defaults to the signed-in institute)
        #[arg(long)]
        institute: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PasswordAction {
    /// Rotate the signed-in account's password
    Change {
        /// Use the institute endpoint rather than the generic auth endpoint
        #[arg(long)]
        institute: bool,
    },

    /// Request a reset email
    Forgot {
        email: String,
    },

    /// Complete a reset with the emailed token
    Reset {
        token: String,
    },
}

#[derive(Subcommand)]
pub enum StudentsAction {
    /// List students
    List {
        /// Only inactive students
        #[arg(long, conflicts_with_all = ["stream", "batch"])]
        inactive: bool,

        /// Only students in this stream
        #[arg(long, conflicts_with = "batch")]
        stream: Option<String>,

        /// Only students in this batch
        #[arg(long)]
        batch: Option<String>,
    },

    /// Show one student
    Get {
        id: String,
    },

    /// Look a student up by roll number
    Roll {
        roll_no: String,
    },

    /// Search students
    Search {
        query: String,
    },

    /// Add a student
    Add {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        roll_no: String,
        #[arg(short, long)]
        mobile: Option<String>,
        #[arg(long)]
        alt_mobile: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: Option<NaiveDate>,
        #[arg(short, long)]
        batch: Option<String>,
        #[arg(long)]
        class_level: Option<String>,
        #[arg(long)]
        board: Option<String>,
        #[arg(long)]
        stream: Option<String>,
        /// Create the student as inactive
        #[arg(long)]
        inactive: bool,
    },

    /// Update a student
    Update {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        mobile: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
        /// Class level; stream and board are derived from it
        #[arg(long)]
        class_level: Option<String>,
        /// Stream, for classes that choose one
        #[arg(long)]
        stream: Option<String>,
        #[arg(short, long)]
        batch: Option<String>,
    },

    /// Delete a student
    Delete {
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Mark a student active
    Activate {
        id: String,
    },

    /// Mark a student inactive
    Deactivate {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum BatchesAction {
    /// List batches
    List {
        /// Only batches of this institute
        #[arg(long, conflicts_with = "manager")]
        institute: Option<String>,

        /// Only batches assigned to this manager
        #[arg(long)]
        manager: Option<String>,
    },

    /// Show one batch
    Get {
        id: String,
    },

    /// Create a batch
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        manager: Option<String>,
    },

    /// Update a batch
    Update {
        id: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        manager: Option<String>,
    },

    /// Delete a batch
    Delete {
        id: String,
        #[arg(short, long)]
        force: bool,
    },

    /// Students enrolled in a batch
    Students {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum SubjectsAction {
    /// List subjects
    List {
        /// Only subjects taught in this batch
        #[arg(long)]
        batch: Option<String>,
    },

    /// Show one subject
    Get {
        id: String,
    },

    /// Create a subject
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        code: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Update a subject
    Update {
        id: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        code: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a subject
    Delete {
        id: String,
        #[arg(short, long)]
        force: bool,
    },

    /// Teach a subject in a batch
    Attach {
        #[arg(short, long)]
        batch: String,
        #[arg(short, long)]
        subject: String,
    },

    /// Stop teaching a subject in a batch
    Detach {
        #[arg(short, long)]
        batch: String,
        #[arg(short, long)]
        subject: String,
    },
}

#[derive(Subcommand)]
pub enum AttendanceAction {
    /// Record attendance for a batch and subject
    Mark {
        #[arg(short, long)]
        batch: String,
        #[arg(short, long)]
        subject: String,
        /// Day of the sheet (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Marks as STUDENT_ID=present|absent|late
        #[arg(required = true)]
        marks: Vec<String>,
    },

    /// Replace a recorded sheet
    Update {
        id: String,
        #[arg(short, long)]
        batch: String,
        #[arg(short, long)]
        subject: String,
        #[arg(short, long)]
        date: NaiveDate,
        #[arg(required = true)]
        marks: Vec<String>,
    },

    /// Attendance for one day (defaults to today)
    Show {
        #[arg(short, long)]
        date: Option<NaiveDate>,
        #[arg(short, long)]
        batch: Option<String>,
        #[arg(short, long)]
        subject: Option<String>,
    },

    /// Attendance between two dates
    Range {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },

    /// Attendance history of a student
    Student {
        id: String,
    },

    /// Attendance of a stream on a day
    Stream {
        stream: String,
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Aggregate statistics
    Stats {
        /// Statistics for a single day
        #[arg(short, long, conflicts_with_all = ["from", "to", "overall"])]
        date: Option<NaiveDate>,
        /// Start of the range; needs --to unless --overall is set
        #[arg(long)]
        from: Option<NaiveDate>,
        /// End of the range; needs --from unless --overall is set
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Overall statistics, optionally bounded by --from/--to
        #[arg(long)]
        overall: bool,
    },

    /// Delete a recorded sheet
    Delete {
        id: String,
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum InstitutesAction {
    /// List institutes
    List,

    /// Show one institute
    Get {
        id: String,
    },

    /// The signed-in institute
    Profile,

    /// Update an institute
    Update {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        mobile: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Delete an institute
    Delete {
        id: String,
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LookupKind {
    ClassLevels,
    Boards,
    Streams,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}
