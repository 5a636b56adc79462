// ── Enumeration lookup ──
//
// Numeric codes in daemon replies mapped to their symbolic names. Pure
// and stateless; unknown codes map to a fixed fallback label.

use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::CoreError;

/// Daemon error number for "operation still running".
pub const ERR_IN_PROGRESS: i32 = -204;

/// Fallback label for codes missing from a table.
pub const UNKNOWN: &str = "UNKNOWN";

/// Fallback label for unknown daemon error numbers.
pub const UNKNOWN_ERROR_CODE: &str = "Unknown Error Code";

/// A family of numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    /// `active_task.scheduler_state`
    SchedulerState,
    /// `result.state`
    State,
    /// `active_task.active_task_state`
    TaskState,
    /// Task, network and GPU suspend reasons in `cc_status`
    SuspendReason,
    /// Task, GPU and network run modes in `cc_status`
    RunMode,
    /// `cc_status.network_status`
    NetworkStatus,
    /// Daemon error numbers (`error_num`, exit codes)
    Freturn,
}

const SCHEDULER_STATE: &[(i32, &str)] = &[(0, "UNINITIALIZED"), (1, "PREEMPTED"), (2, "SCHEDULED")];

const STATE: &[(i32, &str)] = &[
    (0, "NEW"),
    (1, "FILES_DOWNLOADING"),
    (2, "FILES_DOWNLOADED"),
    (3, "COMPUTE_ERROR"),
    (4, "FILES_UPLOADING"),
    (5, "FILES_UPLOADED"),
    (6, "ABORTED"),
    (7, "UPLOAD_FAILED"),
];

const TASK_STATE: &[(i32, &str)] = &[
    (0, "UNINITIALIZED"),
    (1, "EXECUTING"),
    (5, "ABORT_PENDING"),
    (8, "QUIT_PENDING"),
    (9, "SUSPENDED"),
    (10, "COPY_PENDING"),
];

const SUSPEND_REASON: &[(i32, &str)] = &[
    (0, "NOT_SUSPENDED"),
    (1, "BATTERIES"),
    (2, "USER_ACTIVE"),
    (4, "USER_REQ"),
    (8, "TIME_OF_DAY"),
    (16, "BENCHMARKS"),
    (32, "DISK_SIZE"),
    (64, "CPU_THROTTLE"),
    (128, "NO_RECENT_INPUT"),
    (256, "INITIAL_DELAY"),
    (512, "EXCLUSIVE_APP_RUNNING"),
    (1024, "CPU_USAGE"),
    (2048, "NETWORK_QUOTA_EXCEEDED"),
    (4096, "OS"),
    (4097, "WIFI_STATE"),
    (4098, "BATTERY_CHARGING"),
    (4099, "BATTERY_OVERHEATED"),
];

const RUN_MODE: &[(i32, &str)] = &[(1, "ALWAYS"), (2, "AUTO"), (3, "NEVER"), (4, "RESTORE")];

const NETWORK_STATUS: &[(i32, &str)] = &[
    (0, "ONLINE"),
    (1, "WANT_CONNECTION"),
    (2, "WANT_DISCONNECT"),
    (3, "LOOKUP_PENDING"),
];

const FRETURN: &[(i32, &str)] = &[
    (0, "SUCCESS"),
    (-100, "ERR_SELECT"),
    (-101, "ERR_MALLOC"),
    (-102, "ERR_READ"),
    (-103, "ERR_WRITE"),
    (-104, "ERR_FREAD"),
    (-105, "ERR_FWRITE"),
    (-106, "ERR_IO"),
    (-107, "ERR_CONNECT"),
    (-108, "ERR_FOPEN"),
    (-109, "ERR_RENAME"),
    (-110, "ERR_UNLINK"),
    (-111, "ERR_OPENDIR"),
    (-112, "ERR_XML_PARSE"),
    (-113, "ERR_GETHOSTBYNAME"),
    (-114, "ERR_GIVEUP_DOWNLOAD"),
    (-115, "ERR_GIVEUP_UPLOAD"),
    (-116, "ERR_NULL"),
    (-117, "ERR_NEG"),
    (-118, "ERR_BUFFER_OVERFLOW"),
    (-120, "ERR_RSA_FAILED"),
    (-121, "ERR_OPEN"),
    (-123, "ERR_NO_SIGNATURE"),
    (-124, "ERR_THREAD"),
    (-125, "ERR_SIGNAL_CATCH"),
    (-126, "ERR_BAD_FORMAT"),
    (-127, "ERR_UPLOAD_TRANSIENT"),
    (-128, "ERR_UPLOAD_PERMANENT"),
    (-129, "ERR_IDLE_PERIOD"),
    (-130, "ERR_ALREADY_ATTACHED"),
    (-131, "ERR_FILE_TOO_BIG"),
    (-132, "ERR_GETRUSAGE"),
    (-133, "ERR_BENCHMARK_FAILED"),
    (-134, "ERR_BAD_HEX_FORMAT"),
    (-135, "ERR_GETADDRINFO"),
    (-136, "ERR_DB_NOT_FOUND"),
    (-137, "ERR_DB_NOT_UNIQUE"),
    (-138, "ERR_DB_CANT_CONNECT"),
    (-139, "ERR_GETS"),
    (-140, "ERR_SCANF"),
    (-143, "ERR_READDIR"),
    (-144, "ERR_SHMGET"),
    (-145, "ERR_SHMCTL"),
    (-146, "ERR_SHMAT"),
    (-147, "ERR_FORK"),
    (-148, "ERR_EXEC"),
    (-149, "ERR_NOT_EXITED"),
    (-150, "ERR_NOT_IMPLEMENTED"),
    (-151, "ERR_GETHOSTNAME"),
    (-152, "ERR_NETOPEN"),
    (-153, "ERR_SOCKET"),
    (-154, "ERR_FCNTL"),
    (-155, "ERR_AUTHENTICATOR"),
    (-156, "ERR_SCHED_SHMEM"),
    (-157, "ERR_ASYNCSELECT"),
    (-158, "ERR_BAD_RESULT_STATE"),
    (-159, "ERR_DB_CANT_INIT"),
    (-160, "ERR_NOT_UNIQUE"),
    (-161, "ERR_NOT_FOUND"),
    (-162, "ERR_NO_EXIT_STATUS"),
    (-163, "ERR_FILE_MISSING"),
    (-164, "ERR_KILL"),
    (-165, "ERR_SEMGET"),
    (-166, "ERR_SEMCTL"),
    (-167, "ERR_SEMOP"),
    (-168, "ERR_FTOK"),
    (-169, "ERR_SOCKS_UNKNOWN_FAILURE"),
    (-170, "ERR_SOCKS_REQUEST_FAILED"),
    (-171, "ERR_SOCKS_BAD_USER_PASS"),
    (-172, "ERR_SOCKS_UNKNOWN_SERVER_VERSION"),
    (-173, "ERR_SOCKS_UNSUPPORTED"),
    (-174, "ERR_SOCKS_CANT_REACH_HOST"),
    (-175, "ERR_SOCKS_CONN_REFUSED"),
    (-176, "ERR_TIMER_INIT"),
    (-178, "ERR_INVALID_PARAM"),
    (-179, "ERR_SIGNAL_OP"),
    (-180, "ERR_BIND"),
    (-181, "ERR_LISTEN"),
    (-182, "ERR_TIMEOUT"),
    (-183, "ERR_PROJECT_DOWN"),
    (-184, "ERR_HTTP_TRANSIENT"),
    (-185, "ERR_RESULT_START"),
    (-186, "ERR_RESULT_DOWNLOAD"),
    (-187, "ERR_RESULT_UPLOAD"),
    (-188, "ERR_BAD_USER_NAME"),
    (-189, "ERR_INVALID_URL"),
    (-190, "ERR_MAJOR_VERSION"),
    (-191, "ERR_NO_OPTION"),
    (-192, "ERR_MKDIR"),
    (-193, "ERR_INVALID_EVENT"),
    (-194, "ERR_ALREADY_RUNNING"),
    (-195, "ERR_NO_APP_VERSION"),
    (-196, "ERR_WU_USER_RULE"),
    (-197, "ERR_ABORTED_VIA_GUI"),
    (-198, "ERR_INSUFFICIENT_RESOURCE"),
    (-199, "ERR_RETRY"),
    (-200, "ERR_WRONG_SIZE"),
    (-201, "ERR_USER_PERMISSION"),
    (-202, "ERR_SHMEM_NAME"),
    (-203, "ERR_NO_NETWORK_CONNECTION"),
    (-204, "ERR_IN_PROGRESS"),
    (-205, "ERR_BAD_EMAIL_ADDR"),
    (-206, "ERR_BAD_PASSWD"),
    (-207, "ERR_NONUNIQUE_EMAIL"),
    (-208, "ERR_ACCT_CREATION_DISABLED"),
    (-209, "ERR_ATTACH_FAIL_INIT"),
    (-210, "ERR_ATTACH_FAIL_DOWNLOAD"),
    (-211, "ERR_ATTACH_FAIL_PARSE"),
    (-212, "ERR_ATTACH_FAIL_BAD_KEY"),
    (-213, "ERR_ATTACH_FAIL_FILE_WRITE"),
    (-214, "ERR_ATTACH_FAIL_SERVER_ERROR"),
    (-215, "ERR_SIGNING_KEY"),
    (-216, "ERR_FFLUSH"),
    (-217, "ERR_FSYNC"),
    (-218, "ERR_TRUNCATE"),
    (-219, "ERR_WRONG_URL"),
    (-220, "ERR_DUP_NAME"),
    (-221, "ERR_FILE_WRONG_SIZE"),
    (-222, "ERR_GETGRNAM"),
    (-223, "ERR_CHOWN"),
    (-224, "ERR_HTTP_PERMANENT"),
    (-225, "ERR_BAD_FILENAME"),
    (-226, "ERR_TOO_MANY_EXITS"),
    (-227, "ERR_RMDIR"),
    (-229, "ERR_SYMLINK"),
    (-230, "ERR_DB_CONN_LOST"),
    (-231, "ERR_CRYPTO"),
    (-232, "ERR_ABORTED_ON_EXIT"),
    (-235, "ERR_PROC_PARSE"),
    (-236, "ERR_STATFS"),
    (-237, "ERR_PIPE"),
    (-238, "ERR_NEED_HTTPS"),
    (-239, "ERR_CHMOD"),
    (-240, "ERR_STAT"),
    (-241, "ERR_FCLOSE"),
    (-242, "ERR_ACCT_REQUIRE_CONSENT"),
    (-243, "ERR_INVALID_STATE"),
];

impl Category {
    fn table(self) -> &'static [(i32, &'static str)] {
        match self {
            Self::SchedulerState => SCHEDULER_STATE,
            Self::State => STATE,
            Self::TaskState => TASK_STATE,
            Self::SuspendReason => SUSPEND_REASON,
            Self::RunMode => RUN_MODE,
            Self::NetworkStatus => NETWORK_STATUS,
            Self::Freturn => FRETURN,
        }
    }

    fn fallback(self) -> &'static str {
        match self {
            Self::Freturn => UNKNOWN_ERROR_CODE,
            _ => UNKNOWN,
        }
    }

    /// Symbolic name for `code`, or the category's fallback label.
    pub fn label(self, code: i32) -> &'static str {
        self.table()
            .iter()
            .find(|(c, _)| *c == code)
            .map_or_else(|| self.fallback(), |(_, name)| *name)
    }
}

/// Label lookup by category name, as typed by a user.
///
/// Category names are matched case-sensitively (`run_mode`, `freturn`, ...).
pub fn label_for(category: &str, code: i32) -> Result<&'static str, CoreError> {
    let category: Category = category.parse().map_err(|_| CoreError::Validation {
        message: format!("unknown lookup category '{category}'"),
    })?;
    Ok(category.label(code))
}

/// Every category name accepted by [`label_for`].
pub fn category_names() -> Vec<&'static str> {
    Category::iter().map(Into::into).collect()
}
