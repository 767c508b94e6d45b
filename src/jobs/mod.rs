//! Background jobs processed by the apalis worker.
//!
//! Jobs are stored in PostgreSQL through `apalis-sql`; the API enqueues them
//! through [`JobDispatcher`] and `jobs work` runs the handlers.

mod dispatcher;
mod email_job;
mod hello_job;

pub use dispatcher::{JobDispatcher, PostgresJobQueue};
pub use email_job::{email_job_handler, EmailConfig, EmailJob, Mailer};
pub use hello_job::{hello_world_job_handler, HelloWorldJob};

#[cfg(any(test, feature = "test-utils"))]
pub use dispatcher::MockJobDispatcher;
#[cfg(any(test, feature = "test-utils"))]
pub use email_job::MockMailer;
