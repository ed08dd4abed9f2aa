//! Serialized access to one shared [`IncrementalSession`].
//!
//! The session lives on a dedicated thread that owns it exclusively.
//! [`SessionHandle`] is a cheap, cloneable front end: every call is a
//! message to that thread, so requests are applied one at a time in arrival
//! order. A request that panics inside the solver is answered with an error
//! and the session is rebuilt from its accepted constraints.

use std::panic::{self, AssertUnwindSafe};

use tokio::sync::{mpsc, oneshot};

use super::session::{
    AddConstraintResponse, CheckResponse, IncrementalSession, ResetResponse, StatusResponse,
};
use crate::config::SessionConfig;
use crate::error::SessionError;

const MAILBOX_CAPACITY: usize = 64;

enum Request {
    Add {
        constraint: String,
        reply: oneshot::Sender<Result<AddConstraintResponse, SessionError>>,
    },
    Check {
        reply: oneshot::Sender<Result<CheckResponse, SessionError>>,
    },
    Reset {
        reply: oneshot::Sender<ResetResponse>,
    },
    Status {
        reply: oneshot::Sender<StatusResponse>,
    },
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Add { .. } => "Add",
            Self::Check { .. } => "Check",
            Self::Reset { .. } => "Reset",
            Self::Status { .. } => "Status",
        };
        f.write_str(name)
    }
}

fn panic_reason(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("solver failure")
}

/// Run `op` against the session. A panic restores the session and becomes
/// [`SessionError::Malformed`].
fn guarded<T>(
    session: &mut IncrementalSession,
    op: impl FnOnce(&mut IncrementalSession) -> Result<T, SessionError>,
) -> Result<T, SessionError> {
    let checkpoint = session.checkpoint();
    match panic::catch_unwind(AssertUnwindSafe(|| op(&mut *session))) {
        Ok(result) => result,
        Err(payload) => {
            let reason = panic_reason(payload.as_ref()).to_string();
            tracing::error!(%reason, "session request aborted");
            session.restore(checkpoint);
            Err(SessionError::Malformed(reason))
        }
    }
}

fn serve(mut session: IncrementalSession, mut mailbox: mpsc::Receiver<Request>) {
    // A dropped reply only means the caller stopped waiting.
    while let Some(request) = mailbox.blocking_recv() {
        match request {
            Request::Add { constraint, reply } => {
                let _ = reply.send(guarded(&mut session, |s| s.add_constraint(&constraint)));
            }
            Request::Check { reply } => {
                let checked = guarded(&mut session, IncrementalSession::check_satisfiability);
                let _ = reply.send(checked);
            }
            Request::Reset { reply } => {
                let _ = reply.send(session.reset());
            }
            Request::Status { reply } => {
                let _ = reply.send(session.status());
            }
        }
    }
    tracing::debug!("session actor stopped");
}

/// Handle to the session actor. The actor stops when the last handle is
/// dropped.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<Request>,
}

impl SessionHandle {
    /// Start a session actor on its own thread.
    #[must_use]
    pub fn spawn(config: SessionConfig) -> Self {
        let (sender, mailbox) = mpsc::channel(MAILBOX_CAPACITY);
        std::thread::spawn(move || serve(IncrementalSession::new(config), mailbox));
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Request,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)
    }

    /// See [`IncrementalSession::add_constraint`].
    ///
    /// # Errors
    ///
    /// Returns the session's rejection, or [`SessionError::Closed`] if the
    /// actor is gone.
    pub async fn add_constraint(
        &self,
        constraint: impl Into<String>,
    ) -> Result<AddConstraintResponse, SessionError> {
        let constraint = constraint.into();
        self.request(|reply| Request::Add { constraint, reply })
            .await?
    }

    /// See [`IncrementalSession::check_satisfiability`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Inactive`] before first use, or
    /// [`SessionError::Closed`] if the actor is gone.
    pub async fn check_satisfiability(&self) -> Result<CheckResponse, SessionError> {
        self.request(|reply| Request::Check { reply }).await?
    }

    /// See [`IncrementalSession::reset`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the actor is gone.
    pub async fn reset(&self) -> Result<ResetResponse, SessionError> {
        self.request(|reply| Request::Reset { reply }).await
    }

    /// See [`IncrementalSession::status`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the actor is gone.
    pub async fn status(&self) -> Result<StatusResponse, SessionError> {
        self.request(|reply| Request::Status { reply }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handle_round_trip() {
        let handle = SessionHandle::spawn(SessionConfig::default());
        handle.add_constraint("x + y = 10").await.unwrap();
        handle.add_constraint("x = 3").await.unwrap();

        let check = handle.check_satisfiability().await.unwrap();
        let model = check.model.unwrap();
        assert_eq!(model["x"], "3");
        assert_eq!(model["y"], "7");

        handle.reset().await.unwrap();
        let status = handle.status().await.unwrap();
        assert_eq!(status.constraints_count, 0);
        assert_eq!(status.variables_count, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_are_serialized() {
        let handle = SessionHandle::spawn(SessionConfig::default());
        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let handle = handle.clone();
                tokio::spawn(async move { handle.add_constraint(format!("v{i} > {i}")).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let status = handle.status().await.unwrap();
        assert_eq!(status.constraints_count, 16);
        assert_eq!(status.variables_count, 16);
    }

    #[tokio::test]
    async fn test_clones_share_one_session() {
        let first = SessionHandle::spawn(SessionConfig::default());
        let second = first.clone();
        first.add_constraint("x > 0").await.unwrap();
        second.add_constraint("x < 0").await.unwrap();

        let check = first.check_satisfiability().await.unwrap();
        assert_eq!(check.message, CheckResponse::UNSATISFIABLE);
        assert_eq!(second.status().await.unwrap().constraints_count, 2);
    }

    #[test]
    fn test_panicking_request_restores_session() {
        let mut session = IncrementalSession::default();
        session.add_constraint("x > 1").unwrap();

        let result: Result<(), _> = guarded(&mut session, |s| {
            s.add_constraint("y > 2").unwrap();
            panic!("solver blew up");
        });
        assert_eq!(
            result.unwrap_err(),
            SessionError::Malformed("solver blew up".to_string())
        );
        let status = session.status();
        assert_eq!(status.constraints, vec!["x > 1"]);
        assert_eq!(status.variables_count, 1);
        assert!(session.check_satisfiability().unwrap().is_satisfiable());
    }

    #[test]
    fn test_panic_before_first_use_leaves_session_inactive() {
        let mut session = IncrementalSession::default();
        let result: Result<(), _> = guarded(&mut session, |s| {
            s.add_constraint("x > 1").unwrap();
            panic!("{}", String::from("late failure"));
        });
        assert!(matches!(result, Err(SessionError::Malformed(reason)) if reason == "late failure"));
        assert!(!session.is_active());
    }

    #[tokio::test]
    async fn test_actor_survives_out_of_range_constant() {
        let handle = SessionHandle::spawn(SessionConfig::default());
        let err = handle
            .add_constraint("x > -(-9223372036854775807 - 1)")
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Malformed(_)));

        handle.add_constraint("x > 1").await.unwrap();
        let check = handle.check_satisfiability().await.unwrap();
        assert!(check.is_satisfiable());
        assert_eq!(check.constraints, vec!["x > 1"]);
    }

    #[tokio::test]
    async fn test_rejection_travels_back() {
        let handle = SessionHandle::spawn(SessionConfig::default());
        let err = handle.add_constraint("x >").await.unwrap_err();
        assert!(matches!(err, SessionError::Malformed(_)));
        assert_eq!(handle.status().await.unwrap().status, "inactive");
    }
}
