use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use fgtask::errors::{FgtaskError, Result};
use fgtask::exec::{Invocation, Outcome, ProcessSupervisor};
use fgtask::fs::mock::MockFileSystem;
use fgtask::fs::FileSystem;
use fgtask::status::StatusStore;
use fgtask::types::TaskStatus;

/// What the fake "fgtest" does when invoked.
#[derive(Debug, Clone)]
pub enum FakeBehaviour {
    /// Exit with `code`, optionally writing `rewards` to the rewards path.
    Exit { code: i32, rewards: Option<String> },
    TimeOut,
    FailLaunch(String),
    /// The supervisor itself errors (e.g. log file could not be created).
    SupervisorError(String),
    Panic(String),
}

impl FakeBehaviour {
    pub fn success(rewards: &str) -> Self {
        FakeBehaviour::Exit {
            code: 0,
            rewards: Some(rewards.to_string()),
        }
    }
}

/// A fake supervisor that:
/// - records every invocation it receives
/// - records the task's status as seen while "running"
/// - writes scripted rewards into the mock filesystem and reports the
///   scripted outcome.
#[derive(Debug, Clone)]
pub struct FakeSupervisor {
    fs: MockFileSystem,
    behaviour: FakeBehaviour,
    invocations: Arc<Mutex<Vec<Invocation>>>,
    observed: Arc<Mutex<Vec<Option<TaskStatus>>>>,
}

impl FakeSupervisor {
    pub fn new(fs: MockFileSystem, behaviour: FakeBehaviour) -> Self {
        Self {
            fs,
            behaviour,
            invocations: Arc::new(Mutex::new(Vec::new())),
            observed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Status record state at the moment each invocation started.
    pub fn observed_statuses(&self) -> Vec<Option<TaskStatus>> {
        self.observed.lock().unwrap().clone()
    }
}

impl ProcessSupervisor for FakeSupervisor {
    fn run<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<Outcome>> + Send + 'a>> {
        Box::pin(async move {
            self.invocations.lock().unwrap().push(invocation.clone());

            let store = StatusStore::new(Arc::new(self.fs.clone()));
            let seen = store.read(&invocation.working_dir).ok().map(|r| r.status);
            self.observed.lock().unwrap().push(seen);

            match &self.behaviour {
                FakeBehaviour::Exit { code, rewards } => {
                    if let Some(body) = rewards {
                        self.fs
                            .write(&invocation.command_line.rewards_path, body.as_bytes())
                            .map_err(FgtaskError::from)?;
                    }
                    Ok(Outcome::Exited(*code))
                }
                FakeBehaviour::TimeOut => Ok(Outcome::TimedOut),
                FakeBehaviour::FailLaunch(msg) => Ok(Outcome::LaunchFailed(msg.clone())),
                FakeBehaviour::SupervisorError(msg) => {
                    Err(FgtaskError::Other(anyhow::anyhow!(msg.clone())))
                }
                FakeBehaviour::Panic(msg) => panic!("{}", msg),
            }
        })
    }
}
