//! Candidate racing
//!
//! Fan-out/select over candidate tasks: the first candidate whose future
//! resolves to [`CandidateVerdict::Ready`] wins, and every other candidate
//! task is aborted the instant the winner is chosen. Candidates that finish
//! without winning report a verdict so the caller can pick the right
//! terminal error.

use std::future::Future;
use tokio::task::JoinSet;

/// How one candidate's wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateVerdict {
    /// Synced with sufficient balance; eligible to win
    Ready,
    /// Synced, but balance below the required amount
    SyncedInsufficient,
    /// Bounded wait exhausted before reaching synced
    TimedOut,
    /// Sync failed or the state stream ended
    Failed(String),
}

/// Outcome of a race.
#[derive(Debug)]
pub enum RaceResult {
    /// Index of the first candidate that reported `Ready`
    Winner(usize),
    /// No candidate became ready; verdicts of all that completed
    NoWinner(Vec<(usize, CandidateVerdict)>),
}

/// Race candidate futures; first `Ready` wins, losers are aborted.
pub async fn first_to_satisfy<F>(candidates: Vec<F>) -> RaceResult
where
    F: Future<Output = CandidateVerdict> + Send + 'static,
{
    let mut set = JoinSet::new();
    for (index, candidate) in candidates.into_iter().enumerate() {
        set.spawn(async move { (index, candidate.await) });
    }

    let mut verdicts = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, CandidateVerdict::Ready)) => {
                set.abort_all();
                return RaceResult::Winner(index);
            }
            Ok((index, verdict)) => {
                tracing::debug!(index, ?verdict, "Race candidate finished without winning");
                verdicts.push((index, verdict));
            }
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                tracing::warn!(error = %e, "Race candidate task failed");
            }
        }
    }

    RaceResult::NoWinner(verdicts)
}
