//! Scripted backend for tests.
//!
//! Available in this crate's own tests and, behind the `test-utils` feature,
//! to downstream crates.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Mutex;

use crate::backend::{ChatBackend, TurnRequest};
use crate::chat::{EventStream, TurnStep};
use crate::error::ChatError;

enum Script {
    Steps(Vec<Result<TurnStep, ChatError>>),
    Error(ChatError),
    Hang,
}

/// A [`ChatBackend`] that replays scripted turns in FIFO order and records
/// every request it receives.
///
/// An unscripted call fails with a recognizable backend error rather than
/// panicking, so a test that under-scripts fails with a useful message.
pub struct MockBackend {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<TurnRequest>>,
    context_limit: u64,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Creates a mock with a small default context limit.
    pub fn new() -> Self {
        Self::with_context_limit(4096)
    }

    /// Creates a mock reporting the given context limit.
    pub fn with_context_limit(context_limit: u64) -> Self {
        Self {
            scripts: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            context_limit,
        }
    }

    /// Queues a turn that yields each step successfully.
    pub fn script_turn(&self, steps: Vec<TurnStep>) {
        self.script_steps(steps.into_iter().map(Ok).collect());
    }

    /// Queues a turn with explicit per-step results, for mid-stream errors.
    pub fn script_steps(&self, steps: Vec<Result<TurnStep, ChatError>>) {
        self.scripts.lock().unwrap().push_back(Script::Steps(steps));
    }

    /// Queues a turn that fails before streaming starts.
    pub fn script_error(&self, error: ChatError) {
        self.scripts.lock().unwrap().push_back(Script::Error(error));
    }

    /// Queues a turn whose stream never yields, for cancellation tests.
    pub fn script_hang(&self) {
        self.scripts.lock().unwrap().push_back(Script::Hang);
    }

    /// Every request received so far, in call order.
    pub fn recorded_requests(&self) -> Vec<TurnRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ChatBackend for MockBackend {
    fn stream_turn<'a>(
        &'a self,
        request: &'a TurnRequest,
    ) -> Pin<Box<dyn Future<Output = Result<EventStream, ChatError>> + Send + 'a>> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request.clone());
            let script = self.scripts.lock().unwrap().pop_front();
            match script {
                Some(Script::Steps(steps)) => {
                    Ok(Box::pin(futures::stream::iter(steps)) as EventStream)
                }
                Some(Script::Error(error)) => Err(error),
                Some(Script::Hang) => Ok(Box::pin(futures::stream::pending()) as EventStream),
                None => Err(ChatError::Backend {
                    message: "mock backend has no scripted turn left".into(),
                }),
            }
        })
    }

    fn context_limit(&self) -> u64 {
        self.context_limit
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;
    use crate::chat::{ChatEvent, ChatResult, Message};
    use crate::usage::TokenUsage;

    #[tokio::test]
    async fn test_replays_in_fifo_order() {
        let backend = MockBackend::new();
        backend.script_turn(vec![TurnStep::Event(ChatEvent::Text("first".into()))]);
        backend.script_turn(vec![TurnStep::Event(ChatEvent::Text("second".into()))]);

        let request = TurnRequest::plain(vec![Message::user("hi")]);
        for expected in ["first", "second"] {
            let mut stream = backend.stream_turn(&request).await.unwrap();
            let step = stream.next().await.unwrap().unwrap();
            assert_eq!(step, TurnStep::Event(ChatEvent::Text(expected.into())));
        }
        assert_eq!(backend.recorded_requests().len(), 2);
    }

    #[test]
    fn test_default_matches_new() {
        assert_eq!(
            MockBackend::default().context_limit(),
            MockBackend::new().context_limit()
        );
        assert_eq!(MockBackend::default().context_limit(), 4096);
    }

    #[tokio::test]
    async fn test_unscripted_call_fails() {
        let backend = MockBackend::new();
        let request = TurnRequest::plain(vec![]);
        let err = backend.stream_turn(&request).await.map(|_| ()).unwrap_err();
        assert!(matches!(err, ChatError::Backend { message } if message.contains("no scripted")));
    }

    #[tokio::test]
    async fn test_mid_stream_error() {
        let backend = MockBackend::new();
        backend.script_steps(vec![
            Ok(TurnStep::Event(ChatEvent::Text("partial".into()))),
            Err(ChatError::Decode {
                message: "bad line".into(),
                line: "{".into(),
            }),
        ]);

        let request = TurnRequest::plain(vec![]);
        let mut stream = backend.stream_turn(&request).await.unwrap();
        assert!(stream.next().await.unwrap().is_ok());
        assert!(matches!(
            stream.next().await.unwrap(),
            Err(ChatError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_done_step_round_trips() {
        let backend = MockBackend::new();
        backend.script_turn(vec![TurnStep::Done(ChatResult {
            text: "done".into(),
            usage: TokenUsage::new(1, 1),
            ..Default::default()
        })]);

        let request = TurnRequest::plain(vec![]);
        let mut stream = backend.stream_turn(&request).await.unwrap();
        let step = stream.next().await.unwrap().unwrap();
        assert!(matches!(step, TurnStep::Done(result) if result.text == "done"));
    }
}
