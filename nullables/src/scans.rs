//! Nullable scan source — a scripted camera.

use futures_util::Stream;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A scan stream that yields pre-scripted frames in order, then ends.
///
/// Stands in for the camera in signing-flow tests: frames can include
/// unreadable noise, out-of-order fragments, or duplicates, exactly as a
/// real camera produces them.
pub struct ScriptedScans {
    frames: VecDeque<String>,
}

impl ScriptedScans {
    pub fn new<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            frames: frames.into_iter().map(Into::into).collect(),
        }
    }

    /// A camera that never reads anything.
    pub fn empty() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl Stream for ScriptedScans {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.frames.pop_front())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.frames.len(), Some(self.frames.len()))
    }
}
