use std::sync::Arc;
use std::time::Duration;

/// A follow-up returned from [`Component::update`](crate::Component::update).
///
/// Commands keep widgets free of scheduling concerns: a widget describes
/// what should happen next and the [`Engine`](crate::Engine) carries it out.
/// Immediate messages are fed back into the same widget before the current
/// interaction finishes; ticks are delivered later through the engine's
/// deferred queue.
///
/// # Examples
///
/// ```rust,ignore
/// // Do nothing:
/// let cmd = Command::none();
///
/// // Re-enter update with another message right away:
/// let cmd = Command::message(Msg::Close);
///
/// // Deliver a message after the debounce window:
/// let cmd = Command::tick(Duration::from_secs(1), Msg::Announce(generation));
/// ```
pub struct Command<Msg: Send + 'static> {
    pub(crate) inner: CommandInner<Msg>,
}

pub(crate) enum CommandInner<Msg: Send + 'static> {
    None,
    Message(Msg),
    Tick { delay: Duration, msg: Msg },
    Batch(Vec<Command<Msg>>),
}

impl<Msg: Send + 'static> Command<Msg> {
    /// No-op command.
    pub fn none() -> Self {
        Command {
            inner: CommandInner::None,
        }
    }

    /// Send a message immediately.
    pub fn message(msg: Msg) -> Self {
        Command {
            inner: CommandInner::Message(msg),
        }
    }

    /// Send a message once `delay` has elapsed.
    pub fn tick(delay: Duration, msg: Msg) -> Self {
        Command {
            inner: CommandInner::Tick { delay, msg },
        }
    }

    /// Run several commands in order.
    pub fn batch(cmds: impl IntoIterator<Item = Command<Msg>>) -> Self {
        let mut cmds: Vec<_> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Command::none(),
            1 => cmds.pop().unwrap_or_default(),
            _ => Command {
                inner: CommandInner::Batch(cmds),
            },
        }
    }

    /// Transform the message type (for composing widgets into a union).
    pub fn map<NewMsg: Send + 'static>(
        self,
        f: impl Fn(Msg) -> NewMsg + Send + Sync + 'static,
    ) -> Command<NewMsg> {
        self.map_with(Arc::new(f))
    }

    fn map_with<NewMsg: Send + 'static>(
        self,
        f: Arc<dyn Fn(Msg) -> NewMsg + Send + Sync>,
    ) -> Command<NewMsg> {
        match self.inner {
            CommandInner::None => Command::none(),
            CommandInner::Message(msg) => Command::message(f(msg)),
            CommandInner::Tick { delay, msg } => Command::tick(delay, f(msg)),
            CommandInner::Batch(cmds) => Command {
                inner: CommandInner::Batch(
                    cmds.into_iter()
                        .map(|cmd| cmd.map_with(f.clone()))
                        .collect(),
                ),
            },
        }
    }

    // --- Inspection methods (useful for testing) ---

    /// Returns `true` if this is a no-op command.
    pub fn is_none(&self) -> bool {
        matches!(self.inner, CommandInner::None)
    }

    /// If this command is an immediate message, return it.
    pub fn into_message(self) -> Option<Msg> {
        match self.inner {
            CommandInner::Message(msg) => Some(msg),
            _ => None,
        }
    }

    /// If this command is a deferred message, return its delay and message.
    pub fn into_tick(self) -> Option<(Duration, Msg)> {
        match self.inner {
            CommandInner::Tick { delay, msg } => Some((delay, msg)),
            _ => None,
        }
    }

    /// If this command is a batch, return the inner commands.
    pub fn into_batch(self) -> Option<Vec<Command<Msg>>> {
        match self.inner {
            CommandInner::Batch(cmds) => Some(cmds),
            _ => None,
        }
    }
}

impl<Msg: Send + 'static> Default for Command<Msg> {
    fn default() -> Self {
        Command::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_none_is_none() {
        let cmd: Command<()> = Command::none();
        assert!(cmd.is_none());
    }

    #[test]
    fn command_message_round_trips() {
        let cmd: Command<i32> = Command::message(42);
        assert_eq!(cmd.into_message(), Some(42));
    }

    #[test]
    fn command_tick_keeps_delay() {
        let cmd: Command<&str> = Command::tick(Duration::from_millis(1000), "announce");
        assert_eq!(
            cmd.into_tick(),
            Some((Duration::from_millis(1000), "announce"))
        );
    }

    #[test]
    fn command_batch_empty_returns_none() {
        let cmd: Command<()> = Command::batch(vec![]);
        assert!(cmd.is_none());
    }

    #[test]
    fn command_batch_drops_noops_and_unwraps_single() {
        let cmd: Command<i32> = Command::batch(vec![Command::none(), Command::message(1)]);
        assert_eq!(cmd.into_message(), Some(1));
    }

    #[test]
    fn command_batch_multiple() {
        let cmd: Command<i32> = Command::batch(vec![Command::message(1), Command::message(2)]);
        assert_eq!(cmd.into_batch().map(|c| c.len()), Some(2));
    }

    #[test]
    fn command_map_message_and_tick() {
        let cmd: Command<i32> = Command::message(42);
        let mapped: Command<String> = cmd.map(|n| n.to_string());
        assert_eq!(mapped.into_message().as_deref(), Some("42"));

        let cmd: Command<i32> = Command::tick(Duration::from_millis(5), 7);
        let mapped: Command<String> = cmd.map(|n| format!("#{n}"));
        assert_eq!(
            mapped.into_tick(),
            Some((Duration::from_millis(5), "#7".to_string()))
        );
    }

    #[test]
    fn command_map_batch() {
        let cmd: Command<i32> = Command::batch(vec![Command::message(1), Command::message(2)]);
        let mapped: Command<String> = cmd.map(|n| n.to_string());
        let inner = mapped.into_batch().unwrap();
        let values: Vec<_> = inner.into_iter().filter_map(|c| c.into_message()).collect();
        assert_eq!(values, vec!["1".to_string(), "2".to_string()]);
    }
}
