/// What a component did with a key, shared by every overlay component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Consumed without anything for the parent to act on
  Handled,
  /// Consumed, and the parent should act on this event
  Event(T),
  /// Not consumed; the parent tries its own bindings
  NotHandled,
}
