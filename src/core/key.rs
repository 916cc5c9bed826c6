//! Keys that broadcasts are matched against.
//!
//! A [`Key`] is a tagged value: either a literal from a closed set chosen by
//! the caller (usually a fieldless enum), or the runtime identity of a
//! message class. Both are compared by value.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Bound for literal keys: a comparable, shareable value.
///
/// Blanket-implemented; a fieldless `#[derive(Debug, Clone, PartialEq, Eq)]`
/// enum qualifies.
pub trait MessageKind: Clone + Eq + fmt::Debug + Send + Sync + 'static {}

impl<T> MessageKind for T where T: Clone + Eq + fmt::Debug + Send + Sync + 'static {}

/// Runtime identity of a message class.
///
/// Equality and hashing use the [`TypeId`] only; the name is kept for logs.
#[derive(Clone, Copy)]
pub struct MessageClass {
    id: TypeId,
    name: &'static str,
}

impl MessageClass {
    /// Identity of the type `M`.
    pub fn of<M: 'static>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: type_name::<M>(),
        }
    }

    /// Fully qualified type name of the class.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for MessageClass {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageClass {}

impl Hash for MessageClass {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for MessageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageClass({})", self.name)
    }
}

/// Identity a subscription is registered under and a broadcast is matched against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key<K> {
    /// A member of a closed, caller-defined set.
    Literal(K),
    /// The identity of a message class.
    Class(MessageClass),
}

impl<K> From<MessageClass> for Key<K> {
    fn from(class: MessageClass) -> Self {
        Key::Class(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Simple {
        One,
        Two,
    }

    struct Ping;
    struct Pong;

    #[test]
    fn test_literals_compare_by_value() {
        let a: Key<Simple> = Key::Literal(Simple::One);
        let b: Key<Simple> = Key::Literal(Simple::One);
        assert_eq!(a, b);
        assert_ne!(a, Key::Literal(Simple::Two));
    }

    #[test]
    fn test_classes_compare_by_type() {
        assert_eq!(MessageClass::of::<Ping>(), MessageClass::of::<Ping>());
        assert_ne!(MessageClass::of::<Ping>(), MessageClass::of::<Pong>());
        assert!(MessageClass::of::<Ping>().name().ends_with("Ping"));
    }

    #[test]
    fn test_literal_never_equals_class() {
        let lit: Key<Simple> = Key::Literal(Simple::One);
        let class: Key<Simple> = MessageClass::of::<Simple>().into();
        assert_ne!(lit, class);
    }
}
