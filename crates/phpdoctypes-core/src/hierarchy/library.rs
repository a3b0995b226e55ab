// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Built-in class and interface hierarchy.
//!
//! A static table from fully-qualified built-in name to its direct
//! supertypes: the predefined classes and interfaces, the throwable tree,
//! and the standard-library containers, iterators and file objects. The
//! table records direct edges only; the oracle walks it transitively.

/// Returns the direct supertypes of a built-in, or `None` if the name is
/// not a built-in.
#[must_use]
pub(crate) fn direct_supers(name: &str) -> Option<&'static [&'static str]> {
    let supers: &'static [&'static str] = match name {
        // Predefined interfaces and classes.
        "\\Traversable" | "\\ArrayAccess" | "\\Countable" | "\\Serializable" | "\\Stringable"
        | "\\Closure" | "\\WeakReference" | "\\WeakMap" | "\\UnitEnum" => &[],
        "\\Iterator" | "\\IteratorAggregate" => &["\\Traversable"],
        "\\Generator" => &["\\Iterator"],
        "\\Fiber" => &[],
        "\\BackedEnum" => &["\\UnitEnum"],
        "\\ArrayObject" => &["\\IteratorAggregate", "\\ArrayAccess", "\\Serializable", "\\Countable"],
        "\\ArrayIterator" => &["\\SeekableIterator", "\\ArrayAccess", "\\Serializable", "\\Countable"],

        // Throwables.
        "\\Throwable" => &["\\Stringable"],
        "\\Exception" | "\\Error" => &["\\Throwable"],
        "\\ErrorException" => &["\\Exception"],
        "\\ArithmeticError" | "\\TypeError" | "\\ValueError" | "\\UnhandledMatchError" => &["\\Error"],
        "\\ArgumentCountError" => &["\\TypeError"],
        "\\DivisionByZeroError" => &["\\ArithmeticError"],
        "\\LogicException" | "\\RuntimeException" | "\\JsonException" => &["\\Exception"],
        "\\BadFunctionCallException" | "\\DomainException" | "\\InvalidArgumentException"
        | "\\LengthException" | "\\OutOfRangeException" => &["\\LogicException"],
        "\\BadMethodCallException" => &["\\BadFunctionCallException"],
        "\\OutOfBoundsException" | "\\OverflowException" | "\\RangeException"
        | "\\UnderflowException" | "\\UnexpectedValueException" => &["\\RuntimeException"],

        // Standard-library containers.
        "\\SplDoublyLinkedList" => &["\\Iterator", "\\Countable", "\\ArrayAccess", "\\Serializable"],
        "\\SplStack" | "\\SplQueue" => &["\\SplDoublyLinkedList"],
        "\\SplHeap" => &["\\Iterator", "\\Countable"],
        "\\SplMinHeap" | "\\SplMaxHeap" => &["\\SplHeap"],
        "\\SplPriorityQueue" => &["\\Iterator", "\\Countable"],
        "\\SplFixedArray" => &["\\ArrayAccess", "\\Countable", "\\IteratorAggregate", "\\JsonSerializable"],
        "\\SplObjectStorage" => &["\\Countable", "\\Iterator", "\\Serializable", "\\ArrayAccess"],
        "\\JsonSerializable" => &[],

        // Standard-library iterators.
        "\\SeekableIterator" | "\\OuterIterator" | "\\RecursiveIterator" => &["\\Iterator"],
        "\\IteratorIterator" => &["\\OuterIterator"],
        "\\FilterIterator" => &["\\IteratorIterator"],
        "\\CallbackFilterIterator" => &["\\FilterIterator"],
        "\\RecursiveCallbackFilterIterator" => &["\\CallbackFilterIterator", "\\RecursiveIterator"],
        "\\RecursiveFilterIterator" => &["\\FilterIterator", "\\RecursiveIterator"],
        "\\ParentIterator" => &["\\RecursiveFilterIterator"],
        "\\LimitIterator" | "\\NoRewindIterator" | "\\InfiniteIterator" => &["\\IteratorIterator"],
        "\\CachingIterator" => &["\\IteratorIterator", "\\ArrayAccess", "\\Countable", "\\Stringable"],
        "\\RecursiveCachingIterator" => &["\\CachingIterator", "\\RecursiveIterator"],
        "\\RegexIterator" => &["\\FilterIterator"],
        "\\RecursiveRegexIterator" => &["\\RegexIterator", "\\RecursiveIterator"],
        "\\AppendIterator" => &["\\IteratorIterator"],
        "\\MultipleIterator" => &["\\Iterator"],
        "\\EmptyIterator" => &["\\Iterator"],
        "\\RecursiveIteratorIterator" => &["\\OuterIterator"],
        "\\RecursiveTreeIterator" => &["\\RecursiveIteratorIterator"],

        // File and directory objects.
        "\\SplFileInfo" => &["\\Stringable"],
        "\\DirectoryIterator" => &["\\SplFileInfo", "\\SeekableIterator"],
        "\\FilesystemIterator" => &["\\DirectoryIterator"],
        "\\RecursiveDirectoryIterator" => &["\\FilesystemIterator", "\\RecursiveIterator"],
        "\\GlobIterator" => &["\\FilesystemIterator", "\\Countable"],
        "\\SplFileObject" => &["\\SplFileInfo", "\\RecursiveIterator", "\\SeekableIterator"],
        "\\SplTempFileObject" => &["\\SplFileObject"],

        _ => return None,
    };
    Some(supers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_builtins_resolve() {
        assert_eq!(direct_supers("\\Iterator"), Some(&["\\Traversable"][..]));
        assert_eq!(direct_supers("\\Exception"), Some(&["\\Throwable"][..]));
        assert!(direct_supers("\\Traversable").is_some_and(<[_]>::is_empty));
    }

    #[test]
    fn unknown_names_are_absent() {
        assert_eq!(direct_supers("\\App\\Widget"), None);
        assert_eq!(direct_supers("Iterator"), None);
    }

    #[test]
    fn container_chain_reaches_iterator() {
        let stack = direct_supers("\\SplStack").unwrap();
        assert_eq!(stack, &["\\SplDoublyLinkedList"]);
        let list = direct_supers("\\SplDoublyLinkedList").unwrap();
        assert!(list.contains(&"\\Iterator"));
    }
}
