//! Declaration macros.

/// Boxes a comma-separated list of rules into a `Vec<BoxedRule>`.
///
/// Schema declarations take heterogeneous rule lists; this saves the
/// per-rule `Box::new` noise:
///
/// ```
/// use veritas_validator::prelude::*;
///
/// let list = rules![required(), min_length(3)];
/// assert_eq!(list.len(), 2);
/// assert_eq!(list[0].name(), "required");
/// ```
#[macro_export]
macro_rules! rules {
    () => {
        ::std::vec::Vec::<$crate::foundation::BoxedRule>::new()
    };
    ($($rule:expr),+ $(,)?) => {
        ::std::vec![
            $(::std::boxed::Box::new($rule) as $crate::foundation::BoxedRule),+
        ]
    };
}

// ============================================================================
// TESTS
// ============================================================================
