//! The C entry point

use cairo_syntax::ffi::tree_sitter_cairo;
use cairo_syntax::{cairo, parse};

#[test]
fn test_entry_point_returns_the_bundled_language() {
    let handle = tree_sitter_cairo();
    assert!(!handle.is_null());
    assert_eq!(handle, tree_sitter_cairo());

    // SAFETY: a non-null handle points at a process-lifetime language.
    let language = unsafe { &*handle };
    assert!(language.ptr_eq(&cairo::language()));
    assert!(parse(language, b"fn main() {}", None).is_ok());
}
