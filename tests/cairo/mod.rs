mod tests_cairo_incremental;
mod tests_cairo_parse;
mod tests_ffi;
